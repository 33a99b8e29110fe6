use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::category;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Annual depreciation rate as a percentage.
    pub depreciation_rate: Option<Decimal>,
    #[validate(range(min = 1, max = 100))]
    pub useful_life_years: Option<i32>,
    pub salvage_value: Option<Decimal>,
}

/// Category catalogue used when registering and valuing assets.
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<category::Model, ServiceError> {
        request.validate()?;

        let existing = category::Entity::find()
            .filter(category::Column::Code.eq(request.code.as_str()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Category code already exists".to_string(),
            ));
        }

        let category_id = Uuid::new_v4();
        let new_category = category::ActiveModel {
            id: Set(category_id),
            name: Set(request.name),
            code: Set(request.code),
            depreciation_rate: Set(request.depreciation_rate),
            useful_life_years: Set(request.useful_life_years),
            salvage_value: Set(request.salvage_value),
            created_at: Set(Utc::now()),
        };
        let saved = new_category.insert(&*self.db_pool).await?;

        info!(category_id = %category_id, "Created category");
        Ok(saved)
    }

    pub async fn get_category(&self, category_id: Uuid) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(category_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let categories = category::Entity::find()
            .order_by(category::Column::Name, Order::Asc)
            .all(&*self.db_pool)
            .await?;
        Ok(categories)
    }
}
