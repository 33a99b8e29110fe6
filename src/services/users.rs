use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::roles;
use crate::db::DbPool;
use crate::entities::{user, user_role};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilters {
    /// Matches against email, first name and last name.
    pub search: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRolesRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department_id: Option<Uuid>,
    pub is_active: bool,
    pub mfa_enabled: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// User directory and role administration.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserResponse, ServiceError> {
        let user = self.find_live_user(user_id).await?;
        let roles = self.roles_for(user_id).await?;
        Ok(model_to_response(user, roles))
    }

    #[instrument(skip(self, filters))]
    pub async fn list_users(
        &self,
        filters: UserFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<UserResponse>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut condition = Condition::all().add(user::Column::DeletedAt.is_null());
        if let Some(search) = filters.search.as_deref() {
            condition = condition.add(
                Condition::any()
                    .add(user::Column::Email.contains(search))
                    .add(user::Column::FirstName.contains(search))
                    .add(user::Column::LastName.contains(search)),
            );
        }
        if let Some(department_id) = filters.department_id {
            condition = condition.add(user::Column::DepartmentId.eq(department_id));
        }
        if let Some(is_active) = filters.is_active {
            condition = condition.add(user::Column::IsActive.eq(is_active));
        }

        let query = user::Entity::find()
            .filter(condition)
            .order_by(user::Column::CreatedAt, Order::Desc);

        let total = query.clone().count(db).await?;
        let page = page.max(1);
        let users = query.offset((page - 1) * limit).limit(limit).all(db).await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.roles_for(user.id).await?;
            responses.push(model_to_response(user, roles));
        }

        Ok((responses, total))
    }

    /// Replace a user's role set. Every role name must be one of the known
    /// roles.
    #[instrument(skip(self, request))]
    pub async fn update_roles(
        &self,
        user_id: Uuid,
        request: UpdateUserRolesRequest,
    ) -> Result<UserResponse, ServiceError> {
        for role in &request.roles {
            if !roles::ALL.contains(&role.as_str()) {
                return Err(ServiceError::ValidationError(format!(
                    "Unknown role: {role}"
                )));
            }
        }

        let user = self.find_live_user(user_id).await?;

        let txn = self.db_pool.begin().await?;
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        for role in &request.roles {
            let row = user_role::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                role: Set(role.clone()),
            };
            row.insert(&txn).await?;
        }
        txn.commit().await?;

        info!(user_id = %user_id, roles = ?request.roles, "Updated user roles");
        Ok(model_to_response(user, request.roles))
    }

    /// Enable or disable a user account. Disabled accounts cannot log in or
    /// refresh tokens.
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<UserResponse, ServiceError> {
        let user = self.find_live_user(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db_pool).await?;

        info!(user_id = %user_id, is_active, "Changed user active flag");
        let roles = self.roles_for(user_id).await?;
        Ok(model_to_response(updated, roles))
    }

    async fn find_live_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&*self.db_pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.role).collect())
    }
}

fn model_to_response(model: user::Model, roles: Vec<String>) -> UserResponse {
    UserResponse {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        department_id: model.department_id,
        is_active: model.is_active,
        mfa_enabled: model.mfa_enabled,
        roles,
        created_at: model.created_at,
    }
}
