use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::{with_transaction, DbPool};
use crate::entities::asset::{self, AssetStatus};
use crate::entities::{asset_assignment, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Request payload for assigning an asset to a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentRequest {
    pub asset_id: Uuid,
    pub assigned_to_user_id: Uuid,
    pub expected_return_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 50))]
    pub assign_condition: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub assign_condition_rating: Option<i32>,
    pub assign_notes: Option<String>,
    pub assign_signature_url: Option<String>,
}

/// Request payload for returning an assigned asset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnAssetRequest {
    #[validate(length(min = 1, max = 50))]
    pub return_condition: String,
    #[validate(range(min = 1, max = 5))]
    pub return_condition_rating: Option<i32>,
    /// Photos documenting the asset state at hand-back. At least one is
    /// required before a return is accepted.
    pub return_photo_urls: Vec<String>,
    pub return_notes: Option<String>,
    pub return_signature_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssignmentFilters {
    pub asset_id: Option<Uuid>,
    pub assigned_to_user_id: Option<Uuid>,
    pub assigned_by_user_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentStatisticsResponse {
    pub total: u64,
    pub active: u64,
    pub returned: u64,
    pub overdue: u64,
}

/// Assignment manager: custody records and the assign/return flows.
#[derive(Clone)]
pub struct AssignmentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl AssignmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Assign an available asset to a user. Creates the custody record and
    /// flips the asset to assigned in one transaction.
    #[instrument(skip(self, request), fields(asset_id = %request.asset_id, user_id = %request.assigned_to_user_id))]
    pub async fn create_assignment(
        &self,
        request: CreateAssignmentRequest,
        assigned_by_user_id: Uuid,
    ) -> Result<asset_assignment::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let asset = asset::Entity::find_by_id(request.asset_id)
            .filter(asset::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))?;

        let assignee = user::Entity::find_by_id(request.assigned_to_user_id)
            .filter(user::Column::DeletedAt.is_null())
            .filter(user::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if assignee.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        if asset.status != AssetStatus::Available.to_string() {
            return Err(ServiceError::BadRequest(format!(
                "Asset is not available for assignment (status: {})",
                asset.status
            )));
        }

        let existing_active = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssetId.eq(request.asset_id))
            .filter(asset_assignment::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if existing_active.is_some() {
            return Err(ServiceError::Conflict(
                "Asset already has an active assignment".to_string(),
            ));
        }

        let now = Utc::now();
        let assignment_id = Uuid::new_v4();
        let signature_hash = request
            .assign_signature_url
            .as_deref()
            .map(|url| hex::encode(Sha256::digest(url.as_bytes())));

        let assignment = asset_assignment::ActiveModel {
            id: Set(assignment_id),
            asset_id: Set(request.asset_id),
            assigned_to_user_id: Set(request.assigned_to_user_id),
            assigned_by_user_id: Set(assigned_by_user_id),
            assigned_at: Set(now),
            expected_return_date: Set(request.expected_return_date),
            assign_condition: Set(request.assign_condition),
            assign_condition_rating: Set(request.assign_condition_rating),
            assign_notes: Set(request.assign_notes),
            assign_signature_url: Set(request.assign_signature_url),
            assign_signature_hash: Set(signature_hash),
            returned_at: Set(None),
            returned_to_user_id: Set(None),
            return_condition: Set(None),
            return_condition_rating: Set(None),
            return_photo_urls: Set(None),
            return_notes: Set(None),
            return_signature_url: Set(None),
            return_signature_hash: Set(None),
            is_active: Set(true),
            created_at: Set(now),
        };
        let saved =
            with_transaction::<_, asset_assignment::Model, ServiceError>(db, move |txn| {
                Box::pin(async move {
                    let saved = assignment.insert(txn).await?;

                    let mut asset_active: asset::ActiveModel = asset.into();
                    asset_active.status = Set(AssetStatus::Assigned.to_string());
                    asset_active.updated_at = Set(Some(now));
                    asset_active.update(txn).await?;

                    Ok(saved)
                })
            })
            .await?;

        info!(assignment_id = %assignment_id, "Assigned asset");
        self.emit(Event::AssetAssigned {
            asset_id: request.asset_id,
            assignment_id,
            assigned_to_user_id: request.assigned_to_user_id,
            assigned_by_user_id,
        })
        .await;

        Ok(saved)
    }

    /// Close an active assignment. The asset lands in damaged when it came
    /// back in Damaged or Poor condition, otherwise back in available.
    #[instrument(skip(self, request))]
    pub async fn return_asset(
        &self,
        assignment_id: Uuid,
        request: ReturnAssetRequest,
        returned_to_user_id: Uuid,
    ) -> Result<asset_assignment::Model, ServiceError> {
        request.validate()?;
        if request.return_photo_urls.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one return photo is required".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let assignment = asset_assignment::Entity::find_by_id(assignment_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Assignment not found".to_string()))?;

        if !assignment.is_active || assignment.returned_at.is_some() {
            return Err(ServiceError::BadRequest(
                "Assignment is already returned".to_string(),
            ));
        }

        let asset = asset::Entity::find_by_id(assignment.asset_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))?;

        let new_status = if condition_indicates_damage(&request.return_condition) {
            AssetStatus::Damaged
        } else {
            AssetStatus::Available
        };

        let now = Utc::now();
        let asset_id = assignment.asset_id;
        let signature_hash = request
            .return_signature_url
            .as_deref()
            .map(|url| hex::encode(Sha256::digest(url.as_bytes())));
        let photo_urls = serde_json::to_value(&request.return_photo_urls)
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let return_condition = request.return_condition.clone();
        let updated =
            with_transaction::<_, asset_assignment::Model, ServiceError>(db, move |txn| {
                Box::pin(async move {
                    let mut assignment_active: asset_assignment::ActiveModel = assignment.into();
                    assignment_active.is_active = Set(false);
                    assignment_active.returned_at = Set(Some(now));
                    assignment_active.returned_to_user_id = Set(Some(returned_to_user_id));
                    assignment_active.return_condition = Set(Some(request.return_condition));
                    assignment_active.return_condition_rating = Set(request.return_condition_rating);
                    assignment_active.return_photo_urls = Set(Some(photo_urls));
                    assignment_active.return_notes = Set(request.return_notes);
                    assignment_active.return_signature_url = Set(request.return_signature_url);
                    assignment_active.return_signature_hash = Set(signature_hash);
                    let updated = assignment_active.update(txn).await?;

                    let mut asset_active: asset::ActiveModel = asset.into();
                    asset_active.status = Set(new_status.to_string());
                    asset_active.updated_at = Set(Some(now));
                    asset_active.update(txn).await?;

                    Ok(updated)
                })
            })
            .await?;

        info!(assignment_id = %assignment_id, status = %new_status, "Returned asset");
        self.emit(Event::AssetReturned {
            asset_id,
            assignment_id,
            returned_by_user_id: returned_to_user_id,
            return_condition,
        })
        .await;

        Ok(updated)
    }

    pub async fn get_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<asset_assignment::Model, ServiceError> {
        asset_assignment::Entity::find_by_id(assignment_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Assignment not found".to_string()))
    }

    /// List assignments matching the filters, newest first.
    pub async fn list_assignments(
        &self,
        filters: AssignmentFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<asset_assignment::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let query = asset_assignment::Entity::find()
            .filter(build_assignment_filters(&filters))
            .order_by(asset_assignment::Column::AssignedAt, Order::Desc);

        let total = query.clone().count(db).await?;
        let page = page.max(1);
        let assignments = query
            .offset((page - 1) * limit)
            .limit(limit)
            .all(db)
            .await?;

        Ok((assignments, total))
    }

    /// All currently active assignments, newest first.
    pub async fn list_active(&self) -> Result<Vec<asset_assignment::Model>, ServiceError> {
        let assignments = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::IsActive.eq(true))
            .order_by(asset_assignment::Column::AssignedAt, Order::Desc)
            .all(&*self.db_pool)
            .await?;
        Ok(assignments)
    }

    /// Assignment history for a user, newest first. Pass `is_active` to
    /// narrow to current or past custody only.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        is_active: Option<bool>,
    ) -> Result<Vec<asset_assignment::Model>, ServiceError> {
        let mut query = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssignedToUserId.eq(user_id));
        if let Some(active) = is_active {
            query = query.filter(asset_assignment::Column::IsActive.eq(active));
        }
        let assignments = query
            .order_by(asset_assignment::Column::AssignedAt, Order::Desc)
            .all(&*self.db_pool)
            .await?;
        Ok(assignments)
    }

    /// Counts of total, active, returned and overdue assignments. Overdue
    /// means active past the expected return date.
    #[instrument(skip(self))]
    pub async fn get_statistics(&self) -> Result<AssignmentStatisticsResponse, ServiceError> {
        let db = &*self.db_pool;

        let total = asset_assignment::Entity::find().count(db).await?;
        let active = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::IsActive.eq(true))
            .count(db)
            .await?;
        let overdue = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::IsActive.eq(true))
            .filter(asset_assignment::Column::ExpectedReturnDate.is_not_null())
            .filter(asset_assignment::Column::ExpectedReturnDate.lt(Utc::now()))
            .count(db)
            .await?;

        Ok(AssignmentStatisticsResponse {
            total,
            active,
            returned: total - active,
            overdue,
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}

/// Damaged and Poor return conditions send the asset to damaged instead of
/// back into the available pool.
fn condition_indicates_damage(condition: &str) -> bool {
    condition.eq_ignore_ascii_case("damaged") || condition.eq_ignore_ascii_case("poor")
}

fn build_assignment_filters(filters: &AssignmentFilters) -> Condition {
    let mut condition = Condition::all();
    if let Some(asset_id) = filters.asset_id {
        condition = condition.add(asset_assignment::Column::AssetId.eq(asset_id));
    }
    if let Some(assigned_to_user_id) = filters.assigned_to_user_id {
        condition = condition.add(asset_assignment::Column::AssignedToUserId.eq(assigned_to_user_id));
    }
    if let Some(assigned_by_user_id) = filters.assigned_by_user_id {
        condition = condition.add(asset_assignment::Column::AssignedByUserId.eq(assigned_by_user_id));
    }
    if let Some(is_active) = filters.is_active {
        condition = condition.add(asset_assignment::Column::IsActive.eq(is_active));
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, Query};

    #[test]
    fn damaged_and_poor_conditions_flag_damage() {
        assert!(condition_indicates_damage("Damaged"));
        assert!(condition_indicates_damage("poor"));
        assert!(!condition_indicates_damage("Good"));
        assert!(!condition_indicates_damage("Fair"));
    }

    #[test]
    fn filters_narrow_by_assigner_and_activity() {
        let filters = AssignmentFilters {
            assigned_by_user_id: Some(Uuid::new_v4()),
            is_active: Some(true),
            ..Default::default()
        };
        let sql = Query::select()
            .cond_where(build_assignment_filters(&filters))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("assigned_by_user_id"));
        assert!(sql.contains("is_active"));
        assert!(!sql.contains("asset_id"));
    }
}
