use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::{with_transaction, DbPool};
use crate::entities::asset::{self, AssetStatus};
use crate::entities::asset_transfer::{self, TransferStatus};
use crate::entities::{asset_assignment, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Condition recorded on the assignment created when a transfer completes.
const TRANSFER_ASSIGN_CONDITION: &str = "Good";
const TRANSFER_ASSIGN_RATING: i32 = 4;

/// Request payload for opening a transfer request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    pub asset_id: Uuid,
    /// Current holder the asset is moving away from. Omitted when the asset
    /// comes straight out of inventory.
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Uuid,
    #[validate(length(max = 2000))]
    pub transfer_reason: Option<String>,
}

/// Approval payload used by both the manager and admin stages
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ApproveTransferRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Rejection payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RejectTransferRequest {
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TransferFilters {
    pub asset_id: Option<Uuid>,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    pub requested_by_user_id: Option<Uuid>,
    pub status: Option<TransferStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferStatisticsResponse {
    pub total: u64,
    pub pending: u64,
    pub manager_approved: u64,
    pub completed: u64,
    pub rejected: u64,
    /// Requests still waiting on someone: pending plus manager approved.
    pub awaiting_action: u64,
}

/// Transfer workflow engine. Transfers move pending -> manager_approved ->
/// completed; a rejection is allowed from either non-terminal state, and
/// admin approval atomically re-homes the asset.
#[derive(Clone)]
pub struct TransferService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl TransferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Open a transfer request. The asset may come from its current holder
    /// or straight from inventory; at most one request may be in flight per
    /// asset.
    #[instrument(skip(self, request), fields(asset_id = %request.asset_id, to_user_id = %request.to_user_id))]
    pub async fn request_transfer(
        &self,
        request: CreateTransferRequest,
        requested_by_user_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let asset = asset::Entity::find_by_id(request.asset_id)
            .filter(asset::Column::DeletedAt.is_null())
            .one(db)
            .await?;
        if asset.is_none() {
            return Err(ServiceError::NotFound("Asset not found".to_string()));
        }

        let active_assignment = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssetId.eq(request.asset_id))
            .filter(asset_assignment::Column::IsActive.eq(true))
            .one(db)
            .await?;

        if let Some(from_user_id) = request.from_user_id {
            let from_user = user::Entity::find_by_id(from_user_id)
                .filter(user::Column::DeletedAt.is_null())
                .one(db)
                .await?;
            if from_user.is_none() {
                return Err(ServiceError::NotFound("From user not found".to_string()));
            }

            if let Some(assignment) = &active_assignment {
                if assignment.assigned_to_user_id != from_user_id {
                    return Err(ServiceError::BadRequest(
                        "Asset is not currently assigned to the specified from user".to_string(),
                    ));
                }
            }
        }

        let recipient = user::Entity::find_by_id(request.to_user_id)
            .filter(user::Column::DeletedAt.is_null())
            .filter(user::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if recipient.is_none() {
            return Err(ServiceError::NotFound("To user not found".to_string()));
        }

        let in_flight = asset_transfer::Entity::find()
            .filter(asset_transfer::Column::AssetId.eq(request.asset_id))
            .filter(
                asset_transfer::Column::Status.is_in(vec![
                    TransferStatus::Pending.to_string(),
                    TransferStatus::ManagerApproved.to_string(),
                ]),
            )
            .one(db)
            .await?;
        if in_flight.is_some() {
            return Err(ServiceError::BadRequest(
                "There is already a pending transfer request for this asset".to_string(),
            ));
        }

        let transfer_id = Uuid::new_v4();
        let transfer = asset_transfer::ActiveModel {
            id: Set(transfer_id),
            asset_id: Set(request.asset_id),
            from_user_id: Set(request.from_user_id),
            to_user_id: Set(request.to_user_id),
            requested_by_user_id: Set(requested_by_user_id),
            requested_at: Set(Utc::now()),
            transfer_reason: Set(request.transfer_reason),
            status: Set(TransferStatus::Pending.to_string()),
            manager_approver_id: Set(None),
            manager_approved_at: Set(None),
            manager_notes: Set(None),
            admin_approver_id: Set(None),
            admin_approved_at: Set(None),
            admin_notes: Set(None),
            completed_at: Set(None),
            rejected_by_user_id: Set(None),
            rejected_at: Set(None),
            rejection_reason: Set(None),
        };
        let saved = transfer.insert(db).await?;

        info!(transfer_id = %transfer_id, "Opened transfer request");
        self.emit(Event::TransferRequested {
            transfer_id,
            asset_id: request.asset_id,
            to_user_id: request.to_user_id,
            requested_by_user_id,
        })
        .await;

        Ok(saved)
    }

    /// First-stage approval. Only a pending transfer can be manager
    /// approved.
    #[instrument(skip(self, request))]
    pub async fn approve_by_manager(
        &self,
        transfer_id: Uuid,
        request: ApproveTransferRequest,
        approver_user_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        request.validate()?;

        let transfer = self.find_transfer(transfer_id).await?;
        let status = parse_status(&transfer.status)?;
        if status != TransferStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot approve transfer with status: {}",
                transfer.status
            )));
        }

        let asset_id = transfer.asset_id;
        let mut active: asset_transfer::ActiveModel = transfer.into();
        active.status = Set(TransferStatus::ManagerApproved.to_string());
        active.manager_approver_id = Set(Some(approver_user_id));
        active.manager_approved_at = Set(Some(Utc::now()));
        active.manager_notes = Set(request.notes);
        let updated = active.update(&*self.db_pool).await?;

        info!(transfer_id = %transfer_id, "Manager approved transfer");
        self.emit(Event::TransferManagerApproved {
            transfer_id,
            asset_id,
            approver_user_id,
        })
        .await;

        Ok(updated)
    }

    /// Second-stage approval. Atomically closes the current assignment,
    /// creates a new one for the recipient, marks the asset assigned and
    /// completes the transfer. Either every step lands or none do.
    #[instrument(skip(self, request))]
    pub async fn approve_by_admin(
        &self,
        transfer_id: Uuid,
        request: ApproveTransferRequest,
        admin_user_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let transfer = self.find_transfer(transfer_id).await?;
        let status = parse_status(&transfer.status)?;
        if status != TransferStatus::ManagerApproved {
            return Err(ServiceError::InvalidOperation(format!(
                "Transfer must be manager approved first. Current status: {}",
                transfer.status
            )));
        }

        let asset = asset::Entity::find_by_id(transfer.asset_id)
            .filter(asset::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))?;

        let current_assignment = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssetId.eq(transfer.asset_id))
            .filter(asset_assignment::Column::IsActive.eq(true))
            .one(db)
            .await?;

        let now = Utc::now();
        let asset_id = transfer.asset_id;
        let to_user_id = transfer.to_user_id;
        let new_assignment_id = Uuid::new_v4();
        let notes = request.notes;

        let completed = with_transaction::<_, asset_transfer::Model, ServiceError>(db, move |txn| {
            Box::pin(async move {
                if let Some(assignment) = current_assignment {
                    let mut closing: asset_assignment::ActiveModel = assignment.into();
                    closing.is_active = Set(false);
                    closing.returned_at = Set(Some(now));
                    closing.returned_to_user_id = Set(Some(admin_user_id));
                    closing.update(txn).await?;
                }

                let new_assignment = asset_assignment::ActiveModel {
                    id: Set(new_assignment_id),
                    asset_id: Set(asset_id),
                    assigned_to_user_id: Set(to_user_id),
                    assigned_by_user_id: Set(admin_user_id),
                    assigned_at: Set(now),
                    expected_return_date: Set(None),
                    assign_condition: Set(Some(TRANSFER_ASSIGN_CONDITION.to_string())),
                    assign_condition_rating: Set(Some(TRANSFER_ASSIGN_RATING)),
                    assign_notes: Set(Some(format!("Transferred via request {transfer_id}"))),
                    assign_signature_url: Set(None),
                    assign_signature_hash: Set(None),
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
                new_assignment.insert(txn).await?;

                let mut asset_active: asset::ActiveModel = asset.into();
                asset_active.status = Set(AssetStatus::Assigned.to_string());
                asset_active.updated_at = Set(Some(now));
                asset_active.update(txn).await?;

                let mut transfer_active: asset_transfer::ActiveModel = transfer.into();
                transfer_active.status = Set(TransferStatus::Completed.to_string());
                transfer_active.admin_approver_id = Set(Some(admin_user_id));
                transfer_active.admin_approved_at = Set(Some(now));
                transfer_active.admin_notes = Set(notes);
                transfer_active.completed_at = Set(Some(now));
                let completed = transfer_active.update(txn).await?;

                Ok(completed)
            })
        })
        .await?;

        info!(transfer_id = %transfer_id, "Completed transfer");
        self.emit(Event::TransferCompleted {
            transfer_id,
            asset_id,
            new_assignment_id,
            approver_user_id: admin_user_id,
        })
        .await;

        Ok(completed)
    }

    /// Reject a transfer from either non-terminal state.
    #[instrument(skip(self, request))]
    pub async fn reject_transfer(
        &self,
        transfer_id: Uuid,
        request: RejectTransferRequest,
        rejected_by_user_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        request.validate()?;

        let transfer = self.find_transfer(transfer_id).await?;
        let status = parse_status(&transfer.status)?;
        match status {
            TransferStatus::Completed => {
                return Err(ServiceError::InvalidOperation(
                    "Cannot reject a completed transfer".to_string(),
                ));
            }
            TransferStatus::Rejected => {
                return Err(ServiceError::InvalidOperation(
                    "Transfer is already rejected".to_string(),
                ));
            }
            _ => {}
        }

        let asset_id = transfer.asset_id;
        let mut active: asset_transfer::ActiveModel = transfer.into();
        active.status = Set(TransferStatus::Rejected.to_string());
        active.rejected_by_user_id = Set(Some(rejected_by_user_id));
        active.rejected_at = Set(Some(Utc::now()));
        active.rejection_reason = Set(Some(request.reason));
        let updated = active.update(&*self.db_pool).await?;

        info!(transfer_id = %transfer_id, "Rejected transfer");
        self.emit(Event::TransferRejected {
            transfer_id,
            asset_id,
            rejected_by_user_id,
        })
        .await;

        Ok(updated)
    }

    pub async fn get_transfer(
        &self,
        transfer_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        self.find_transfer(transfer_id).await
    }

    /// List transfers matching the filters, newest first.
    pub async fn list_transfers(
        &self,
        filters: TransferFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<asset_transfer::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let query = asset_transfer::Entity::find()
            .filter(build_transfer_filters(&filters))
            .order_by(asset_transfer::Column::RequestedAt, Order::Desc);

        let total = query.clone().count(db).await?;
        let page = page.max(1);
        let transfers = query
            .offset((page - 1) * limit)
            .limit(limit)
            .all(db)
            .await?;

        Ok((transfers, total))
    }

    /// Requests awaiting someone's decision, oldest first so queues drain
    /// in order.
    pub async fn list_pending(&self) -> Result<Vec<asset_transfer::Model>, ServiceError> {
        let transfers = asset_transfer::Entity::find()
            .filter(
                asset_transfer::Column::Status.is_in(vec![
                    TransferStatus::Pending.to_string(),
                    TransferStatus::ManagerApproved.to_string(),
                ]),
            )
            .order_by(asset_transfer::Column::RequestedAt, Order::Asc)
            .all(&*self.db_pool)
            .await?;
        Ok(transfers)
    }

    #[instrument(skip(self))]
    pub async fn get_statistics(&self) -> Result<TransferStatisticsResponse, ServiceError> {
        let db = &*self.db_pool;

        let count_with_status = |status: TransferStatus| {
            asset_transfer::Entity::find()
                .filter(asset_transfer::Column::Status.eq(status.to_string()))
                .count(db)
        };

        let total = asset_transfer::Entity::find().count(db).await?;
        let pending = count_with_status(TransferStatus::Pending).await?;
        let manager_approved = count_with_status(TransferStatus::ManagerApproved).await?;
        let completed = count_with_status(TransferStatus::Completed).await?;
        let rejected = count_with_status(TransferStatus::Rejected).await?;

        Ok(TransferStatisticsResponse {
            total,
            pending,
            manager_approved,
            completed,
            rejected,
            awaiting_action: pending + manager_approved,
        })
    }

    async fn find_transfer(
        &self,
        transfer_id: Uuid,
    ) -> Result<asset_transfer::Model, ServiceError> {
        asset_transfer::Entity::find_by_id(transfer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Transfer not found".to_string()))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}

fn parse_status(raw: &str) -> Result<TransferStatus, ServiceError> {
    TransferStatus::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("Unknown transfer status: {raw}")))
}

fn build_transfer_filters(filters: &TransferFilters) -> Condition {
    let mut condition = Condition::all();
    if let Some(asset_id) = filters.asset_id {
        condition = condition.add(asset_transfer::Column::AssetId.eq(asset_id));
    }
    if let Some(from_user_id) = filters.from_user_id {
        condition = condition.add(asset_transfer::Column::FromUserId.eq(from_user_id));
    }
    if let Some(to_user_id) = filters.to_user_id {
        condition = condition.add(asset_transfer::Column::ToUserId.eq(to_user_id));
    }
    if let Some(requested_by_user_id) = filters.requested_by_user_id {
        condition = condition.add(asset_transfer::Column::RequestedByUserId.eq(requested_by_user_id));
    }
    if let Some(status) = filters.status {
        condition = condition.add(asset_transfer::Column::Status.eq(status.to_string()));
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, Query};

    #[test]
    fn filters_cover_every_party_on_the_transfer() {
        let filters = TransferFilters {
            from_user_id: Some(Uuid::new_v4()),
            requested_by_user_id: Some(Uuid::new_v4()),
            status: Some(TransferStatus::Pending),
            ..Default::default()
        };
        let sql = Query::select()
            .cond_where(build_transfer_filters(&filters))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("from_user_id"));
        assert!(sql.contains("requested_by_user_id"));
        assert!(sql.contains("pending"));
    }
}
