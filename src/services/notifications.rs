use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{asset_transfer, notification};
use crate::errors::ServiceError;
use crate::events::Event;

/// Notification dispatcher: turns domain events into in-app notifications
/// for the users involved.
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Create notifications for the event. Called from the event processor;
    /// events that concern nobody produce no rows.
    pub async fn dispatch(&self, event: &Event) -> Result<(), ServiceError> {
        match event {
            Event::AssetAssigned {
                asset_id,
                assigned_to_user_id,
                ..
            } => {
                self.notify(
                    *assigned_to_user_id,
                    "asset_assigned",
                    "Asset assigned to you",
                    "An asset has been assigned to you.",
                    json!({ "asset_id": asset_id }),
                )
                .await
            }
            Event::TransferRequested {
                transfer_id,
                asset_id,
                to_user_id,
                ..
            } => {
                self.notify(
                    *to_user_id,
                    "transfer_requested",
                    "Asset transfer requested",
                    "A transfer request naming you as the recipient is awaiting approval.",
                    json!({ "transfer_id": transfer_id, "asset_id": asset_id }),
                )
                .await
            }
            Event::TransferManagerApproved { transfer_id, .. } => {
                if let Some(transfer) = self.find_transfer(*transfer_id).await? {
                    self.notify(
                        transfer.requested_by_user_id,
                        "transfer_manager_approved",
                        "Transfer approved by manager",
                        "Your transfer request was approved by a manager and is awaiting admin approval.",
                        json!({ "transfer_id": transfer_id, "asset_id": transfer.asset_id }),
                    )
                    .await?;
                }
                Ok(())
            }
            Event::TransferCompleted {
                transfer_id,
                asset_id,
                ..
            } => {
                if let Some(transfer) = self.find_transfer(*transfer_id).await? {
                    self.notify(
                        transfer.to_user_id,
                        "transfer_completed",
                        "Asset transferred to you",
                        "A transfer has completed and the asset is now assigned to you.",
                        json!({ "transfer_id": transfer_id, "asset_id": asset_id }),
                    )
                    .await?;
                    if transfer.requested_by_user_id != transfer.to_user_id {
                        self.notify(
                            transfer.requested_by_user_id,
                            "transfer_completed",
                            "Transfer completed",
                            "Your transfer request has completed.",
                            json!({ "transfer_id": transfer_id, "asset_id": asset_id }),
                        )
                        .await?;
                    }
                }
                Ok(())
            }
            Event::TransferRejected {
                transfer_id,
                asset_id,
                ..
            } => {
                if let Some(transfer) = self.find_transfer(*transfer_id).await? {
                    self.notify(
                        transfer.requested_by_user_id,
                        "transfer_rejected",
                        "Transfer request rejected",
                        "Your transfer request was rejected.",
                        json!({ "transfer_id": transfer_id, "asset_id": asset_id }),
                    )
                    .await?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Notifications for a user, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let mut query = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notification::Column::ReadAt.is_null());
        }
        let notifications = query
            .order_by(notification::Column::CreatedAt, Order::Desc)
            .all(&*self.db_pool)
            .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let count = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::ReadAt.is_null())
            .count(&*self.db_pool)
            .await?;
        Ok(count)
    }

    /// Mark a notification read. Users can only touch their own rows.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        let row = notification::Entity::find_by_id(notification_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))?;

        if row.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "Notification belongs to another user".to_string(),
            ));
        }
        if row.read_at.is_some() {
            return Ok(row);
        }

        let mut active: notification::ActiveModel = row.into();
        active.read_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db_pool).await?;
        Ok(updated)
    }

    async fn notify(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        message: &str,
        data: serde_json::Value,
    ) -> Result<(), ServiceError> {
        let row = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            kind: Set(kind.to_string()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            data: Set(Some(data)),
            read_at: Set(None),
            created_at: Set(Utc::now()),
        };
        row.insert(&*self.db_pool).await?;
        Ok(())
    }

    async fn find_transfer(
        &self,
        transfer_id: Uuid,
    ) -> Result<Option<asset_transfer::Model>, ServiceError> {
        Ok(asset_transfer::Entity::find_by_id(transfer_id)
            .one(&*self.db_pool)
            .await?)
    }
}
