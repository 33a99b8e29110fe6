use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::audit_log;
use crate::errors::ServiceError;
use crate::events::Event;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AuditLogFilters {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub actor_user_id: Option<Uuid>,
}

/// Audit recorder: turns domain events into append-only audit rows.
#[derive(Clone)]
pub struct AuditService {
    db_pool: Arc<DbPool>,
}

impl AuditService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Persist one audit row for the event. Called from the event processor;
    /// failures are the caller's to log, never to propagate.
    pub async fn record(&self, event: &Event) -> Result<(), ServiceError> {
        let (entity_type, entity_id) = event.entity();
        let details = serde_json::to_value(event)
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let row = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id),
            action: Set(event.action().to_string()),
            actor_user_id: Set(event.actor()),
            details: Set(Some(details)),
            created_at: Set(Utc::now()),
        };
        row.insert(&*self.db_pool).await?;
        Ok(())
    }

    /// Query the audit trail, newest first.
    #[instrument(skip(self, filters))]
    pub async fn list_entries(
        &self,
        filters: AuditLogFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<audit_log::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query = audit_log::Entity::find();
        if let Some(entity_type) = filters.entity_type.as_deref() {
            query = query.filter(audit_log::Column::EntityType.eq(entity_type));
        }
        if let Some(entity_id) = filters.entity_id {
            query = query.filter(audit_log::Column::EntityId.eq(entity_id));
        }
        if let Some(actor_user_id) = filters.actor_user_id {
            query = query.filter(audit_log::Column::ActorUserId.eq(actor_user_id));
        }
        let query = query.order_by(audit_log::Column::CreatedAt, Order::Desc);

        let total = query.clone().count(db).await?;
        let page = page.max(1);
        let entries = query.offset((page - 1) * limit).limit(limit).all(db).await?;

        Ok((entries, total))
    }
}
