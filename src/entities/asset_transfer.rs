use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// State of a transfer request as it moves through the two-stage approval
/// chain. Stored as a snake_case string column.
///
/// `AdminApproved` is accepted on the wire for compatibility but is never
/// produced: admin approval completes the transfer in the same step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    ManagerApproved,
    AdminApproved,
    Completed,
    Rejected,
}

impl TransferStatus {
    /// In-flight statuses block any new transfer request for the same asset.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::ManagerApproved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "asset_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Uuid,
    pub requested_by_user_id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub transfer_reason: Option<String>,
    pub status: String,
    pub manager_approver_id: Option<Uuid>,
    pub manager_approved_at: Option<DateTime<Utc>>,
    pub manager_notes: Option<String>,
    pub admin_approver_id: Option<Uuid>,
    pub admin_approved_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rejected_by_user_id: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::Id"
    )]
    Asset,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ToUserId",
        to = "super::user::Column::Id"
    )]
    ToUser,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ToUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(TransferStatus::Pending.to_string(), "pending");
        assert_eq!(
            TransferStatus::ManagerApproved.to_string(),
            "manager_approved"
        );
        assert_eq!(
            TransferStatus::from_str("manager_approved").unwrap(),
            TransferStatus::ManagerApproved
        );
        assert!(TransferStatus::from_str("bogus").is_err());
    }

    #[test]
    fn in_flight_statuses() {
        assert!(TransferStatus::Pending.is_in_flight());
        assert!(TransferStatus::ManagerApproved.is_in_flight());
        assert!(!TransferStatus::Completed.is_in_flight());
        assert!(!TransferStatus::Rejected.is_in_flight());
    }
}
