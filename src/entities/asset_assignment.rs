use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Custody record tying an asset to a user. At most one row per asset may be
/// active; the database enforces this with a partial unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "asset_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub assigned_to_user_id: Uuid,
    pub assigned_by_user_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub assign_condition: Option<String>,
    pub assign_condition_rating: Option<i32>,
    pub assign_notes: Option<String>,
    pub assign_signature_url: Option<String>,
    pub assign_signature_hash: Option<String>,
    pub returned_at: Option<DateTime<Utc>>,
    pub returned_to_user_id: Option<Uuid>,
    pub return_condition: Option<String>,
    pub return_condition_rating: Option<i32>,
    /// JSON array of photo URLs documenting the asset state at return time.
    pub return_photo_urls: Option<Json>,
    pub return_notes: Option<String>,
    pub return_signature_url: Option<String>,
    pub return_signature_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
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
        from = "Column::AssignedToUserId",
        to = "super::user::Column::Id"
    )]
    AssignedToUser,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedToUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
