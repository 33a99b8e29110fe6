use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, FromQueryResult,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::asset::{self, AssetStatus};
use crate::entities::{asset_assignment, asset_transfer, category};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Days per year used when prorating depreciation.
const DAYS_PER_YEAR: i64 = 365;

/// Request payload for registering an asset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 50))]
    pub asset_tag: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub category_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub purchase_date: DateTime<Utc>,
    pub purchase_cost: Decimal,
    pub salvage_value: Option<Decimal>,
    pub warranty_end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Request payload for updating an asset. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 50))]
    pub asset_tag: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub warranty_end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAssetStatusRequest {
    pub status: AssetStatus,
    pub notes: Option<String>,
}

/// Query-string filters for listing assets
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssetFilters {
    /// Matches against tag, name, serial number, model and manufacturer.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub purchased_after: Option<DateTime<Utc>>,
    pub purchased_before: Option<DateTime<Utc>>,
    /// Only assets whose warranty ends within this many days from now.
    pub warranty_expiring_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetResponse {
    pub id: Uuid,
    pub asset_tag: String,
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub category_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
    pub purchase_cost: Decimal,
    pub current_value: Option<Decimal>,
    pub salvage_value: Option<Decimal>,
    pub warranty_end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Combined custody and transfer history for a single asset
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetHistoryResponse {
    pub asset_id: Uuid,
    pub assignments: Vec<asset_assignment::Model>,
    pub transfers: Vec<asset_transfer::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetStatisticsResponse {
    pub total: u64,
    pub available: u64,
    pub assigned: u64,
    pub maintenance: u64,
    pub damaged: u64,
    pub retired: u64,
    pub total_current_value: Decimal,
    pub warranty_expiring_soon: u64,
}

/// Asset registry: registration, lookup, valuation and lifecycle status.
#[derive(Clone)]
pub struct AssetService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl AssetService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Register a new asset. The asset tag and serial number must be unique
    /// across all assets, including retired ones.
    #[instrument(skip(self, request), fields(asset_tag = %request.asset_tag))]
    pub async fn create_asset(
        &self,
        request: CreateAssetRequest,
        actor_user_id: Uuid,
    ) -> Result<AssetResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let tag_taken = asset::Entity::find()
            .filter(asset::Column::AssetTag.eq(request.asset_tag.as_str()))
            .one(db)
            .await?
            .is_some();
        if tag_taken {
            return Err(ServiceError::Conflict("Asset tag already exists".to_string()));
        }

        if let Some(serial) = request.serial_number.as_deref() {
            let serial_taken = asset::Entity::find()
                .filter(asset::Column::SerialNumber.eq(serial))
                .one(db)
                .await?
                .is_some();
            if serial_taken {
                return Err(ServiceError::Conflict(
                    "Serial number already exists".to_string(),
                ));
            }
        }

        let category = category::Entity::find_by_id(request.category_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;

        let now = Utc::now();
        let current_value = initial_current_value(
            request.purchase_cost,
            category.depreciation_rate,
            category.useful_life_years,
            request.salvage_value,
            request.purchase_date,
            now,
        );

        let asset_id = Uuid::new_v4();
        let new_asset = asset::ActiveModel {
            id: Set(asset_id),
            asset_tag: Set(request.asset_tag),
            name: Set(request.name),
            description: Set(request.description),
            serial_number: Set(request.serial_number),
            model: Set(request.model),
            manufacturer: Set(request.manufacturer),
            category_id: Set(request.category_id),
            vendor_id: Set(request.vendor_id),
            location_id: Set(request.location_id),
            status: Set(AssetStatus::Available.to_string()),
            purchase_date: Set(request.purchase_date),
            purchase_cost: Set(request.purchase_cost),
            current_value: Set(Some(current_value)),
            salvage_value: Set(request.salvage_value),
            warranty_end_date: Set(request.warranty_end_date),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
        };

        let saved = new_asset.insert(db).await.map_err(|e| {
            error!("Failed to create asset: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(asset_id = %asset_id, "Created asset");
        self.emit(Event::AssetCreated {
            asset_id,
            actor_user_id,
        })
        .await;

        Ok(model_to_response(saved))
    }

    /// Fetch a single asset; soft-deleted assets are treated as missing.
    pub async fn get_asset(&self, asset_id: Uuid) -> Result<AssetResponse, ServiceError> {
        let asset = self.find_live_asset(asset_id).await?;
        Ok(model_to_response(asset))
    }

    /// List assets matching the given filters, newest first.
    #[instrument(skip(self, filters))]
    pub async fn list_assets(
        &self,
        filters: AssetFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<AssetResponse>, u64), ServiceError> {
        let db = &*self.db_pool;
        let condition = build_asset_filters(&filters);

        let query = asset::Entity::find()
            .filter(condition)
            .order_by(asset::Column::CreatedAt, Order::Desc);

        let total = query.clone().count(db).await?;
        let page = page.max(1);
        let assets = query
            .offset((page - 1) * limit)
            .limit(limit)
            .all(db)
            .await?;

        Ok((assets.into_iter().map(model_to_response).collect(), total))
    }

    /// Update descriptive fields. Tag and serial uniqueness are re-checked
    /// against every other asset.
    #[instrument(skip(self, request))]
    pub async fn update_asset(
        &self,
        asset_id: Uuid,
        request: UpdateAssetRequest,
        actor_user_id: Uuid,
    ) -> Result<AssetResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let asset = self.find_live_asset(asset_id).await?;

        if let Some(tag) = request.asset_tag.as_deref() {
            let taken = asset::Entity::find()
                .filter(asset::Column::AssetTag.eq(tag))
                .filter(asset::Column::Id.ne(asset_id))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(ServiceError::Conflict("Asset tag already exists".to_string()));
            }
        }
        if let Some(serial) = request.serial_number.as_deref() {
            let taken = asset::Entity::find()
                .filter(asset::Column::SerialNumber.eq(serial))
                .filter(asset::Column::Id.ne(asset_id))
                .one(db)
                .await?
                .is_some();
            if taken {
                return Err(ServiceError::Conflict(
                    "Serial number already exists".to_string(),
                ));
            }
        }

        let mut active: asset::ActiveModel = asset.into();
        if let Some(tag) = request.asset_tag {
            active.asset_tag = Set(tag);
        }
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(serial) = request.serial_number {
            active.serial_number = Set(Some(serial));
        }
        if let Some(model) = request.model {
            active.model = Set(Some(model));
        }
        if let Some(manufacturer) = request.manufacturer {
            active.manufacturer = Set(Some(manufacturer));
        }
        if let Some(vendor_id) = request.vendor_id {
            active.vendor_id = Set(Some(vendor_id));
        }
        if let Some(location_id) = request.location_id {
            active.location_id = Set(Some(location_id));
        }
        if let Some(warranty) = request.warranty_end_date {
            active.warranty_end_date = Set(Some(warranty));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;

        info!(asset_id = %asset_id, "Updated asset");
        self.emit(Event::AssetUpdated {
            asset_id,
            actor_user_id,
        })
        .await;

        Ok(model_to_response(updated))
    }

    /// Soft-delete an asset. Refused while the asset has an active
    /// assignment; otherwise the asset is marked retired and hidden from
    /// all lookups. Its tag stays reserved.
    #[instrument(skip(self))]
    pub async fn delete_asset(
        &self,
        asset_id: Uuid,
        actor_user_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let asset = self.find_live_asset(asset_id).await?;

        let active_assignment = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssetId.eq(asset_id))
            .filter(asset_assignment::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if active_assignment.is_some() {
            return Err(ServiceError::BadRequest(
                "Cannot delete asset with active assignments".to_string(),
            ));
        }

        let mut active: asset::ActiveModel = asset.into();
        active.status = Set(AssetStatus::Retired.to_string());
        active.deleted_at = Set(Some(Utc::now()));
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        info!(asset_id = %asset_id, "Retired asset");
        self.emit(Event::AssetRetired {
            asset_id,
            actor_user_id,
        })
        .await;

        Ok(())
    }

    /// Directly set the lifecycle status. Marking an asset as assigned is
    /// only valid when an active assignment exists; assignment and transfer
    /// flows manage that status themselves.
    #[instrument(skip(self, request))]
    pub async fn update_status(
        &self,
        asset_id: Uuid,
        request: UpdateAssetStatusRequest,
        actor_user_id: Uuid,
    ) -> Result<AssetResponse, ServiceError> {
        let db = &*self.db_pool;
        let asset = self.find_live_asset(asset_id).await?;
        let old_status = asset.status.clone();

        if request.status == AssetStatus::Assigned {
            let active_assignment = asset_assignment::Entity::find()
                .filter(asset_assignment::Column::AssetId.eq(asset_id))
                .filter(asset_assignment::Column::IsActive.eq(true))
                .one(db)
                .await?;
            if active_assignment.is_none() {
                return Err(ServiceError::BadRequest(
                    "Cannot mark as assigned without active assignment".to_string(),
                ));
            }
        }

        let mut active: asset::ActiveModel = asset.into();
        active.status = Set(request.status.to_string());
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(asset_id = %asset_id, status = %request.status, "Changed asset status");
        self.emit(Event::AssetStatusChanged {
            asset_id,
            old_status,
            new_status: request.status.to_string(),
            actor_user_id,
        })
        .await;

        Ok(model_to_response(updated))
    }

    /// Full custody and transfer history, most recent first.
    pub async fn get_asset_history(
        &self,
        asset_id: Uuid,
    ) -> Result<AssetHistoryResponse, ServiceError> {
        let db = &*self.db_pool;
        // Confirm the asset exists before assembling history.
        self.find_live_asset(asset_id).await?;

        let assignments = asset_assignment::Entity::find()
            .filter(asset_assignment::Column::AssetId.eq(asset_id))
            .order_by(asset_assignment::Column::AssignedAt, Order::Desc)
            .all(db)
            .await?;

        let transfers = asset_transfer::Entity::find()
            .filter(asset_transfer::Column::AssetId.eq(asset_id))
            .order_by(asset_transfer::Column::RequestedAt, Order::Desc)
            .all(db)
            .await?;

        Ok(AssetHistoryResponse {
            asset_id,
            assignments,
            transfers,
        })
    }

    /// Fleet-wide statistics over non-deleted assets.
    #[instrument(skip(self))]
    pub async fn get_statistics(&self) -> Result<AssetStatisticsResponse, ServiceError> {
        let db = &*self.db_pool;

        let count_with_status = |status: AssetStatus| {
            asset::Entity::find()
                .filter(asset::Column::DeletedAt.is_null())
                .filter(asset::Column::Status.eq(status.to_string()))
                .count(db)
        };

        let total = asset::Entity::find()
            .filter(asset::Column::DeletedAt.is_null())
            .count(db)
            .await?;
        let available = count_with_status(AssetStatus::Available).await?;
        let assigned = count_with_status(AssetStatus::Assigned).await?;
        let maintenance = count_with_status(AssetStatus::Maintenance).await?;
        let damaged = count_with_status(AssetStatus::Damaged).await?;
        let retired = count_with_status(AssetStatus::Retired).await?;

        #[derive(FromQueryResult)]
        struct ValueSum {
            total: Option<Decimal>,
        }
        let sum = asset::Entity::find()
            .select_only()
            .column_as(asset::Column::CurrentValue.sum(), "total")
            .filter(asset::Column::DeletedAt.is_null())
            .into_model::<ValueSum>()
            .one(db)
            .await?;

        let horizon = Utc::now() + Duration::days(30);
        let warranty_expiring_soon = asset::Entity::find()
            .filter(asset::Column::DeletedAt.is_null())
            .filter(asset::Column::WarrantyEndDate.is_not_null())
            .filter(asset::Column::WarrantyEndDate.gte(Utc::now()))
            .filter(asset::Column::WarrantyEndDate.lte(horizon))
            .count(db)
            .await?;

        Ok(AssetStatisticsResponse {
            total,
            available,
            assigned,
            maintenance,
            damaged,
            retired,
            total_current_value: sum.and_then(|s| s.total).unwrap_or(Decimal::ZERO),
            warranty_expiring_soon,
        })
    }

    pub(crate) async fn find_live_asset(
        &self,
        asset_id: Uuid,
    ) -> Result<asset::Model, ServiceError> {
        asset::Entity::find_by_id(asset_id)
            .filter(asset::Column::DeletedAt.is_null())
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}

/// Build the list-filter condition. Always excludes soft-deleted rows.
fn build_asset_filters(filters: &AssetFilters) -> Condition {
    let mut condition = Condition::all().add(asset::Column::DeletedAt.is_null());

    if let Some(search) = filters.search.as_deref() {
        condition = condition.add(
            Condition::any()
                .add(asset::Column::AssetTag.contains(search))
                .add(asset::Column::Name.contains(search))
                .add(asset::Column::SerialNumber.contains(search))
                .add(asset::Column::Model.contains(search))
                .add(asset::Column::Manufacturer.contains(search)),
        );
    }
    if let Some(category_id) = filters.category_id {
        condition = condition.add(asset::Column::CategoryId.eq(category_id));
    }
    if let Some(vendor_id) = filters.vendor_id {
        condition = condition.add(asset::Column::VendorId.eq(vendor_id));
    }
    if let Some(location_id) = filters.location_id {
        condition = condition.add(asset::Column::LocationId.eq(location_id));
    }
    if let Some(status) = filters.status {
        condition = condition.add(asset::Column::Status.eq(status.to_string()));
    }
    if let Some(after) = filters.purchased_after {
        condition = condition.add(asset::Column::PurchaseDate.gte(after));
    }
    if let Some(before) = filters.purchased_before {
        condition = condition.add(asset::Column::PurchaseDate.lte(before));
    }
    if let Some(days) = filters.warranty_expiring_in_days {
        let horizon = Utc::now() + Duration::days(days);
        condition = condition
            .add(asset::Column::WarrantyEndDate.is_not_null())
            .add(asset::Column::WarrantyEndDate.lte(horizon));
    }

    condition
}

/// Valuation at registration time. Depreciation only applies when the
/// category defines both a rate and a useful life; otherwise the asset is
/// carried at cost.
fn initial_current_value(
    purchase_cost: Decimal,
    depreciation_rate: Option<Decimal>,
    useful_life_years: Option<i32>,
    salvage_value: Option<Decimal>,
    purchase_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Decimal {
    match (depreciation_rate, useful_life_years) {
        (Some(rate), Some(_)) => {
            depreciated_value(purchase_cost, rate, salvage_value, purchase_date, now)
        }
        _ => purchase_cost,
    }
}

/// Straight-line depreciation prorated by days held, floored at the salvage
/// value (or zero when none is set).
fn depreciated_value(
    purchase_cost: Decimal,
    rate_percent: Decimal,
    salvage_value: Option<Decimal>,
    purchase_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Decimal {
    let days = (now - purchase_date).num_days();
    if days <= 0 {
        return purchase_cost;
    }
    let years = Decimal::from(days) / Decimal::from(DAYS_PER_YEAR);
    let depreciation = purchase_cost * rate_percent / Decimal::from(100) * years;
    let floor = salvage_value.unwrap_or(Decimal::ZERO);
    (purchase_cost - depreciation).max(floor)
}

fn model_to_response(model: asset::Model) -> AssetResponse {
    AssetResponse {
        id: model.id,
        asset_tag: model.asset_tag,
        name: model.name,
        description: model.description,
        serial_number: model.serial_number,
        model: model.model,
        manufacturer: model.manufacturer,
        category_id: model.category_id,
        vendor_id: model.vendor_id,
        location_id: model.location_id,
        status: model.status,
        purchase_date: model.purchase_date,
        purchase_cost: model.purchase_cost,
        current_value: model.current_value,
        salvage_value: model.salvage_value,
        warranty_end_date: model.warranty_end_date,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn depreciation_after_one_year() {
        // 20%/yr on 1000 over exactly 365 days leaves 800.
        let value = depreciated_value(
            dec!(1000),
            dec!(20),
            None,
            date("2023-01-01T00:00:00Z"),
            date("2024-01-01T00:00:00Z"),
        );
        assert_eq!(value, dec!(800));
    }

    #[test]
    fn depreciation_floors_at_salvage_value() {
        let value = depreciated_value(
            dec!(1000),
            dec!(50),
            Some(dec!(300)),
            date("2020-01-01T00:00:00Z"),
            date("2024-01-01T00:00:00Z"),
        );
        assert_eq!(value, dec!(300));
    }

    #[test]
    fn depreciation_floors_at_zero_without_salvage() {
        let value = depreciated_value(
            dec!(1000),
            dec!(50),
            None,
            date("2020-01-01T00:00:00Z"),
            date("2024-01-01T00:00:00Z"),
        );
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn valuation_requires_both_rate_and_useful_life() {
        let bought = date("2023-01-01T00:00:00Z");
        let now = date("2024-01-01T00:00:00Z");

        // Rate without a useful life leaves the asset at cost.
        let value = initial_current_value(dec!(1000), Some(dec!(20)), None, None, bought, now);
        assert_eq!(value, dec!(1000));

        // Useful life without a rate likewise.
        let value = initial_current_value(dec!(1000), None, Some(5), None, bought, now);
        assert_eq!(value, dec!(1000));

        // Both present: one year at 20% leaves 800.
        let value = initial_current_value(dec!(1000), Some(dec!(20)), Some(5), None, bought, now);
        assert_eq!(value, dec!(800));
    }

    #[test]
    fn no_depreciation_on_purchase_day() {
        let now = date("2024-01-01T00:00:00Z");
        let value = depreciated_value(dec!(1000), dec!(20), None, now, now);
        assert_eq!(value, dec!(1000));
    }

    #[test]
    fn filters_apply_status_and_search() {
        use sea_orm::sea_query::{PostgresQueryBuilder, Query};

        let filters = AssetFilters {
            search: Some("MBP".to_string()),
            status: Some(AssetStatus::Available),
            ..Default::default()
        };
        let condition = build_asset_filters(&filters);
        let sql = Query::select()
            .cond_where(condition)
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("deleted_at"));
        assert!(sql.contains("available"));
        assert!(sql.contains("MBP"));
    }
}
