use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use std::sync::Arc;
use uuid::Uuid;

use assettrack_api::entities::{asset, asset_assignment, category};
use assettrack_api::errors::ServiceError;
use assettrack_api::services::assets::{
    AssetService, CreateAssetRequest, UpdateAssetStatusRequest,
};

fn asset_model(status: &str) -> asset::Model {
    asset::Model {
        id: Uuid::new_v4(),
        asset_tag: "LT-0001".to_string(),
        name: "MacBook Pro 14".to_string(),
        description: None,
        serial_number: Some("C02XK1ABCD".to_string()),
        model: Some("A2442".to_string()),
        manufacturer: Some("Apple".to_string()),
        category_id: Uuid::new_v4(),
        vendor_id: None,
        location_id: None,
        status: status.to_string(),
        purchase_date: Utc::now(),
        purchase_cost: dec!(2499),
        current_value: Some(dec!(2499)),
        salvage_value: None,
        warranty_end_date: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
        deleted_at: None,
    }
}

fn assignment_model(asset_id: Uuid, is_active: bool) -> asset_assignment::Model {
    asset_assignment::Model {
        id: Uuid::new_v4(),
        asset_id,
        assigned_to_user_id: Uuid::new_v4(),
        assigned_by_user_id: Uuid::new_v4(),
        assigned_at: Utc::now(),
        expected_return_date: None,
        assign_condition: Some("Good".to_string()),
        assign_condition_rating: Some(5),
        assign_notes: None,
        assign_signature_url: None,
        assign_signature_hash: None,
        returned_at: None,
        returned_to_user_id: None,
        return_condition: None,
        return_condition_rating: None,
        return_photo_urls: None,
        return_notes: None,
        return_signature_url: None,
        return_signature_hash: None,
        is_active,
        created_at: Utc::now(),
    }
}

fn create_request() -> CreateAssetRequest {
    CreateAssetRequest {
        asset_tag: "LT-0001".to_string(),
        name: "MacBook Pro 14".to_string(),
        description: None,
        serial_number: None,
        model: None,
        manufacturer: None,
        category_id: Uuid::new_v4(),
        vendor_id: None,
        location_id: None,
        purchase_date: Utc::now(),
        purchase_cost: dec!(2499),
        salvage_value: None,
        warranty_end_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn get_asset_returns_not_found_for_missing_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<asset::Model>::new()])
        .into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let result = service.get_asset(Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) => {
        assert_eq!(msg, "Asset not found");
    });
}

#[tokio::test]
async fn create_asset_rejects_duplicate_tag() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset_model("available")]])
        .into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let result = service.create_asset(create_request(), Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::Conflict(msg)) => {
        assert_eq!(msg, "Asset tag already exists");
    });
}

#[tokio::test]
async fn create_asset_rejects_unknown_category() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<asset::Model>::new()])
        .append_query_results([Vec::<category::Model>::new()])
        .into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let result = service.create_asset(create_request(), Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) => {
        assert_eq!(msg, "Category not found");
    });
}

#[tokio::test]
async fn category_without_useful_life_carries_asset_at_cost() {
    let category = category::Model {
        id: Uuid::new_v4(),
        name: "Laptops".to_string(),
        code: "LT".to_string(),
        depreciation_rate: Some(dec!(20)),
        useful_life_years: None,
        salvage_value: Some(dec!(100)),
        created_at: Utc::now(),
    };
    let mut saved = asset_model("available");
    saved.current_value = Some(dec!(2499));

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<asset::Model>::new()])
            .append_query_results([vec![category]])
            .append_query_results([vec![saved]])
            .into_connection(),
    );
    let service = AssetService::new(db.clone(), None);

    let mut request = create_request();
    request.purchase_date = Utc::now() - chrono::Duration::days(365);
    let result = service.create_asset(request, Uuid::new_v4()).await;

    assert_matches!(result, Ok(asset) => {
        assert_eq!(asset.current_value, Some(dec!(2499)));
    });

    // The INSERT must carry the purchase cost as current_value: with no
    // useful life on the category, a year of ownership depreciates nothing.
    drop(service);
    let log = Arc::try_unwrap(db)
        .expect("connection still shared")
        .into_transaction_log();
    let statements = format!("{log:?}");
    assert!(statements.matches("2499").count() >= 2);
    assert!(!statements.contains("1999.2"));
}

#[tokio::test]
async fn create_asset_rejects_empty_tag_before_touching_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let mut request = create_request();
    request.asset_tag = String::new();

    let result = service.create_asset(request, Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn delete_asset_refused_while_assignment_is_active() {
    let asset = asset_model("assigned");
    let assignment = assignment_model(asset.id, true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([vec![assignment]])
        .into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let result = service.delete_asset(Uuid::new_v4(), Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "Cannot delete asset with active assignments");
    });
}

#[tokio::test]
async fn cannot_mark_assigned_without_active_assignment() {
    let asset = asset_model("available");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([Vec::<asset_assignment::Model>::new()])
        .into_connection();
    let service = AssetService::new(Arc::new(db), None);

    let request = UpdateAssetStatusRequest {
        status: asset::AssetStatus::Assigned,
        notes: None,
    };
    let result = service
        .update_status(Uuid::new_v4(), request, Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "Cannot mark as assigned without active assignment");
    });
}
