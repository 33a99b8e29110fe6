use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use std::sync::Arc;
use uuid::Uuid;

use assettrack_api::entities::{asset, asset_assignment, user};
use assettrack_api::errors::ServiceError;
use assettrack_api::services::assignments::{
    AssignmentService, CreateAssignmentRequest, ReturnAssetRequest,
};

fn asset_model(status: &str) -> asset::Model {
    asset::Model {
        id: Uuid::new_v4(),
        asset_tag: "MON-0042".to_string(),
        name: "Dell U2723QE".to_string(),
        description: None,
        serial_number: None,
        model: None,
        manufacturer: Some("Dell".to_string()),
        category_id: Uuid::new_v4(),
        vendor_id: None,
        location_id: None,
        status: status.to_string(),
        purchase_date: Utc::now(),
        purchase_cost: dec!(650),
        current_value: Some(dec!(650)),
        salvage_value: None,
        warranty_end_date: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
        deleted_at: None,
    }
}

fn user_model() -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        email: "jordan@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder".to_string(),
        first_name: "Jordan".to_string(),
        last_name: "Reyes".to_string(),
        phone: None,
        department_id: None,
        is_active: true,
        mfa_enabled: false,
        mfa_secret: None,
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

fn create_request(asset_id: Uuid, assigned_to_user_id: Uuid) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        asset_id,
        assigned_to_user_id,
        expected_return_date: None,
        assign_condition: Some("Good".to_string()),
        assign_condition_rating: Some(5),
        assign_notes: None,
        assign_signature_url: None,
    }
}

fn return_request(photos: Vec<String>, condition: &str) -> ReturnAssetRequest {
    ReturnAssetRequest {
        return_condition: condition.to_string(),
        return_condition_rating: Some(3),
        return_photo_urls: photos,
        return_notes: None,
        return_signature_url: None,
    }
}

#[tokio::test]
async fn create_assignment_requires_existing_asset() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<asset::Model>::new()])
        .into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .create_assignment(create_request(Uuid::new_v4(), Uuid::new_v4()), Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) => {
        assert_eq!(msg, "Asset not found");
    });
}

#[tokio::test]
async fn create_assignment_rejects_unavailable_asset() {
    let asset = asset_model("maintenance");
    let asset_id = asset.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([vec![user_model()]])
        .into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .create_assignment(create_request(asset_id, Uuid::new_v4()), Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "Asset is not available for assignment (status: maintenance)");
    });
}

#[tokio::test]
async fn create_assignment_rejects_second_active_assignment() {
    let asset = asset_model("available");
    let asset_id = asset.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([vec![user_model()]])
        .append_query_results([vec![assignment_model(asset_id, true)]])
        .into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .create_assignment(create_request(asset_id, Uuid::new_v4()), Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::Conflict(msg)) => {
        assert_eq!(msg, "Asset already has an active assignment");
    });
}

#[tokio::test]
async fn user_history_can_be_narrowed_to_active_custody() {
    let user_id = Uuid::new_v4();
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![assignment_model(Uuid::new_v4(), true)]])
            .into_connection(),
    );
    let service = AssignmentService::new(db.clone(), None);

    let result = service.list_for_user(user_id, Some(true)).await;

    assert_matches!(result, Ok(assignments) => {
        assert_eq!(assignments.len(), 1);
    });

    drop(service);
    let log = Arc::try_unwrap(db)
        .expect("connection still shared")
        .into_transaction_log();
    let statements = format!("{log:?}");
    assert!(statements.contains("assigned_to_user_id"));
    assert!(statements.contains("is_active"));
}

#[tokio::test]
async fn return_requires_at_least_one_photo() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .return_asset(Uuid::new_v4(), return_request(vec![], "Good"), Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(msg)) => {
        assert_eq!(msg, "At least one return photo is required");
    });
}

#[tokio::test]
async fn return_rejects_already_returned_assignment() {
    let assignment = assignment_model(Uuid::new_v4(), false);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![assignment]])
        .into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .return_asset(
            Uuid::new_v4(),
            return_request(vec!["https://cdn.example.com/p1.jpg".to_string()], "Good"),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "Assignment is already returned");
    });
}

#[tokio::test]
async fn poor_condition_return_closes_the_assignment() {
    let asset = asset_model("assigned");
    let assignment = assignment_model(asset.id, true);
    let mut closed = assignment.clone();
    closed.is_active = false;
    closed.returned_at = Some(Utc::now());
    closed.return_condition = Some("Poor".to_string());
    let mut damaged = asset.clone();
    damaged.status = "damaged".to_string();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![assignment]])
        .append_query_results([vec![asset]])
        .append_query_results([vec![closed]])
        .append_query_results([vec![damaged]])
        .into_connection();
    let service = AssignmentService::new(Arc::new(db), None);

    let result = service
        .return_asset(
            Uuid::new_v4(),
            return_request(vec!["https://cdn.example.com/p1.jpg".to_string()], "Poor"),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Ok(updated) => {
        assert!(!updated.is_active);
        assert_eq!(updated.return_condition.as_deref(), Some("Poor"));
    });
}
