use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use std::sync::Arc;
use uuid::Uuid;

use assettrack_api::entities::{asset, asset_assignment, asset_transfer, user};
use assettrack_api::errors::ServiceError;
use assettrack_api::services::transfers::{
    ApproveTransferRequest, CreateTransferRequest, RejectTransferRequest, TransferService,
};

fn asset_model(status: &str) -> asset::Model {
    asset::Model {
        id: Uuid::new_v4(),
        asset_tag: "LT-0007".to_string(),
        name: "ThinkPad X1".to_string(),
        description: None,
        serial_number: None,
        model: None,
        manufacturer: Some("Lenovo".to_string()),
        category_id: Uuid::new_v4(),
        vendor_id: None,
        location_id: None,
        status: status.to_string(),
        purchase_date: Utc::now(),
        purchase_cost: dec!(1800),
        current_value: Some(dec!(1400)),
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
        email: "sam@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Okafor".to_string(),
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

fn assignment_model(asset_id: Uuid, assigned_to_user_id: Uuid) -> asset_assignment::Model {
    asset_assignment::Model {
        id: Uuid::new_v4(),
        asset_id,
        assigned_to_user_id,
        assigned_by_user_id: Uuid::new_v4(),
        assigned_at: Utc::now(),
        expected_return_date: None,
        assign_condition: Some("Good".to_string()),
        assign_condition_rating: Some(4),
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
        is_active: true,
        created_at: Utc::now(),
    }
}

fn transfer_model(status: &str) -> asset_transfer::Model {
    asset_transfer::Model {
        id: Uuid::new_v4(),
        asset_id: Uuid::new_v4(),
        from_user_id: Some(Uuid::new_v4()),
        to_user_id: Uuid::new_v4(),
        requested_by_user_id: Uuid::new_v4(),
        requested_at: Utc::now(),
        transfer_reason: Some("Team change".to_string()),
        status: status.to_string(),
        manager_approver_id: None,
        manager_approved_at: None,
        manager_notes: None,
        admin_approver_id: None,
        admin_approved_at: None,
        admin_notes: None,
        completed_at: None,
        rejected_by_user_id: None,
        rejected_at: None,
        rejection_reason: None,
    }
}

fn create_request(asset_id: Uuid, to_user_id: Uuid) -> CreateTransferRequest {
    CreateTransferRequest {
        asset_id,
        from_user_id: None,
        to_user_id,
        transfer_reason: Some("Team change".to_string()),
    }
}

#[tokio::test]
async fn inventory_transfer_needs_no_active_assignment() {
    let asset = asset_model("available");
    let asset_id = asset.id;
    let mut pending = transfer_model("pending");
    pending.asset_id = asset_id;
    pending.from_user_id = None;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([Vec::<asset_assignment::Model>::new()])
        .append_query_results([vec![user_model()]])
        .append_query_results([Vec::<asset_transfer::Model>::new()])
        .append_query_results([vec![pending]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .request_transfer(create_request(asset_id, Uuid::new_v4()), Uuid::new_v4())
        .await;

    assert_matches!(result, Ok(transfer) => {
        assert_eq!(transfer.status, "pending");
        assert_eq!(transfer.from_user_id, None);
    });
}

#[tokio::test]
async fn transfer_from_the_wrong_holder_is_rejected() {
    let asset = asset_model("assigned");
    let asset_id = asset.id;
    let holder_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([vec![assignment_model(asset_id, holder_id)]])
        .append_query_results([vec![user_model()]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let mut request = create_request(asset_id, Uuid::new_v4());
    request.from_user_id = Some(Uuid::new_v4());
    let result = service.request_transfer(request, Uuid::new_v4()).await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "Asset is not currently assigned to the specified from user");
    });
}

#[tokio::test]
async fn only_one_transfer_may_be_in_flight_per_asset() {
    let asset = asset_model("assigned");
    let asset_id = asset.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![asset]])
        .append_query_results([vec![assignment_model(asset_id, Uuid::new_v4())]])
        .append_query_results([vec![user_model()]])
        .append_query_results([vec![transfer_model("pending")]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .request_transfer(create_request(asset_id, Uuid::new_v4()), Uuid::new_v4())
        .await;

    assert_matches!(result, Err(ServiceError::BadRequest(msg)) => {
        assert_eq!(msg, "There is already a pending transfer request for this asset");
    });
}

#[tokio::test]
async fn manager_approval_requires_pending_status() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![transfer_model("manager_approved")]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .approve_by_manager(
            Uuid::new_v4(),
            ApproveTransferRequest::default(),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::InvalidOperation(msg)) => {
        assert_eq!(msg, "Cannot approve transfer with status: manager_approved");
    });
}

#[tokio::test]
async fn manager_approval_advances_a_pending_transfer() {
    let pending = transfer_model("pending");
    let mut approved = pending.clone();
    approved.status = "manager_approved".to_string();
    approved.manager_approver_id = Some(Uuid::new_v4());
    approved.manager_approved_at = Some(Utc::now());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![pending]])
        .append_query_results([vec![approved]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .approve_by_manager(
            Uuid::new_v4(),
            ApproveTransferRequest::default(),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Ok(updated) => {
        assert_eq!(updated.status, "manager_approved");
        assert!(updated.manager_approved_at.is_some());
    });
}

#[tokio::test]
async fn admin_approval_requires_manager_approval_first() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![transfer_model("pending")]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .approve_by_admin(
            Uuid::new_v4(),
            ApproveTransferRequest::default(),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::InvalidOperation(msg)) => {
        assert_eq!(msg, "Transfer must be manager approved first. Current status: pending");
    });
}

#[tokio::test]
async fn admin_approval_re_homes_the_asset_and_completes_the_transfer() {
    let asset = asset_model("assigned");
    let mut transfer = transfer_model("manager_approved");
    transfer.asset_id = asset.id;
    let old_holder = assignment_model(asset.id, transfer.from_user_id.unwrap());

    let mut closed = old_holder.clone();
    closed.is_active = false;
    closed.returned_at = Some(Utc::now());

    let mut new_assignment = assignment_model(asset.id, transfer.to_user_id);
    new_assignment.assign_notes = Some(format!("Transferred via request {}", transfer.id));

    let mut assigned_asset = asset.clone();
    assigned_asset.status = "assigned".to_string();

    let mut completed = transfer.clone();
    completed.status = "completed".to_string();
    completed.admin_approver_id = Some(Uuid::new_v4());
    completed.admin_approved_at = Some(Utc::now());
    completed.completed_at = Some(Utc::now());

    let transfer_id = transfer.id;
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![transfer]])
            .append_query_results([vec![asset]])
            .append_query_results([vec![old_holder]])
            .append_query_results([vec![closed]])
            .append_query_results([vec![new_assignment]])
            .append_query_results([vec![assigned_asset]])
            .append_query_results([vec![completed]])
            .into_connection(),
    );
    let service = TransferService::new(db.clone(), None);

    let result = service
        .approve_by_admin(
            transfer_id,
            ApproveTransferRequest::default(),
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Ok(updated) => {
        assert_eq!(updated.status, "completed");
        assert!(updated.completed_at.is_some());
        assert!(updated.admin_approved_at.is_some());
    });

    // All four writes must happen inside the one transaction: close the old
    // assignment, open the new one, flip the asset, complete the transfer.
    drop(service);
    let log = Arc::try_unwrap(db)
        .expect("connection still shared")
        .into_transaction_log();
    let statements = format!("{log:?}");
    assert!(statements.contains(r#"UPDATE "asset_assignments""#));
    assert!(statements.contains(r#"INSERT INTO "asset_assignments""#));
    assert!(statements.contains(r#"UPDATE "assets""#));
    assert!(statements.contains(r#"UPDATE "asset_transfers""#));
    assert!(statements.contains("completed"));
}

#[tokio::test]
async fn completed_transfers_cannot_be_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![transfer_model("completed")]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .reject_transfer(
            Uuid::new_v4(),
            RejectTransferRequest {
                reason: "No longer needed".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::InvalidOperation(msg)) => {
        assert_eq!(msg, "Cannot reject a completed transfer");
    });
}

#[tokio::test]
async fn rejection_is_not_repeatable() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![transfer_model("rejected")]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .reject_transfer(
            Uuid::new_v4(),
            RejectTransferRequest {
                reason: "Duplicate request".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::InvalidOperation(msg)) => {
        assert_eq!(msg, "Transfer is already rejected");
    });
}

#[tokio::test]
async fn manager_approved_transfer_can_be_rejected() {
    let approved = transfer_model("manager_approved");
    let mut rejected = approved.clone();
    rejected.status = "rejected".to_string();
    rejected.rejected_at = Some(Utc::now());
    rejected.rejection_reason = Some("Asset reallocated".to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![approved]])
        .append_query_results([vec![rejected]])
        .into_connection();
    let service = TransferService::new(Arc::new(db), None);

    let result = service
        .reject_transfer(
            Uuid::new_v4(),
            RejectTransferRequest {
                reason: "Asset reallocated".to_string(),
            },
            Uuid::new_v4(),
        )
        .await;

    assert_matches!(result, Ok(updated) => {
        assert_eq!(updated.status, "rejected");
        assert!(updated.rejected_at.is_some());
    });
}
