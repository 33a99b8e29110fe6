use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::entities::asset_transfer;
use crate::errors::ServiceError;
use crate::services::transfers::{
    ApproveTransferRequest, CreateTransferRequest, RejectTransferRequest, TransferFilters,
    TransferStatisticsResponse,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    summary = "Request transfer",
    description = "Open a transfer request, either from the current holder or straight from inventory. The request must pass manager and then admin approval before the asset changes hands.",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer request opened", body = ApiResponse<asset_transfer::Model>),
        (status = 400, description = "Holder mismatch or a transfer is already in flight for this asset", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset or user not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn request_transfer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<ApiResponse<asset_transfer::Model>>), ServiceError> {
    if !auth_user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER, roles::DEPT_HEAD]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to request transfers".to_string(),
        ));
    }
    let transfer = state
        .services
        .transfers
        .request_transfer(request, auth_user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(transfer))))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/approve/manager",
    summary = "Manager approval",
    description = "First-stage approval of a pending transfer",
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = ApproveTransferRequest,
    responses(
        (status = 200, description = "Transfer manager approved", body = ApiResponse<asset_transfer::Model>),
        (status = 400, description = "Transfer is not pending", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn approve_transfer_as_manager(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveTransferRequest>,
) -> Result<Json<ApiResponse<asset_transfer::Model>>, ServiceError> {
    if !auth_user.has_any_role(&[roles::SUPER_ADMIN, roles::DEPT_HEAD]) {
        return Err(ServiceError::Forbidden(
            "Manager approval requires a department head role".to_string(),
        ));
    }
    let transfer = state
        .services
        .transfers
        .approve_by_manager(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(transfer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/approve/admin",
    summary = "Admin approval",
    description = "Second-stage approval. Atomically closes the old assignment, creates the new one and completes the transfer.",
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = ApproveTransferRequest,
    responses(
        (status = 200, description = "Transfer completed", body = ApiResponse<asset_transfer::Model>),
        (status = 400, description = "Transfer is not manager approved", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn approve_transfer_as_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveTransferRequest>,
) -> Result<Json<ApiResponse<asset_transfer::Model>>, ServiceError> {
    if !auth_user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER]) {
        return Err(ServiceError::Forbidden(
            "Admin approval requires an asset manager role".to_string(),
        ));
    }
    let transfer = state
        .services
        .transfers
        .approve_by_admin(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(transfer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/reject",
    summary = "Reject transfer",
    description = "Reject a transfer from either non-terminal state",
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = RejectTransferRequest,
    responses(
        (status = 200, description = "Transfer rejected", body = ApiResponse<asset_transfer::Model>),
        (status = 400, description = "Transfer already completed or rejected", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn reject_transfer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectTransferRequest>,
) -> Result<Json<ApiResponse<asset_transfer::Model>>, ServiceError> {
    if !auth_user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER, roles::DEPT_HEAD]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to reject transfers".to_string(),
        ));
    }
    let transfer = state
        .services
        .transfers
        .reject_transfer(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(transfer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    summary = "List transfers",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("asset_id" = Option<Uuid>, Query, description = "Filter by asset"),
        ("from_user_id" = Option<Uuid>, Query, description = "Filter by outgoing holder"),
        ("to_user_id" = Option<Uuid>, Query, description = "Filter by recipient"),
        ("requested_by_user_id" = Option<Uuid>, Query, description = "Filter by requester"),
        ("status" = Option<String>, Query, description = "Filter by transfer status"),
    ),
    responses(
        (status = 200, description = "Transfers retrieved", body = ApiResponse<PaginatedResponse<asset_transfer::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TransferFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<asset_transfer::Model>>>, ServiceError> {
    if !auth_user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to list transfers".to_string(),
        ));
    }
    let (items, total) = state
        .services
        .transfers
        .list_transfers(filters, query.page, query.limit)
        .await?;
    let paginated = PaginatedResponse::new(items, total, query.page, query.limit);
    Ok(Json(ApiResponse::success(paginated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/pending",
    summary = "Pending transfers",
    description = "Requests awaiting a decision, oldest first",
    responses(
        (status = 200, description = "Pending transfers retrieved", body = ApiResponse<Vec<asset_transfer::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_pending_transfers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<asset_transfer::Model>>>, ServiceError> {
    if !auth_user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to list transfers".to_string(),
        ));
    }
    let transfers = state.services.transfers.list_pending().await?;
    Ok(Json(ApiResponse::success(transfers)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/statistics",
    summary = "Transfer statistics",
    responses(
        (status = 200, description = "Statistics retrieved", body = ApiResponse<TransferStatisticsResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn transfer_statistics(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<TransferStatisticsResponse>>, ServiceError> {
    if !auth_user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view statistics".to_string(),
        ));
    }
    let stats = state.services.transfers.get_statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    summary = "Get transfer",
    params(("id" = Uuid, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer retrieved", body = ApiResponse<asset_transfer::Model>),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<asset_transfer::Model>>, ServiceError> {
    let transfer = state.services.transfers.get_transfer(id).await?;
    let involved = transfer.requested_by_user_id == auth_user.user_id
        || transfer.to_user_id == auth_user.user_id
        || transfer.from_user_id == Some(auth_user.user_id);
    if !involved
        && !auth_user.has_any_role(&[
            roles::SUPER_ADMIN,
            roles::ASSET_MANAGER,
            roles::DEPT_HEAD,
            roles::AUDITOR,
        ])
    {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view this transfer".to_string(),
        ));
    }
    Ok(Json(ApiResponse::success(transfer)))
}

pub fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(request_transfer))
        .route("/pending", get(list_pending_transfers))
        .route("/statistics", get(transfer_statistics))
        .route("/{id}", get(get_transfer))
        .route("/{id}/approve/manager", post(approve_transfer_as_manager))
        .route("/{id}/approve/admin", post(approve_transfer_as_admin))
        .route("/{id}/reject", post(reject_transfer))
}
