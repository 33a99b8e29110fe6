use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::errors::ServiceError;
use crate::services::assets::{
    AssetFilters, AssetHistoryResponse, AssetResponse, AssetStatisticsResponse,
    CreateAssetRequest, UpdateAssetRequest, UpdateAssetStatusRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

fn require_manager(user: &AuthUser) -> Result<(), ServiceError> {
    if !user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage assets".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/assets",
    summary = "List assets",
    description = "Get a paginated list of assets with optional filtering",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("search" = Option<String>, Query, description = "Search tag, name, serial, model or manufacturer"),
        ("status" = Option<String>, Query, description = "Filter by lifecycle status"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("warranty_expiring_in_days" = Option<i64>, Query, description = "Only assets whose warranty ends within N days"),
    ),
    responses(
        (status = 200, description = "Assets retrieved successfully", body = ApiResponse<PaginatedResponse<AssetResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_assets(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AssetFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<AssetResponse>>>, ServiceError> {
    let (items, total) = state
        .services
        .assets
        .list_assets(filters, query.page, query.limit)
        .await?;
    let paginated = PaginatedResponse::new(items, total, query.page, query.limit);
    Ok(Json(ApiResponse::success(paginated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets",
    summary = "Register asset",
    description = "Register a new asset in the registry",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset registered successfully", body = ApiResponse<AssetResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Tag or serial number already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ServiceError> {
    require_manager(&auth_user)?;
    let asset = state
        .services
        .assets
        .create_asset(request, auth_user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(asset))))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/statistics",
    summary = "Asset statistics",
    description = "Fleet-wide counts by status, total value and warranty outlook",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<AssetStatisticsResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn asset_statistics(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<AssetStatisticsResponse>>, ServiceError> {
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
    let stats = state.services.assets.get_statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    summary = "Get asset",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset retrieved successfully", body = ApiResponse<AssetResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_asset(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AssetResponse>>, ServiceError> {
    let asset = state.services.assets.get_asset(id).await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    summary = "Update asset",
    description = "Update descriptive fields of an asset",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated successfully", body = ApiResponse<AssetResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Tag or serial number already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAssetRequest>,
) -> Result<Json<ApiResponse<AssetResponse>>, ServiceError> {
    require_manager(&auth_user)?;
    let asset = state
        .services
        .assets
        .update_asset(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    summary = "Retire asset",
    description = "Soft-delete an asset. Fails while the asset is assigned; the tag stays reserved.",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset retired"),
        (status = 400, description = "Asset has an active assignment", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    require_manager(&auth_user)?;
    state
        .services
        .assets
        .delete_asset(id, auth_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/v1/assets/{id}/status",
    summary = "Update asset status",
    description = "Directly set the lifecycle status, e.g. send an asset to maintenance",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAssetStatusRequest,
    responses(
        (status = 200, description = "Status updated successfully", body = ApiResponse<AssetResponse>),
        (status = 400, description = "Invalid status transition", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_asset_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAssetStatusRequest>,
) -> Result<Json<ApiResponse<AssetResponse>>, ServiceError> {
    require_manager(&auth_user)?;
    let asset = state
        .services
        .assets
        .update_status(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(asset)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/history",
    summary = "Asset history",
    description = "Full custody and transfer history for an asset, most recent first",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<AssetHistoryResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_asset_history(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AssetHistoryResponse>>, ServiceError> {
    let history = state.services.assets.get_asset_history(id).await?;
    Ok(Json(ApiResponse::success(history)))
}

pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/statistics", get(asset_statistics))
        .route(
            "/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/{id}/status", patch(update_asset_status))
        .route("/{id}/history", get(get_asset_history))
}
