use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::entities::asset_assignment;
use crate::errors::ServiceError;
use crate::services::assignments::{
    AssignmentFilters, AssignmentStatisticsResponse, CreateAssignmentRequest, ReturnAssetRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ActiveFilterQuery {
    pub is_active: Option<bool>,
}

fn require_manager(user: &AuthUser) -> Result<(), ServiceError> {
    if !user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to manage assignments".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    summary = "Assign asset",
    description = "Assign an available asset to a user",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Asset assigned successfully", body = ApiResponse<asset_assignment::Model>),
        (status = 400, description = "Asset not available", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset or user not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Asset already has an active assignment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<asset_assignment::Model>>), ServiceError> {
    require_manager(&auth_user)?;
    let assignment = state
        .services
        .assignments
        .create_assignment(request, auth_user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(assignment))))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/return",
    summary = "Return asset",
    description = "Close an active assignment. Requires at least one photo documenting the returned asset.",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = ReturnAssetRequest,
    responses(
        (status = 200, description = "Asset returned successfully", body = ApiResponse<asset_assignment::Model>),
        (status = 400, description = "Assignment already returned or photos missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn return_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReturnAssetRequest>,
) -> Result<Json<ApiResponse<asset_assignment::Model>>, ServiceError> {
    require_manager(&auth_user)?;
    let assignment = state
        .services
        .assignments
        .return_asset(id, request, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    summary = "List assignments",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("asset_id" = Option<Uuid>, Query, description = "Filter by asset"),
        ("assigned_to_user_id" = Option<Uuid>, Query, description = "Filter by assignee"),
        ("assigned_by_user_id" = Option<Uuid>, Query, description = "Filter by assigner"),
        ("is_active" = Option<bool>, Query, description = "Filter by active or returned"),
    ),
    responses(
        (status = 200, description = "Assignments retrieved", body = ApiResponse<PaginatedResponse<asset_assignment::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AssignmentFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<asset_assignment::Model>>>, ServiceError> {
    if !auth_user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to list assignments".to_string(),
        ));
    }
    let (items, total) = state
        .services
        .assignments
        .list_assignments(filters, query.page, query.limit)
        .await?;
    let paginated = PaginatedResponse::new(items, total, query.page, query.limit);
    Ok(Json(ApiResponse::success(paginated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/active",
    summary = "List active assignments",
    responses(
        (status = 200, description = "Active assignments retrieved", body = ApiResponse<Vec<asset_assignment::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_active_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<asset_assignment::Model>>>, ServiceError> {
    if !auth_user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to list assignments".to_string(),
        ));
    }
    let assignments = state.services.assignments.list_active().await?;
    Ok(Json(ApiResponse::success(assignments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/me",
    summary = "My assignments",
    description = "Assignment history for the authenticated user",
    params(("is_active" = Option<bool>, Query, description = "Filter by active or returned")),
    responses(
        (status = 200, description = "Assignments retrieved", body = ApiResponse<Vec<asset_assignment::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn my_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ActiveFilterQuery>,
) -> Result<Json<ApiResponse<Vec<asset_assignment::Model>>>, ServiceError> {
    let assignments = state
        .services
        .assignments
        .list_for_user(auth_user.user_id, query.is_active)
        .await?;
    Ok(Json(ApiResponse::success(assignments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/statistics",
    summary = "Assignment statistics",
    responses(
        (status = 200, description = "Statistics retrieved", body = ApiResponse<AssignmentStatisticsResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assignment_statistics(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<AssignmentStatisticsResponse>>, ServiceError> {
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
    let stats = state.services.assignments.get_statistics().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/user/{user_id}",
    summary = "Assignments for user",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("is_active" = Option<bool>, Query, description = "Filter by active or returned"),
    ),
    responses(
        (status = 200, description = "Assignments retrieved", body = ApiResponse<Vec<asset_assignment::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assignments_for_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ActiveFilterQuery>,
) -> Result<Json<ApiResponse<Vec<asset_assignment::Model>>>, ServiceError> {
    // Users may always read their own history.
    if user_id != auth_user.user_id
        && !auth_user.has_any_role(&[
            roles::SUPER_ADMIN,
            roles::ASSET_MANAGER,
            roles::DEPT_HEAD,
            roles::AUDITOR,
        ])
    {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view another user's assignments".to_string(),
        ));
    }
    let assignments = state
        .services
        .assignments
        .list_for_user(user_id, query.is_active)
        .await?;
    Ok(Json(ApiResponse::success(assignments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    summary = "Get assignment",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment retrieved", body = ApiResponse<asset_assignment::Model>),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<asset_assignment::Model>>, ServiceError> {
    let assignment = state.services.assignments.get_assignment(id).await?;
    if assignment.assigned_to_user_id != auth_user.user_id
        && !auth_user.has_any_role(&[
            roles::SUPER_ADMIN,
            roles::ASSET_MANAGER,
            roles::DEPT_HEAD,
            roles::AUDITOR,
        ])
    {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view this assignment".to_string(),
        ));
    }
    Ok(Json(ApiResponse::success(assignment)))
}

pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assignments).post(create_assignment))
        .route("/active", get(list_active_assignments))
        .route("/me", get(my_assignments))
        .route("/statistics", get(assignment_statistics))
        .route("/user/{user_id}", get(assignments_for_user))
        .route("/{id}", get(get_assignment))
        .route("/{id}/return", post(return_asset))
}
