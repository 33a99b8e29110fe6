use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::errors::ServiceError;
use crate::services::users::{UpdateUserRolesRequest, UserFilters, UserResponse};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

fn require_directory_access(user: &AuthUser) -> Result<(), ServiceError> {
    if !user.has_any_role(&[
        roles::SUPER_ADMIN,
        roles::ASSET_MANAGER,
        roles::DEPT_HEAD,
        roles::AUDITOR,
    ]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to view the user directory".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    summary = "List users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("search" = Option<String>, Query, description = "Search email or name"),
        ("department_id" = Option<Uuid>, Query, description = "Filter by department"),
    ),
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<PaginatedResponse<UserResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<UserResponse>>>, ServiceError> {
    require_directory_access(&auth_user)?;
    let (items, total) = state
        .services
        .users
        .list_users(filters, query.page, query.limit)
        .await?;
    let paginated = PaginatedResponse::new(items, total, query.page, query.limit);
    Ok(Json(ApiResponse::success(paginated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    summary = "Get user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved", body = ApiResponse<UserResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    if id != auth_user.user_id {
        require_directory_access(&auth_user)?;
    }
    let user = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/roles",
    summary = "Replace user roles",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRolesRequest,
    responses(
        (status = 200, description = "Roles updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Unknown role name", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_user_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRolesRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    if !auth_user.is_super_admin() {
        return Err(ServiceError::Forbidden(
            "Only a super admin can change roles".to_string(),
        ));
    }
    let user = state.services.users.update_roles(id, request).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/active",
    summary = "Enable or disable a user",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Active flag updated", body = ApiResponse<UserResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    if !auth_user.is_super_admin() {
        return Err(ServiceError::Forbidden(
            "Only a super admin can enable or disable accounts".to_string(),
        ));
    }
    let user = state
        .services
        .users
        .set_active(id, request.is_active)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
        .route("/{id}/roles", put(update_user_roles))
        .route("/{id}/active", patch(set_user_active))
}
