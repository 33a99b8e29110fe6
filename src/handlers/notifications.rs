use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::notification;
use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    summary = "My notifications",
    params(("unread_only" = Option<bool>, Query, description = "Only unread notifications")),
    responses(
        (status = 200, description = "Notifications retrieved", body = ApiResponse<Vec<notification::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<Vec<notification::Model>>>, ServiceError> {
    let notifications = state
        .services
        .notifications
        .list_for_user(auth_user.user_id, query.unread_only)
        .await?;
    Ok(Json(ApiResponse::success(notifications)))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    summary = "Unread notification count",
    responses(
        (status = 200, description = "Count retrieved", body = ApiResponse<u64>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<u64>>, ServiceError> {
    let count = state
        .services
        .notifications
        .unread_count(auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(count)))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    summary = "Mark notification read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<notification::Model>),
        (status = 403, description = "Notification belongs to another user", body = crate::errors::ErrorResponse),
        (status = 404, description = "Notification not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<notification::Model>>, ServiceError> {
    let notification = state
        .services
        .notifications
        .mark_read(id, auth_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(notification)))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", post(mark_read))
}
