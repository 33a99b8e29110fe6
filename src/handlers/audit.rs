use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::entities::audit_log;
use crate::errors::ServiceError;
use crate::services::audit::AuditLogFilters;
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

#[utoipa::path(
    get,
    path = "/api/v1/audit-logs",
    summary = "Query audit trail",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("entity_type" = Option<String>, Query, description = "Filter by entity type"),
        ("entity_id" = Option<Uuid>, Query, description = "Filter by entity ID"),
        ("actor_user_id" = Option<Uuid>, Query, description = "Filter by acting user"),
    ),
    responses(
        (status = 200, description = "Audit entries retrieved", body = ApiResponse<PaginatedResponse<audit_log::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filters): Query<AuditLogFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<audit_log::Model>>>, ServiceError> {
    if !auth_user.has_any_role(&[roles::SUPER_ADMIN, roles::AUDITOR]) {
        return Err(ServiceError::Forbidden(
            "Insufficient permissions to read the audit trail".to_string(),
        ));
    }
    let (items, total) = state
        .services
        .audit
        .list_entries(filters, query.page, query.limit)
        .await?;
    let paginated = PaginatedResponse::new(items, total, query.page, query.limit);
    Ok(Json(ApiResponse::success(paginated)))
}

pub fn audit_routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}
