//! OpenAPI documentation, served through Swagger UI at `/swagger-ui`.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AssetTrack API",
        description = "Organizational asset lifecycle management: registry, custody assignments, two-stage transfer approvals, and audit trails",
        version = env!("CARGO_PKG_VERSION"),
        license(name = "MIT")
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::auth::enroll_mfa,
        handlers::auth::confirm_mfa,
        handlers::auth::disable_mfa,
        handlers::assets::list_assets,
        handlers::assets::create_asset,
        handlers::assets::asset_statistics,
        handlers::assets::get_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        handlers::assets::update_asset_status,
        handlers::assets::get_asset_history,
        handlers::assignments::list_assignments,
        handlers::assignments::create_assignment,
        handlers::assignments::return_asset,
        handlers::assignments::list_active_assignments,
        handlers::assignments::my_assignments,
        handlers::assignments::assignment_statistics,
        handlers::assignments::assignments_for_user,
        handlers::assignments::get_assignment,
        handlers::transfers::request_transfer,
        handlers::transfers::approve_transfer_as_manager,
        handlers::transfers::approve_transfer_as_admin,
        handlers::transfers::reject_transfer,
        handlers::transfers::list_transfers,
        handlers::transfers::list_pending_transfers,
        handlers::transfers::transfer_statistics,
        handlers::transfers::get_transfer,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user_roles,
        handlers::users::set_user_active,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::audit::list_audit_logs,
    ),
    components(schemas(
        crate::auth::RegisterRequest,
        crate::auth::LoginRequest,
        crate::auth::TokenPair,
        crate::auth::MfaEnrollment,
        crate::handlers::auth::RefreshTokenRequest,
        crate::handlers::auth::MfaCodeRequest,
        crate::handlers::auth::LoginResponse,
        crate::handlers::users::SetActiveRequest,
        crate::services::assets::CreateAssetRequest,
        crate::services::assets::UpdateAssetRequest,
        crate::services::assets::UpdateAssetStatusRequest,
        crate::services::assets::AssetResponse,
        crate::services::assets::AssetHistoryResponse,
        crate::services::assets::AssetStatisticsResponse,
        crate::services::assignments::CreateAssignmentRequest,
        crate::services::assignments::ReturnAssetRequest,
        crate::services::assignments::AssignmentStatisticsResponse,
        crate::services::transfers::CreateTransferRequest,
        crate::services::transfers::ApproveTransferRequest,
        crate::services::transfers::RejectTransferRequest,
        crate::services::transfers::TransferStatisticsResponse,
        crate::services::users::UpdateUserRolesRequest,
        crate::services::users::UserResponse,
        crate::services::categories::CreateCategoryRequest,
        crate::entities::asset::AssetStatus,
        crate::entities::asset_transfer::TransferStatus,
        crate::entities::asset_assignment::Model,
        crate::entities::asset_transfer::Model,
        crate::entities::category::Model,
        crate::entities::notification::Model,
        crate::entities::audit_log::Model,
        crate::errors::ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login, token refresh and MFA"),
        (name = "assets", description = "Asset registry"),
        (name = "assignments", description = "Custody assignments and returns"),
        (name = "transfers", description = "Two-stage transfer approvals"),
        (name = "users", description = "User directory and role administration"),
        (name = "categories", description = "Asset categories"),
        (name = "notifications", description = "In-app notifications"),
        (name = "audit", description = "Audit trail"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Router serving the Swagger UI and the raw OpenAPI document.
pub fn swagger_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.is_empty());
        let components = doc.components.expect("components expected");
        assert!(components.schemas.contains_key("TokenPair"));
        assert!(components.security_schemes.contains_key("Bearer"));
    }
}
