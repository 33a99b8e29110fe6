use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{
    AuthError, AuthUser, LoginOutcome, LoginRequest, MfaEnrollment, RegisterRequest, TokenPair,
};
use crate::errors::ServiceError;
use crate::services::users::UserResponse;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MfaCodeRequest {
    #[validate(length(min = 6, max = 6))]
    pub code: String,
}

/// Login response. When the account has MFA enabled and no code was
/// supplied, `requires_mfa` is true and no tokens are issued.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub requires_mfa: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    summary = "Register",
    description = "Create a new account with the default EMPLOYEE role",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AuthError> {
    let user = state.services.auth.register(request).await?;
    let response = state
        .services
        .users
        .get_user(user.id)
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    summary = "Login",
    description = "Exchange credentials (and a TOTP code when MFA is enabled) for a token pair",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = LoginResponse),
        (status = 401, description = "Invalid credentials or MFA code", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account disabled", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    match state.services.auth.login(request).await? {
        LoginOutcome::Tokens(tokens) => Ok(Json(LoginResponse {
            requires_mfa: false,
            tokens: Some(*tokens),
        })),
        LoginOutcome::MfaRequired => Ok(Json(LoginResponse {
            requires_mfa: true,
            tokens: None,
        })),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    summary = "Refresh tokens",
    description = "Exchange a refresh token for a new pair. The presented token is revoked.",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid, expired or revoked token", body = crate::errors::ErrorResponse),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let tokens = state.services.auth.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    summary = "Logout",
    description = "Revoke a refresh token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    state.services.auth.logout(&request.refresh_token).await?;
    Ok(Json(
        serde_json::json!({ "message": "Successfully logged out" }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    summary = "Current user",
    responses(
        (status = 200, description = "Authenticated user profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    let user = state.services.users.get_user(auth_user.user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/mfa/enroll",
    summary = "Enroll MFA",
    description = "Generate a TOTP secret. MFA stays off until a code is confirmed.",
    responses(
        (status = 200, description = "Enrollment material", body = MfaEnrollment),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn enroll_mfa(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MfaEnrollment>, AuthError> {
    let enrollment = state.services.auth.enroll_mfa(auth_user.user_id).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/mfa/confirm",
    summary = "Confirm MFA enrollment",
    request_body = MfaCodeRequest,
    responses(
        (status = 200, description = "MFA enabled"),
        (status = 401, description = "Invalid code", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn confirm_mfa(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<MfaCodeRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    state
        .services
        .auth
        .confirm_mfa(auth_user.user_id, &request.code)
        .await?;
    Ok(Json(serde_json::json!({ "message": "MFA enabled" })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/mfa/disable",
    summary = "Disable MFA",
    request_body = MfaCodeRequest,
    responses(
        (status = 200, description = "MFA disabled"),
        (status = 401, description = "Invalid code", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn disable_mfa(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<MfaCodeRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    state
        .services
        .auth
        .disable_mfa(auth_user.user_id, &request.code)
        .await?;
    Ok(Json(serde_json::json!({ "message": "MFA disabled" })))
}

/// Routes that require no authentication.
pub fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
}

/// Routes that require a valid access token.
pub fn protected_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/mfa/enroll", post(enroll_mfa))
        .route("/mfa/confirm", post(confirm_mfa))
        .route("/mfa/disable", post(disable_mfa))
}
