/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication with refresh token rotation, optional TOTP
 * second factor, and role-based access control for the AssetTrack API.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::entities::{refresh_token, user, user_role};

pub mod mfa;

/// Role names granted through `user_roles` rows and carried in JWT claims.
pub mod roles {
    pub const SUPER_ADMIN: &str = "SUPER_ADMIN";
    pub const ASSET_MANAGER: &str = "ASSET_MANAGER";
    pub const DEPT_HEAD: &str = "DEPT_HEAD";
    pub const AUDITOR: &str = "AUDITOR";
    pub const EMPLOYEE: &str = "EMPLOYEE";

    pub const ALL: &[&str] = &[SUPER_ADMIN, ASSET_MANAGER, DEPT_HEAD, AUDITOR, EMPLOYEE];
}

/// Claim structure for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,       // Subject (user ID)
    pub email: String,     // User's email
    pub name: String,      // User's display name
    pub roles: Vec<String>,
    pub jti: String,       // Unique identifier for this token
    pub iat: i64,          // Issued at time
    pub exp: i64,          // Expiration time
    pub nbf: i64,          // Not valid before time
    pub iss: String,       // Issuer
    pub aud: String,       // Audience
}

/// Authenticated user data extracted from the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, required: &[&str]) -> bool {
        required.iter().any(|r| self.has_role(r))
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(roles::SUPER_ADMIN)
    }
}

/// Pulls the `AuthUser` the auth middleware stored in request extensions, so
/// handlers can take it as a parameter.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
    pub mfa_issuer: String,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            jwt_audience: config.auth_audience.clone(),
            access_token_expiration: Duration::from_secs(config.jwt_expiration as u64),
            refresh_token_expiration: Duration::from_secs(config.refresh_token_expiration as u64),
            mfa_issuer: config.mfa_issuer.clone(),
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Multi-factor code required")]
    MfaRequired,

    #[error("Invalid multi-factor code")]
    InvalidMfaCode,

    #[error("Multi-factor authentication is not enrolled")]
    MfaNotEnrolled,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "AUTH_VALIDATION",
                msg.clone(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::AccountDisabled => (
                StatusCode::FORBIDDEN,
                "AUTH_ACCOUNT_DISABLED",
                "Account is disabled".to_string(),
            ),
            Self::EmailTaken => (
                StatusCode::CONFLICT,
                "AUTH_EMAIL_TAKEN",
                "Email is already registered".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Failed to create token".to_string(),
            ),
            Self::MfaRequired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MFA_REQUIRED",
                "Multi-factor code required".to_string(),
            ),
            Self::InvalidMfaCode => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_MFA_CODE",
                "Invalid multi-factor code".to_string(),
            ),
            Self::MfaNotEnrolled => (
                StatusCode::BAD_REQUEST,
                "AUTH_MFA_NOT_ENROLLED",
                "Multi-factor authentication is not enrolled".to_string(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(_) | Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal authentication error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub phone: Option<String>,
    pub department_id: Option<Uuid>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Six-digit TOTP code, required when the account has MFA enabled.
    pub mfa_code: Option<String>,
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Outcome of a credential check: either tokens, or a demand for the
/// second factor.
#[derive(Debug)]
pub enum LoginOutcome {
    Tokens(Box<TokenPair>),
    MfaRequired,
}

/// MFA enrollment material returned once at enrollment time.
#[derive(Debug, Serialize, ToSchema)]
pub struct MfaEnrollment {
    pub secret: String,
    pub otpauth_uri: String,
}

/// Authentication service backed by the users, user_roles and
/// refresh_tokens tables.
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Create a new user account with the default EMPLOYEE role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<user::Model, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            id: Set(user_id),
            email: Set(request.email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone: Set(request.phone),
            department_id: Set(request.department_id),
            is_active: Set(true),
            mfa_enabled: Set(false),
            mfa_secret: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
        };
        let saved = new_user.insert(&txn).await?;

        let role = user_role::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role: Set(roles::EMPLOYEE.to_string()),
        };
        role.insert(&txn).await?;

        txn.commit().await?;

        info!(user_id = %user_id, "Registered new user");
        Ok(saved)
    }

    /// Check credentials and, when the account has MFA enabled, the TOTP
    /// code. Returns tokens only after every enabled factor passes.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AuthError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.as_str()))
            .filter(user::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        if user.mfa_enabled {
            let secret = user.mfa_secret.as_deref().ok_or(AuthError::MfaNotEnrolled)?;
            let code = match request.mfa_code.as_deref() {
                Some(code) => code,
                None => return Ok(LoginOutcome::MfaRequired),
            };
            let valid = mfa::verify_code(secret, code)
                .map_err(|e| AuthError::InternalError(e.to_string()))?;
            if !valid {
                warn!(user_id = %user.id, "Rejected login with invalid MFA code");
                return Err(AuthError::InvalidMfaCode);
            }
        }

        let tokens = self.generate_token(&user).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome::Tokens(Box::new(tokens)))
    }

    /// Issue an access token plus an opaque refresh token. Only the SHA-256
    /// digest of the refresh token is persisted.
    pub async fn generate_token(&self, user: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let roles = self.get_user_roles(user.id).await?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.full_name(),
            roles,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        let refresh_token: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        let stored = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            token_hash: Set(digest(&refresh_token)),
            expires_at: Set(refresh_exp),
            revoked_at: Set(None),
            created_at: Set(now),
        };
        stored.insert(&*self.db).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    /// Validate an access token and extract the claims.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Rotate a refresh token: the presented token is revoked and a fresh
    /// pair is issued.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::TokenHash.eq(digest(refresh_token)))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if stored.revoked_at.is_some() {
            return Err(AuthError::RevokedToken);
        }
        if stored.expires_at < Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        let user = user::Entity::find_by_id(stored.user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let mut revoked: refresh_token::ActiveModel = stored.into();
        revoked.revoked_at = Set(Some(Utc::now()));
        revoked.update(&*self.db).await?;

        self.generate_token(&user).await
    }

    /// Revoke a refresh token so it can no longer be exchanged.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::TokenHash.eq(digest(refresh_token)))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if stored.revoked_at.is_none() {
            let mut revoked: refresh_token::ActiveModel = stored.into();
            revoked.revoked_at = Set(Some(Utc::now()));
            revoked.update(&*self.db).await?;
        }
        Ok(())
    }

    /// Generate and store an MFA secret; MFA stays disabled until the user
    /// confirms a code from their authenticator.
    #[instrument(skip(self))]
    pub async fn enroll_mfa(&self, user_id: Uuid) -> Result<MfaEnrollment, AuthError> {
        let user = self.get_user(user_id).await?;

        let secret = mfa::generate_secret();
        let uri = mfa::provisioning_uri(&self.config.mfa_issuer, &user.email, &secret);

        let mut active: user::ActiveModel = user.into();
        active.mfa_secret = Set(Some(secret.clone()));
        active.mfa_enabled = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        Ok(MfaEnrollment {
            secret,
            otpauth_uri: uri,
        })
    }

    /// Confirm enrollment by verifying a code against the stored secret.
    #[instrument(skip(self, code))]
    pub async fn confirm_mfa(&self, user_id: Uuid, code: &str) -> Result<(), AuthError> {
        let user = self.get_user(user_id).await?;
        let secret = user.mfa_secret.clone().ok_or(AuthError::MfaNotEnrolled)?;

        let valid =
            mfa::verify_code(&secret, code).map_err(|e| AuthError::InternalError(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidMfaCode);
        }

        let mut active: user::ActiveModel = user.into();
        active.mfa_enabled = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        info!(user_id = %user_id, "MFA enabled");
        Ok(())
    }

    /// Disable MFA; requires a currently valid code.
    #[instrument(skip(self, code))]
    pub async fn disable_mfa(&self, user_id: Uuid, code: &str) -> Result<(), AuthError> {
        let user = self.get_user(user_id).await?;
        if !user.mfa_enabled {
            return Err(AuthError::MfaNotEnrolled);
        }
        let secret = user.mfa_secret.clone().ok_or(AuthError::MfaNotEnrolled)?;

        let valid =
            mfa::verify_code(&secret, code).map_err(|e| AuthError::InternalError(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidMfaCode);
        }

        let mut active: user::ActiveModel = user.into();
        active.mfa_enabled = Set(false);
        active.mfa_secret = Set(None);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        info!(user_id = %user_id, "MFA disabled");
        Ok(())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, AuthError> {
        user::Entity::find_by_id(user_id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn get_user_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.role).collect())
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::InternalError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::InternalError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                let claims = auth_service.validate_token(token.trim()).await?;
                let user_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

                return Ok(AuthUser {
                    user_id,
                    email: claims.email,
                    name: claims.name,
                    roles: claims.roles,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Role middleware to check if a user has any of the required roles
pub async fn role_middleware(
    State(required_roles): State<Vec<String>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    // SUPER_ADMIN passes every role gate.
    if user.is_super_admin() {
        return Ok(next.run(request).await);
    }

    if !required_roles.iter().any(|r| user.has_role(r)) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
    fn with_any_role(self, roles: &[&str]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.with_any_role(&[role])
    }

    fn with_any_role(self, roles: &[&str]) -> Self {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        self.layer(axum::middleware::from_fn_with_state(roles, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(roles: &[&str]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "Test User".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            token_id: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn has_any_role_matches_one_of_several() {
        let user = auth_user(&[roles::DEPT_HEAD]);
        assert!(user.has_any_role(&[roles::SUPER_ADMIN, roles::DEPT_HEAD]));
        assert!(!user.has_any_role(&[roles::SUPER_ADMIN, roles::ASSET_MANAGER]));
    }

    #[test]
    fn super_admin_is_detected() {
        assert!(auth_user(&[roles::SUPER_ADMIN]).is_super_admin());
        assert!(!auth_user(&[roles::EMPLOYEE]).is_super_admin());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn refresh_token_digest_is_stable_hex() {
        let d = digest("token-value");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("token-value"));
        assert_ne!(d, digest("other-token"));
    }
}
