use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{AuthError, LoginRequest, RegisterRequest};
use crate::services::AuthService;

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::InvalidCredentials => AppError::Auth(e.to_string()),
        AuthError::EmailTaken => AppError::Conflict(e.to_string()),
        AuthError::ValidationError(msg) => AppError::BadRequest(msg),
        AuthError::ExternalService(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuthService::new(&config);

    let session = service.register(request).await.map_err(map_auth_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Account registered",
        "data": session
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuthService::new(&config);

    let session = service.login(request).await.map_err(map_auth_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged in",
        "data": session
    })))
}

/// Introspect a bearer token without touching the credential service.
#[axum::debug_handler]
pub async fn validate(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    match validate_token(auth.token(), &config.supabase_jwt_secret) {
        Ok(user) => Ok(Json(TokenResponse {
            valid: true,
            user_id: user.id,
            email: user.email,
            role: user.role,
        })),
        Err(err) => Err(AppError::Auth(err)),
    }
}
