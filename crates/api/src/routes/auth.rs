//! Authentication routes for registration and login.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::{AuthResult, AuthService};

fn auth_service(state: &AppState) -> Result<AuthService, ApiError> {
    AuthService::new(
        state.pool.clone(),
        &state.config.jwt,
        state.config.pins.initial_social_pins,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user,
            token: result.access_token,
            expires_in: result.expires_in,
        }
    }
}

/// Register a new account. The account starts with its social pins and
/// its own social board.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let result = auth_service(&state)?
        .register(&request.email, &request.password, &request.display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let result = auth_service(&state)?
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(result.into()))
}
