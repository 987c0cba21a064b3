//! User profile routes.

use axum::{extract::State, Json};
use domain::models::User;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Current user's profile, including both pin balances.
///
/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<User>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
