//! Pin endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use domain::models::pin::{CreatePinRequest, PinResponse, RemovePinRequest, RemovePinResponse};
use domain::models::purchase::{PackType, PinPack, PinPurchase};
use persistence::repositories::PinPurchaseRepository;
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::pins::PinService;

/// Pin a post on a board, or extend its active pin.
///
/// Returns 201 when a new pin was created and 200 when an existing pin was
/// extended.
///
/// POST /api/v1/pins/create
pub async fn create_pin(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreatePinRequest>,
) -> Result<(StatusCode, Json<PinResponse>), ApiError> {
    request.validate()?;

    let outcome = PinService::new(state.pool.clone())
        .create_or_extend(
            auth.user_id,
            request.post_id,
            request.board_id,
            request.days_pinned,
            Utc::now(),
        )
        .await?;

    let status = if outcome.extended {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(PinResponse {
            pin: outcome.pin,
            extended: outcome.extended,
            balances: outcome.balances,
        }),
    ))
}

/// Unpin a post. Social pins hand their units back.
///
/// POST /api/v1/pins/remove
pub async fn remove_pin(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<RemovePinRequest>,
) -> Result<Json<RemovePinResponse>, ApiError> {
    let outcome = PinService::new(state.pool.clone())
        .remove(auth.user_id, request.post_id, request.board_id)
        .await?;

    Ok(Json(RemovePinResponse {
        pin_id: outcome.pin_id,
        pins_returned: outcome.pins_returned,
        balances: outcome.balances,
    }))
}

/// A pack as offered on the pricing page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackListing {
    pub pack_type: PackType,
    pub pack_size: i32,
    pub price_cents: i64,
    pub price: String,
}

impl From<&PinPack> for PackListing {
    fn from(pack: &PinPack) -> Self {
        Self {
            pack_type: pack.pack_type,
            pack_size: pack.size,
            price_cents: pack.price_cents,
            price: pack.price_display(),
        }
    }
}

/// List the packs on sale.
///
/// GET /api/v1/pins/packs
pub async fn list_packs() -> Json<Vec<PackListing>> {
    Json(PinPack::catalogue().iter().map(PackListing::from).collect())
}

/// Purchase history of the caller, newest first.
///
/// GET /api/v1/pins/purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<PinPurchase>>, ApiError> {
    let purchases = PinPurchaseRepository::new(state.pool.clone())
        .list_for_user(auth.user_id)
        .await?;

    Ok(Json(purchases.into_iter().map(PinPurchase::from).collect()))
}
