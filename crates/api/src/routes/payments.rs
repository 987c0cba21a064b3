//! Pin pack purchase and payment webhook handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::models::payment::{PaymentEvent, PurchaseOutcome, WebhookEvent};
use domain::models::purchase::{
    PendingPurchaseResponse, PinPack, PurchaseRequest, PurchaseResponse, RequiresActionResponse,
};
use domain::models::PaymentMetadata;
use metrics::counter;
use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalIdempotencyKey, UserAuth};
use crate::services::payments::CreatePaymentIntent;
use crate::services::settlement::{SettlementError, SettlementService};
use crate::services::webhook::{verify_signature, SIGNATURE_HEADER};

/// Buy a pin pack with a saved payment method.
///
/// - 201 with a purchase summary once the payment succeeded and was credited
/// - 200 `{requiresAction}` when the customer must authenticate the payment
/// - 202 `{pending}` while the provider is still processing; the webhook
///   credits the pack later
///
/// POST /api/v1/pins/purchase
pub async fn purchase_pins(
    State(state): State<AppState>,
    auth: UserAuth,
    OptionalIdempotencyKey(idempotency_key): OptionalIdempotencyKey,
    Json(request): Json<PurchaseRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let pack = PinPack::lookup(request.pack_type, request.pack_size)?;

    let intent_request = CreatePaymentIntent {
        amount_cents: pack.price_cents,
        currency: state.config.payments.currency.clone(),
        payment_method_id: request.payment_method_id.clone(),
        description: format!("{} {} pin pack", pack.size, pack.pack_type),
        metadata: PaymentMetadata {
            user_id: auth.user_id,
            pack_type: pack.pack_type,
            pack_size: pack.size,
        },
        idempotency_key: idempotency_key.map(|key| key.scoped_to(auth.user_id)),
    };

    let intent = state.payments.create_and_confirm(&intent_request).await?;

    info!(
        user_id = %auth.user_id,
        payment_intent_id = %intent.id,
        status = %intent.status,
        provider = state.payments.name(),
        "Payment intent confirmed"
    );

    match intent.status.outcome() {
        PurchaseOutcome::Succeeded => {
            let settlement = SettlementService::new(state.pool.clone())
                .settle(auth.user_id, pack, &intent.id)
                .await?;

            let response = PurchaseResponse {
                purchase_id: settlement.purchase.id,
                pack_type: settlement.purchase.pack_type,
                pack_size: settlement.purchase.pack_size,
                price: pack.price_display(),
                payment_intent_id: intent.id,
                balances: settlement.balances,
            };
            Ok((StatusCode::CREATED, Json(response)).into_response())
        }
        PurchaseOutcome::RequiresAction => Ok((
            StatusCode::OK,
            Json(RequiresActionResponse {
                requires_action: true,
                payment_intent_id: intent.id,
                client_secret: intent.client_secret,
            }),
        )
            .into_response()),
        PurchaseOutcome::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(PendingPurchaseResponse {
                pending: true,
                payment_intent_id: intent.id,
            }),
        )
            .into_response()),
        PurchaseOutcome::Failed | PurchaseOutcome::Canceled => Err(ApiError::PaymentDeclined(
            format!("Payment was not completed (status: {})", intent.status),
        )),
    }
}

/// Stripe webhook receiver.
///
/// The raw body is verified against the signing secret before it is parsed.
/// Succeeded intents are settled the same way as synchronous purchases, so
/// a replayed or duplicate delivery is a no-op.
///
/// POST /api/v1/payments/webhook
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payments = &state.config.payments;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    verify_signature(
        &payments.webhook_secret,
        signature,
        &body,
        payments.signature_tolerance_secs,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected webhook delivery");
        ApiError::from(e)
    })?;

    let event = WebhookEvent::parse(&body)
        .map_err(|e| ApiError::Validation(format!("Malformed webhook event: {}", e)))?;

    counter!("payment_webhooks_total", "event_type" => event.event_type.clone()).increment(1);

    match event.event {
        PaymentEvent::IntentSucceeded(intent) => {
            match SettlementService::new(state.pool.clone())
                .settle_intent(&intent)
                .await
            {
                Ok(settlement) => info!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    newly_settled = settlement.newly_settled,
                    "Payment webhook settled"
                ),
                // Retrying will not fix a payment we did not create.
                Err(e @ (SettlementError::InvalidPack(_)
                | SettlementError::Metadata(_)
                | SettlementError::UserNotFound(_))) => {
                    error!(event_id = %event.id, payment_intent_id = %intent.id, error = %e, "Unsettleable payment acknowledged");
                }
                Err(e) => return Err(e.into()),
            }
        }
        PaymentEvent::IntentFailed(intent) | PaymentEvent::IntentCanceled(intent) => {
            info!(
                event_id = %event.id,
                payment_intent_id = %intent.id,
                status = %intent.status,
                "Payment did not complete"
            );
        }
        PaymentEvent::Ignored => {
            info!(event_id = %event.id, event_type = %event.event_type, "Ignored webhook event");
        }
    }

    Ok(Json(json!({ "received": true })))
}
