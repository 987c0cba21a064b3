//! Payment provider integration.
//!
//! [`PaymentProvider`] creates and confirms a payment intent in one call.
//! [`StripeClient`] talks to the Stripe REST API; [`MockPaymentProvider`]
//! answers deterministically and is used when no Stripe key is configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::{PaymentIntent, PaymentIntentStatus, PaymentMetadata};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PaymentsConfig;

/// Provider failures, already classified for the caller.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The card was refused. The message comes from the provider.
    #[error("{0}")]
    Declined(String),

    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    /// Transport failure, provider outage, bad credentials or an unreadable reply.
    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// Parameters for a confirmed payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    pub amount_cents: i64,
    pub currency: String,
    pub payment_method_id: String,
    pub description: String,
    pub metadata: PaymentMetadata,
    /// Forwarded to the provider so retried requests do not charge twice.
    pub idempotency_key: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a payment intent and confirms it immediately.
    ///
    /// Never retried internally.
    async fn create_and_confirm(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentError>;

    fn name(&self) -> &'static str;
}

const PAYMENT_INTENTS_PATH: &str = "/v1/payment_intents";

/// Stripe REST client.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl StripeClient {
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            secret_key: config.stripe_secret_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Form fields for `POST /v1/payment_intents`.
    fn form_params(request: &CreatePaymentIntent) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount_cents.to_string()),
            ("currency".to_string(), request.currency.clone()),
            ("payment_method".to_string(), request.payment_method_id.clone()),
            ("confirm".to_string(), "true".to_string()),
            ("description".to_string(), request.description.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
            (
                "automatic_payment_methods[allow_redirects]".to_string(),
                "never".to_string(),
            ),
        ];

        let mut metadata: Vec<_> = request.metadata.to_map().into_iter().collect();
        metadata.sort();
        params.extend(
            metadata
                .into_iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value)),
        );

        params
    }
}

/// Maps a non-success Stripe reply onto [`PaymentError`].
fn classify_error(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let Ok(envelope) = serde_json::from_str::<StripeErrorEnvelope>(body) else {
        return PaymentError::Provider(format!("HTTP {} with unreadable body", status));
    };

    let message = envelope
        .error
        .message
        .unwrap_or_else(|| envelope.error.error_type.clone());

    match envelope.error.error_type.as_str() {
        "card_error" => PaymentError::Declined(message),
        "invalid_request_error" => PaymentError::InvalidRequest(message),
        other => PaymentError::Provider(format!(
            "HTTP {} {} ({}): {}",
            status,
            other,
            envelope.error.code.as_deref().unwrap_or("no code"),
            message
        )),
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_and_confirm(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}{}", self.base_url, PAYMENT_INTENTS_PATH);
        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&Self::form_params(request));

        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "Stripe request failed");
            PaymentError::Provider(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error = classify_error(status, &body);
            tracing::warn!(status = %status, error = %error, "Stripe rejected payment intent");
            return Err(error);
        }

        serde_json::from_str::<PaymentIntent>(&body)
            .map_err(|e| PaymentError::Provider(format!("Unreadable payment intent: {}", e)))
    }

    fn name(&self) -> &'static str {
        "stripe"
    }
}

/// Payment method ids understood by [`MockPaymentProvider`].
pub mod mock_methods {
    pub const SUCCEEDS: &str = "pm_card_visa";
    pub const DECLINED: &str = "pm_card_chargeDeclined";
    pub const REQUIRES_ACTION: &str = "pm_card_authenticationRequired";
    pub const PROCESSING: &str = "pm_card_processing";
    pub const REQUIRES_PAYMENT_METHOD: &str = "pm_card_requiresPaymentMethod";
    pub const INVALID: &str = "pm_card_invalid";
    pub const PROVIDER_DOWN: &str = "pm_provider_down";
}

/// In-process provider with outcomes chosen by payment method id.
///
/// Any id not listed in [`mock_methods`] succeeds. Requests that reuse an
/// idempotency key get the intent created the first time.
#[derive(Debug, Default)]
pub struct MockPaymentProvider {
    by_idempotency_key: Mutex<HashMap<String, PaymentIntent>>,
    calls: AtomicUsize,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create-and-confirm calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn intent_with_status(
        request: &CreatePaymentIntent,
        status: PaymentIntentStatus,
    ) -> PaymentIntent {
        let id = format!("pi_mock_{}", Uuid::new_v4().simple());
        PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id,
            status,
            amount: request.amount_cents,
            currency: request.currency.clone(),
            metadata: request.metadata.to_map(),
        }
    }

    fn respond(request: &CreatePaymentIntent) -> Result<PaymentIntent, PaymentError> {
        use mock_methods::*;

        let status = match request.payment_method_id.as_str() {
            DECLINED => return Err(PaymentError::Declined("Your card was declined.".to_string())),
            INVALID => {
                return Err(PaymentError::InvalidRequest(format!(
                    "No such PaymentMethod: '{}'",
                    request.payment_method_id
                )))
            }
            PROVIDER_DOWN => {
                return Err(PaymentError::Provider(
                    "HTTP 503 api_error: mock provider unavailable".to_string(),
                ))
            }
            REQUIRES_ACTION => PaymentIntentStatus::RequiresAction,
            PROCESSING => PaymentIntentStatus::Processing,
            REQUIRES_PAYMENT_METHOD => PaymentIntentStatus::RequiresPaymentMethod,
            _ => PaymentIntentStatus::Succeeded,
        };

        Ok(Self::intent_with_status(request, status))
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_and_confirm(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(key) = &request.idempotency_key else {
            return Self::respond(request);
        };

        if let Some(intent) = self
            .by_idempotency_key
            .lock()
            .map_err(|_| PaymentError::Provider("mock state poisoned".to_string()))?
            .get(key)
        {
            return Ok(intent.clone());
        }

        let intent = Self::respond(request)?;
        self.by_idempotency_key
            .lock()
            .map_err(|_| PaymentError::Provider("mock state poisoned".to_string()))?
            .insert(key.clone(), intent.clone());
        Ok(intent)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::PackType;

    fn request(payment_method_id: &str, idempotency_key: Option<&str>) -> CreatePaymentIntent {
        CreatePaymentIntent {
            amount_cents: 9_000,
            currency: "usd".to_string(),
            payment_method_id: payment_method_id.to_string(),
            description: "100 REGULAR pins".to_string(),
            metadata: PaymentMetadata {
                user_id: Uuid::new_v4(),
                pack_type: PackType::Regular,
                pack_size: 100,
            },
            idempotency_key: idempotency_key.map(str::to_string),
        }
    }

    #[test]
    fn test_form_params_include_metadata_and_confirm() {
        let req = request("pm_card_visa", None);
        let params = StripeClient::form_params(&req);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("amount"), Some("9000"));
        assert_eq!(get("currency"), Some("usd"));
        assert_eq!(get("payment_method"), Some("pm_card_visa"));
        assert_eq!(get("confirm"), Some("true"));
        assert_eq!(get("metadata[packType]"), Some("REGULAR"));
        assert_eq!(get("metadata[packSize]"), Some("100"));
        assert_eq!(
            get("metadata[userId]"),
            Some(req.metadata.user_id.to_string().as_str())
        );
    }

    #[test]
    fn test_classify_card_error_as_declined() {
        let body = r#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#;
        match classify_error(reqwest::StatusCode::PAYMENT_REQUIRED, body) {
            PaymentError::Declined(msg) => assert_eq!(msg, "Your card was declined."),
            other => panic!("expected Declined, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_invalid_request() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"No such PaymentMethod"}}"#;
        assert!(matches!(
            classify_error(reqwest::StatusCode::BAD_REQUEST, body),
            PaymentError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_classify_api_error_as_provider() {
        let body = r#"{"error":{"type":"api_error","message":"Something went wrong"}}"#;
        assert!(matches!(
            classify_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, body),
            PaymentError::Provider(_)
        ));
    }

    #[test]
    fn test_classify_unreadable_body_as_provider() {
        assert!(matches!(
            classify_error(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            PaymentError::Provider(_)
        ));
    }

    #[test]
    fn test_stripe_client_debug_redacts_key() {
        let config = PaymentsConfig {
            stripe_secret_key: "sk_test_secret".to_string(),
            ..PaymentsConfig::default()
        };
        let client = StripeClient::new(&config).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk_test_secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_mock_outcomes_follow_payment_method() {
        let mock = MockPaymentProvider::new();

        let intent = mock
            .create_and_confirm(&request(mock_methods::SUCCEEDS, None))
            .await
            .unwrap();
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
        assert_eq!(intent.amount, 9_000);
        assert_eq!(intent.metadata.get("packSize").map(String::as_str), Some("100"));

        let intent = mock
            .create_and_confirm(&request(mock_methods::REQUIRES_ACTION, None))
            .await
            .unwrap();
        assert_eq!(intent.status, PaymentIntentStatus::RequiresAction);
        assert!(intent.client_secret.is_some());

        assert!(matches!(
            mock.create_and_confirm(&request(mock_methods::DECLINED, None))
                .await,
            Err(PaymentError::Declined(_))
        ));
        assert!(matches!(
            mock.create_and_confirm(&request(mock_methods::PROVIDER_DOWN, None))
                .await,
            Err(PaymentError::Provider(_))
        ));
        assert_eq!(mock.calls(), 4);
    }

    #[tokio::test]
    async fn test_mock_reuses_intent_for_same_idempotency_key() {
        let mock = MockPaymentProvider::new();
        let first = mock
            .create_and_confirm(&request(mock_methods::SUCCEEDS, Some("key-1")))
            .await
            .unwrap();
        let second = mock
            .create_and_confirm(&request(mock_methods::SUCCEEDS, Some("key-1")))
            .await
            .unwrap();
        let other = mock
            .create_and_confirm(&request(mock_methods::SUCCEEDS, Some("key-2")))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
    }
}
