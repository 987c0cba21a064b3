//! Payment provider objects and webhook events.
//!
//! Incoming provider payloads are parsed into these types at the boundary so
//! the settlement code never touches raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::purchase::PackType;

/// Status of a payment intent as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentIntentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentIntentStatus::RequiresAction => "requires_action",
            PaymentIntentStatus::Processing => "processing",
            PaymentIntentStatus::RequiresCapture => "requires_capture",
            PaymentIntentStatus::Canceled => "canceled",
            PaymentIntentStatus::Succeeded => "succeeded",
            PaymentIntentStatus::Unknown => "unknown",
        }
    }

    /// Where a purchase attempt ends up for this status. Only
    /// [`PurchaseOutcome::Succeeded`] leads to a credit.
    pub fn outcome(&self) -> PurchaseOutcome {
        match self {
            PaymentIntentStatus::Succeeded => PurchaseOutcome::Succeeded,
            PaymentIntentStatus::RequiresAction => PurchaseOutcome::RequiresAction,
            PaymentIntentStatus::Processing => PurchaseOutcome::Pending,
            PaymentIntentStatus::Canceled => PurchaseOutcome::Canceled,
            PaymentIntentStatus::RequiresPaymentMethod
            | PaymentIntentStatus::RequiresConfirmation
            | PaymentIntentStatus::RequiresCapture
            | PaymentIntentStatus::Unknown => PurchaseOutcome::Failed,
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal state of a purchase attempt after the provider answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Succeeded,
    RequiresAction,
    Pending,
    Failed,
    Canceled,
}

/// A provider payment intent, reduced to the fields settlement needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Error reading purchase metadata off a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Missing metadata field: {0}")]
    Missing(&'static str),

    #[error("Invalid metadata field {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Purchase details attached to a payment intent when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentMetadata {
    pub user_id: Uuid,
    pub pack_type: PackType,
    pub pack_size: i32,
}

impl PaymentMetadata {
    pub const USER_ID: &'static str = "userId";
    pub const PACK_TYPE: &'static str = "packType";
    pub const PACK_SIZE: &'static str = "packSize";

    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (Self::USER_ID.to_string(), self.user_id.to_string()),
            (Self::PACK_TYPE.to_string(), self.pack_type.as_str().to_string()),
            (Self::PACK_SIZE.to_string(), self.pack_size.to_string()),
        ])
    }

    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, MetadataError> {
        fn field<'a>(
            map: &'a HashMap<String, String>,
            name: &'static str,
        ) -> Result<&'a str, MetadataError> {
            map.get(name)
                .map(String::as_str)
                .ok_or(MetadataError::Missing(name))
        }

        let user_id = field(map, Self::USER_ID)?;
        let pack_type = field(map, Self::PACK_TYPE)?;
        let pack_size = field(map, Self::PACK_SIZE)?;

        Ok(Self {
            user_id: Uuid::parse_str(user_id).map_err(|_| MetadataError::Invalid {
                field: Self::USER_ID,
                value: user_id.to_string(),
            })?,
            pack_type: PackType::from_str(pack_type).map_err(|_| MetadataError::Invalid {
                field: Self::PACK_TYPE,
                value: pack_type.to_string(),
            })?,
            pack_size: pack_size.parse().map_err(|_| MetadataError::Invalid {
                field: Self::PACK_SIZE,
                value: pack_size.to_string(),
            })?,
        })
    }
}

/// Event kinds the settlement adapter reacts to.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    IntentSucceeded(PaymentIntent),
    IntentFailed(PaymentIntent),
    IntentCanceled(PaymentIntent),
    /// Any event type without a handler.
    Ignored,
}

/// A verified webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub event: PaymentEvent,
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

impl WebhookEvent {
    pub const INTENT_SUCCEEDED: &'static str = "payment_intent.succeeded";
    pub const INTENT_FAILED: &'static str = "payment_intent.payment_failed";
    pub const INTENT_CANCELED: &'static str = "payment_intent.canceled";

    /// Parses a webhook body. Intent events must carry a well-formed intent.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawEvent = serde_json::from_slice(body)?;

        let event = match raw.event_type.as_str() {
            Self::INTENT_SUCCEEDED => PaymentEvent::IntentSucceeded(serde_json::from_value(
                raw.data.object,
            )?),
            Self::INTENT_FAILED => PaymentEvent::IntentFailed(serde_json::from_value(
                raw.data.object,
            )?),
            Self::INTENT_CANCELED => PaymentEvent::IntentCanceled(serde_json::from_value(
                raw.data.object,
            )?),
            _ => PaymentEvent::Ignored,
        };

        Ok(Self {
            id: raw.id,
            event_type: raw.event_type,
            event,
        })
    }
}
