//! Pin pack catalogue and purchase records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::pin::PinType;
use super::user::PinBalances;

/// Balance a pack is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackType {
    Social,
    Regular,
}

impl PackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackType::Social => "SOCIAL",
            PackType::Regular => "REGULAR",
        }
    }

    pub fn pin_type(&self) -> PinType {
        match self {
            PackType::Social => PinType::Social,
            PackType::Regular => PinType::Regular,
        }
    }
}

impl FromStr for PackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SOCIAL" => Ok(PackType::Social),
            "REGULAR" => Ok(PackType::Regular),
            _ => Err(format!("Invalid pack type: {}", s)),
        }
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested (type, size) is not on sale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid pack size {pack_size} for {pack_type} pins")]
pub struct InvalidPackSize {
    pub pack_type: PackType,
    pub pack_size: i32,
}

/// A purchasable bundle of pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinPack {
    pub pack_type: PackType,
    pub size: i32,
    pub price_cents: i64,
}

const CATALOGUE: [PinPack; 4] = [
    PinPack {
        pack_type: PackType::Social,
        size: 25,
        price_cents: 1_000,
    },
    PinPack {
        pack_type: PackType::Regular,
        size: 25,
        price_cents: 2_500,
    },
    PinPack {
        pack_type: PackType::Regular,
        size: 100,
        price_cents: 9_000,
    },
    PinPack {
        pack_type: PackType::Regular,
        size: 500,
        price_cents: 40_000,
    },
];

impl PinPack {
    /// Every pack currently on sale.
    pub fn catalogue() -> &'static [PinPack] {
        &CATALOGUE
    }

    pub fn lookup(pack_type: PackType, pack_size: i32) -> Result<PinPack, InvalidPackSize> {
        CATALOGUE
            .iter()
            .find(|pack| pack.pack_type == pack_type && pack.size == pack_size)
            .copied()
            .ok_or(InvalidPackSize {
                pack_type,
                pack_size,
            })
    }

    pub fn price_display(&self) -> String {
        format_cents(self.price_cents)
    }
}

/// Formats an amount in cents as `dollars.cents`, e.g. `9000` as `90.00`.
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// A settled payment that credited a pack to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pack_type: PackType,
    pub pack_size: i32,
    pub price_cents: i64,
    pub payment_reference: String,
    pub purchase_date: DateTime<Utc>,
}

/// Request payload for buying a pack.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub pack_type: PackType,

    #[validate(range(min = 1, message = "Pack size must be positive"))]
    pub pack_size: i32,

    #[validate(length(min = 1, max = 255, message = "Payment method is required"))]
    pub payment_method_id: String,
}

/// Response for a settled purchase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub purchase_id: Uuid,
    pub pack_type: PackType,
    pub pack_size: i32,
    pub price: String,
    pub payment_intent_id: String,
    pub balances: PinBalances,
}

/// Response when the card needs an extra authentication step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiresActionResponse {
    pub requires_action: bool,
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
}

/// Response when the provider has not finished processing the payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPurchaseResponse {
    pub pending: bool,
    pub payment_intent_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_prices() {
        assert_eq!(
            PinPack::lookup(PackType::Social, 25).unwrap().price_display(),
            "10.00"
        );
        assert_eq!(
            PinPack::lookup(PackType::Regular, 25).unwrap().price_display(),
            "25.00"
        );
        assert_eq!(
            PinPack::lookup(PackType::Regular, 100).unwrap().price_display(),
            "90.00"
        );
        assert_eq!(
            PinPack::lookup(PackType::Regular, 500).unwrap().price_display(),
            "400.00"
        );
    }

    #[test]
    fn test_lookup_rejects_unknown_sizes() {
        let err = PinPack::lookup(PackType::Social, 100).unwrap_err();
        assert_eq!(err.pack_size, 100);
        assert_eq!(err.to_string(), "Invalid pack size 100 for SOCIAL pins");

        assert!(PinPack::lookup(PackType::Regular, 50).is_err());
        assert!(PinPack::lookup(PackType::Regular, 0).is_err());
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1_050), "10.50");
    }

    #[test]
    fn test_pack_type_maps_to_pin_type() {
        assert_eq!(PackType::Social.pin_type(), PinType::Social);
        assert_eq!(PackType::Regular.pin_type(), PinType::Regular);
    }

    #[test]
    fn test_purchase_request_deserialize() {
        let req: PurchaseRequest = serde_json::from_str(
            r#"{"packType":"REGULAR","packSize":100,"paymentMethodId":"pm_card_visa"}"#,
        )
        .unwrap();
        assert_eq!(req.pack_type, PackType::Regular);
        assert!(req.validate().is_ok());
    }
}
