//! Pin domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::user::PinBalances;

/// Currency a pin was paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PinType {
    Social,
    Regular,
}

impl PinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinType::Social => "SOCIAL",
            PinType::Regular => "REGULAR",
        }
    }

    /// Human name of the balance that pays for this pin type.
    pub fn balance_name(&self) -> &'static str {
        match self {
            PinType::Social => "social pins",
            PinType::Regular => "pin packs",
        }
    }

    /// Whether pins of this type give their units back when they end.
    pub fn is_refundable(&self) -> bool {
        matches!(self, PinType::Social)
    }
}

impl FromStr for PinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SOCIAL" => Ok(PinType::Social),
            "REGULAR" => Ok(PinType::Regular),
            _ => Err(format!("Invalid pin type: {}", s)),
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-bounded boost of one post on one board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: Uuid,
    pub post_id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub pin_type: PinType,
    pub pins_used: i32,
    pub days_pinned: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pin {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date <= now
    }

    /// Units credited back when this pin ends.
    pub fn refund(&self) -> i32 {
        if self.pin_type.is_refundable() {
            self.pins_used
        } else {
            0
        }
    }
}

/// Request payload for pinning a post or extending its pin.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinRequest {
    pub post_id: Uuid,
    pub board_id: Uuid,
    #[validate(custom(function = "shared::validation::validate_pin_duration"))]
    pub days_pinned: i32,
}

/// Request payload for unpinning a post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePinRequest {
    pub post_id: Uuid,
    pub board_id: Uuid,
}

/// Response for a successful create or extend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinResponse {
    pub pin: Pin,
    pub extended: bool,
    pub balances: PinBalances,
}

/// Response for a successful unpin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePinResponse {
    pub pin_id: Uuid,
    pub pins_returned: i32,
    pub balances: PinBalances,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pin(pin_type: PinType, end_date: DateTime<Utc>) -> Pin {
        let now = Utc::now();
        Pin {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            pin_type,
            pins_used: 3,
            days_pinned: 3,
            start_date: now,
            end_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pin_type_from_str() {
        assert_eq!(PinType::from_str("social").unwrap(), PinType::Social);
        assert_eq!(PinType::from_str("REGULAR").unwrap(), PinType::Regular);
        assert!(PinType::from_str("gold").is_err());
    }

    #[test]
    fn test_refund_only_for_social() {
        let now = Utc::now();
        assert_eq!(pin(PinType::Social, now).refund(), 3);
        assert_eq!(pin(PinType::Regular, now).refund(), 0);
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let now = Utc::now();
        assert!(pin(PinType::Social, now).is_expired_at(now));
        assert!(!pin(PinType::Social, now + Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_create_pin_request_duration_validation() {
        let mut req = CreatePinRequest {
            post_id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            days_pinned: 3,
        };
        assert!(req.validate().is_ok());
        req.days_pinned = 5;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_pin_request_camel_case() {
        let json = format!(
            r#"{{"postId":"{}","boardId":"{}","daysPinned":7}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let req: CreatePinRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.days_pinned, 7);
    }
}
