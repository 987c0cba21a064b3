//! User account and balance domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::pin::PinType;

/// Represents a user account in the system.
///
/// `social_pins` and `pin_packs` are the two balances the pin engine spends
/// from. They are only ever changed by relative updates in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub display_name: String,
    pub is_admin: bool,
    pub social_pins: i32,
    pub pin_packs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Balance that pays for pins of the given type.
    pub fn balance_for(&self, pin_type: PinType) -> i32 {
        self.balances().get(pin_type)
    }

    pub fn balances(&self) -> PinBalances {
        PinBalances {
            social_pins: self.social_pins,
            pin_packs: self.pin_packs,
        }
    }
}

/// Snapshot of both balances, returned after every balance-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinBalances {
    pub social_pins: i32,
    pub pin_packs: i32,
}

impl PinBalances {
    /// Balance that pays for pins of the given type.
    pub fn get(&self, pin_type: PinType) -> i32 {
        match pin_type {
            PinType::Social => self.social_pins,
            PinType::Regular => self.pin_packs,
        }
    }
}

/// Request payload for account registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub display_name: String,
}

/// Request payload for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response for register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "secret_hash".to_string(),
            display_name: "Test User".to_string(),
            is_admin: false,
            social_pins: 200,
            pin_packs: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_for_pin_type() {
        let user = sample_user();
        assert_eq!(user.balance_for(PinType::Social), 200);
        assert_eq!(user.balance_for(PinType::Regular), 5);
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("\"socialPins\":200"));
        assert!(json.contains("\"pinPacks\":5"));
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "new@example.com".to_string(),
            password: "longenough".to_string(),
            display_name: "New".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "nope".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());

        let blank_name = RegisterRequest {
            display_name: "   ".to_string(),
            ..valid
        };
        assert!(blank_name.validate().is_err());
    }
}
