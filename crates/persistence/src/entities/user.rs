//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user::PinBalances;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub is_admin: bool,
    pub social_pins: i32,
    pub pin_packs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            display_name: entity.display_name,
            is_admin: entity.is_admin,
            social_pins: entity.social_pins,
            pin_packs: entity.pin_packs,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Balances returned by credit and debit statements.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BalancesEntity {
    pub social_pins: i32,
    pub pin_packs: i32,
}

impl From<BalancesEntity> for PinBalances {
    fn from(entity: BalancesEntity) -> Self {
        Self {
            social_pins: entity.social_pins,
            pin_packs: entity.pin_packs,
        }
    }
}
