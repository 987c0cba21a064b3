//! Pin entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PinType;
use domain::services::ActivePin;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for pin_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pin_type", rename_all = "UPPERCASE")]
pub enum PinTypeDb {
    Social,
    Regular,
}

impl From<PinTypeDb> for PinType {
    fn from(db: PinTypeDb) -> Self {
        match db {
            PinTypeDb::Social => PinType::Social,
            PinTypeDb::Regular => PinType::Regular,
        }
    }
}

impl From<PinType> for PinTypeDb {
    fn from(pin_type: PinType) -> Self {
        match pin_type {
            PinType::Social => PinTypeDb::Social,
            PinType::Regular => PinTypeDb::Regular,
        }
    }
}

/// Database row mapping for the pins table.
#[derive(Debug, Clone, FromRow)]
pub struct PinEntity {
    pub id: Uuid,
    pub post_id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub pin_type: PinTypeDb,
    pub pins_used: i32,
    pub days_pinned: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PinEntity {
    pub fn as_active_pin(&self) -> ActivePin {
        ActivePin {
            id: self.id,
            days_pinned: self.days_pinned,
            pins_used: self.pins_used,
            start_date: self.start_date,
        }
    }
}

impl From<PinEntity> for domain::models::Pin {
    fn from(entity: PinEntity) -> Self {
        Self {
            id: entity.id,
            post_id: entity.post_id,
            board_id: entity.board_id,
            user_id: entity.user_id,
            pin_type: entity.pin_type.into(),
            pins_used: entity.pins_used,
            days_pinned: entity.days_pinned,
            start_date: entity.start_date,
            end_date: entity.end_date,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
