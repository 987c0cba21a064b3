//! Pin purchase entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PackType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for pack_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pack_type", rename_all = "UPPERCASE")]
pub enum PackTypeDb {
    Social,
    Regular,
}

impl From<PackTypeDb> for PackType {
    fn from(db: PackTypeDb) -> Self {
        match db {
            PackTypeDb::Social => PackType::Social,
            PackTypeDb::Regular => PackType::Regular,
        }
    }
}

impl From<PackType> for PackTypeDb {
    fn from(pack_type: PackType) -> Self {
        match pack_type {
            PackType::Social => PackTypeDb::Social,
            PackType::Regular => PackTypeDb::Regular,
        }
    }
}

/// Database row mapping for the pin_purchases table.
#[derive(Debug, Clone, FromRow)]
pub struct PinPurchaseEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pack_type: PackTypeDb,
    pub pack_size: i32,
    pub price_cents: i64,
    pub payment_reference: String,
    pub purchase_date: DateTime<Utc>,
}

impl From<PinPurchaseEntity> for domain::models::PinPurchase {
    fn from(entity: PinPurchaseEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            pack_type: entity.pack_type.into(),
            pack_size: entity.pack_size,
            price_cents: entity.price_cents,
            payment_reference: entity.payment_reference,
            purchase_date: entity.purchase_date,
        }
    }
}
