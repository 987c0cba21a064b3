//! Pin purchase repository for database operations.

use domain::models::PackType;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{PackTypeDb, PinPurchaseEntity};
use crate::metrics::QueryTimer;

/// Repository for pin purchase database operations.
#[derive(Clone)]
pub struct PinPurchaseRepository {
    pool: PgPool,
}

impl PinPurchaseRepository {
    /// Creates a new PinPurchaseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a purchase unless one already exists for the payment reference.
    ///
    /// Returns `None` when the reference was already settled.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        user_id: Uuid,
        pack_type: PackType,
        pack_size: i32,
        price_cents: i64,
        payment_reference: &str,
    ) -> Result<Option<PinPurchaseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_pin_purchase");
        let result = sqlx::query_as::<_, PinPurchaseEntity>(
            r#"
            INSERT INTO pin_purchases (user_id, pack_type, pack_size, price_cents, payment_reference)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (payment_reference) DO NOTHING
            RETURNING id, user_id, pack_type, pack_size, price_cents, payment_reference, purchase_date
            "#,
        )
        .bind(user_id)
        .bind(PackTypeDb::from(pack_type))
        .bind(pack_size)
        .bind(price_cents)
        .bind(payment_reference)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_reference(
        &self,
        payment_reference: &str,
    ) -> Result<Option<PinPurchaseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pin_purchase_by_reference");
        let result = sqlx::query_as::<_, PinPurchaseEntity>(
            r#"
            SELECT id, user_id, pack_type, pack_size, price_cents, payment_reference, purchase_date
            FROM pin_purchases
            WHERE payment_reference = $1
            "#,
        )
        .bind(payment_reference)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Purchases made by a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PinPurchaseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pin_purchases_for_user");
        let result = sqlx::query_as::<_, PinPurchaseEntity>(
            r#"
            SELECT id, user_id, pack_type, pack_size, price_cents, payment_reference, purchase_date
            FROM pin_purchases
            WHERE user_id = $1
            ORDER BY purchase_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
