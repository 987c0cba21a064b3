//! Pin repository for database operations.
//!
//! Deactivation is conditional on `is_active`, so when an unpin and the
//! sweeper race for the same pin exactly one of them gets the row back.

use chrono::{DateTime, Utc};
use domain::models::PinType;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{PinEntity, PinTypeDb};
use crate::metrics::QueryTimer;

/// Fields for a new active pin.
#[derive(Debug, Clone, Copy)]
pub struct NewPin {
    pub post_id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub pin_type: PinType,
    pub pins_used: i32,
    pub days_pinned: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Repository for pin-related database operations.
#[derive(Clone)]
pub struct PinRepository {
    pool: PgPool,
}

impl PinRepository {
    /// Creates a new PinRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The active pin for a post on a board, if any.
    pub async fn find_active(
        conn: &mut PgConnection,
        post_id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<PinEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_pin");
        let result = sqlx::query_as::<_, PinEntity>(
            r#"
            SELECT id, post_id, board_id, user_id, pin_type, pins_used, days_pinned, start_date, end_date, is_active, created_at, updated_at
            FROM pins
            WHERE post_id = $1 AND board_id = $2 AND is_active
            "#,
        )
        .bind(post_id)
        .bind(board_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Inserts an active pin. A second active pin for the same post and
    /// board is rejected by the partial unique index.
    pub async fn insert(conn: &mut PgConnection, pin: &NewPin) -> Result<PinEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_pin");
        let result = sqlx::query_as::<_, PinEntity>(
            r#"
            INSERT INTO pins (post_id, board_id, user_id, pin_type, pins_used, days_pinned, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true)
            RETURNING id, post_id, board_id, user_id, pin_type, pins_used, days_pinned, start_date, end_date, is_active, created_at, updated_at
            "#,
        )
        .bind(pin.post_id)
        .bind(pin.board_id)
        .bind(pin.user_id)
        .bind(PinTypeDb::from(pin.pin_type))
        .bind(pin.pins_used)
        .bind(pin.days_pinned)
        .bind(pin.start_date)
        .bind(pin.end_date)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Writes the new length of an active pin. Returns `None` if the pin
    /// stopped being active.
    pub async fn extend(
        conn: &mut PgConnection,
        pin_id: Uuid,
        days_pinned: i32,
        pins_used: i32,
        end_date: DateTime<Utc>,
    ) -> Result<Option<PinEntity>, sqlx::Error> {
        let timer = QueryTimer::new("extend_pin");
        let result = sqlx::query_as::<_, PinEntity>(
            r#"
            UPDATE pins
            SET days_pinned = $2, pins_used = $3, end_date = $4, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING id, post_id, board_id, user_id, pin_type, pins_used, days_pinned, start_date, end_date, is_active, created_at, updated_at
            "#,
        )
        .bind(pin_id)
        .bind(days_pinned)
        .bind(pins_used)
        .bind(end_date)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Deactivates a pin if it is still active and returns its final state.
    pub async fn deactivate(
        conn: &mut PgConnection,
        pin_id: Uuid,
    ) -> Result<Option<PinEntity>, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_pin");
        let result = sqlx::query_as::<_, PinEntity>(
            r#"
            UPDATE pins
            SET is_active = false, updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING id, post_id, board_id, user_id, pin_type, pins_used, days_pinned, start_date, end_date, is_active, created_at, updated_at
            "#,
        )
        .bind(pin_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Number of active pins whose end date has passed.
    pub async fn count_expired(&self, now: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_expired_pins");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM pins
            WHERE is_active AND end_date <= $1
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One page of ids of active pins whose end date has passed, in id order.
    ///
    /// Pass the last id of the previous page as `after` to continue.
    pub async fn find_expired_ids(
        &self,
        now: DateTime<Utc>,
        after: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_expired_pin_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM pins
            WHERE is_active AND end_date <= $1
              AND ($2::uuid IS NULL OR id > $2)
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(now)
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
