//! User repository for database operations.
//!
//! Balances are only changed with relative updates. Debits carry a
//! `balance >= amount` guard so concurrent spends cannot overdraw.

use domain::models::PinType;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{BalancesEntity, BoardEntity, BoardTypeDb, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an account together with its social board.
    ///
    /// Fails with a unique violation if the email is taken.
    pub async fn create_with_social_board(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
        initial_social_pins: i32,
        board_name: &str,
    ) -> Result<(UserEntity, BoardEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_user_with_social_board");
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, display_name, social_pins, pin_packs)
            VALUES (LOWER($1), $2, $3, $4, 0)
            RETURNING id, email, password_hash, display_name, is_admin, social_pins, pin_packs, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(initial_social_pins)
        .fetch_one(&mut *tx)
        .await?;

        let board = sqlx::query_as::<_, BoardEntity>(
            r#"
            INSERT INTO boards (name, board_type, social_owner_id, is_approved, created_by)
            VALUES ($1, $2, $3, true, $3)
            RETURNING id, name, description, board_type, state, city, social_owner_id, is_approved, created_by, created_at, updated_at
            "#,
        )
        .bind(board_name)
        .bind(BoardTypeDb::Social)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((user, board))
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, is_admin, social_pins, pin_packs, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, display_name, is_admin, social_pins, pin_packs, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Current balances of a user, read inside the caller's transaction.
    pub async fn balances(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<BalancesEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_user_balances");
        let result = sqlx::query_as::<_, BalancesEntity>(
            r#"
            SELECT social_pins, pin_packs
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Takes `amount` from the balance that pays for `pin_type`.
    ///
    /// Returns `None` without changing anything when the balance is too low
    /// or the user does not exist.
    pub async fn debit(
        conn: &mut PgConnection,
        user_id: Uuid,
        pin_type: PinType,
        amount: i32,
    ) -> Result<Option<BalancesEntity>, sqlx::Error> {
        let timer = QueryTimer::new("debit_user_balance");
        let sql = match pin_type {
            PinType::Social => {
                r#"
                UPDATE users
                SET social_pins = social_pins - $2, updated_at = NOW()
                WHERE id = $1 AND social_pins >= $2
                RETURNING social_pins, pin_packs
                "#
            }
            PinType::Regular => {
                r#"
                UPDATE users
                SET pin_packs = pin_packs - $2, updated_at = NOW()
                WHERE id = $1 AND pin_packs >= $2
                RETURNING social_pins, pin_packs
                "#
            }
        };

        let result = sqlx::query_as::<_, BalancesEntity>(sql)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(conn)
            .await;
        timer.record();
        result
    }

    /// Adds `amount` to the balance that pays for `pin_type`.
    ///
    /// Returns `None` if the user does not exist.
    pub async fn credit(
        conn: &mut PgConnection,
        user_id: Uuid,
        pin_type: PinType,
        amount: i32,
    ) -> Result<Option<BalancesEntity>, sqlx::Error> {
        let timer = QueryTimer::new("credit_user_balance");
        let sql = match pin_type {
            PinType::Social => {
                r#"
                UPDATE users
                SET social_pins = social_pins + $2, updated_at = NOW()
                WHERE id = $1
                RETURNING social_pins, pin_packs
                "#
            }
            PinType::Regular => {
                r#"
                UPDATE users
                SET pin_packs = pin_packs + $2, updated_at = NOW()
                WHERE id = $1
                RETURNING social_pins, pin_packs
                "#
            }
        };

        let result = sqlx::query_as::<_, BalancesEntity>(sql)
            .bind(user_id)
            .bind(amount)
            .fetch_optional(conn)
            .await;
        timer.record();
        result
    }
}
