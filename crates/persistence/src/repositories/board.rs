//! Board repository for database operations.

use domain::models::BoardType;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BoardEntity, BoardTypeDb};
use crate::metrics::QueryTimer;

/// Filters for listing boards. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub board_type: Option<BoardType>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// `Some(false)` lists only boards waiting for approval.
    pub approved: Option<bool>,
}

/// Fields for a new state or city board.
#[derive(Debug, Clone)]
pub struct NewBoard<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub board_type: BoardType,
    pub state: Option<&'a str>,
    pub city: Option<&'a str>,
    pub is_approved: bool,
    pub created_by: Uuid,
}

/// Repository for board-related database operations.
#[derive(Clone)]
pub struct BoardRepository {
    pool: PgPool,
}

impl BoardRepository {
    /// Creates a new BoardRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a board by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BoardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_board_by_id");
        let result = sqlx::query_as::<_, BoardEntity>(
            r#"
            SELECT id, name, description, board_type, state, city, social_owner_id, is_approved, created_by, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List boards matching the filter, national first, then by name.
    pub async fn list(&self, filter: &BoardFilter) -> Result<Vec<BoardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_boards");
        let result = sqlx::query_as::<_, BoardEntity>(
            r#"
            SELECT id, name, description, board_type, state, city, social_owner_id, is_approved, created_by, created_at, updated_at
            FROM boards
            WHERE ($1::board_type IS NULL OR board_type = $1)
              AND ($2::text IS NULL OR state = $2)
              AND ($3::text IS NULL OR LOWER(city) = LOWER($3))
              AND ($4::boolean IS NULL OR is_approved = $4)
            ORDER BY board_type, state NULLS FIRST, city NULLS FIRST, name
            "#,
        )
        .bind(filter.board_type.map(BoardTypeDb::from))
        .bind(filter.state.as_deref())
        .bind(filter.city.as_deref())
        .bind(filter.approved)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a state or city board.
    pub async fn create(&self, board: &NewBoard<'_>) -> Result<BoardEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_board");
        let result = sqlx::query_as::<_, BoardEntity>(
            r#"
            INSERT INTO boards (name, description, board_type, state, city, is_approved, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, board_type, state, city, social_owner_id, is_approved, created_by, created_at, updated_at
            "#,
        )
        .bind(board.name)
        .bind(board.description)
        .bind(BoardTypeDb::from(board.board_type))
        .bind(board.state)
        .bind(board.city)
        .bind(board.is_approved)
        .bind(board.created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark a board approved. Returns `None` if it does not exist.
    pub async fn approve(&self, id: Uuid) -> Result<Option<BoardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("approve_board");
        let result = sqlx::query_as::<_, BoardEntity>(
            r#"
            UPDATE boards
            SET is_approved = true, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, board_type, state, city, social_owner_id, is_approved, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
