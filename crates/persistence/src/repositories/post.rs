//! Post repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{PostEntity, PostWithPinEntity};
use crate::metrics::QueryTimer;

/// Maximum number of posts returned by a listing.
pub const MAX_POSTS_PER_PAGE: i64 = 200;

/// Repository for post-related database operations.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Creates a new PostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        board_id: Uuid,
        title: &str,
        content: &str,
        category: Option<&str>,
    ) -> Result<PostEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_post");
        let result = sqlx::query_as::<_, PostEntity>(
            r#"
            INSERT INTO posts (author_id, board_id, title, content, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, board_id, title, content, category, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(board_id)
        .bind(title)
        .bind(content)
        .bind(category)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_post_by_id");
        let result = sqlx::query_as::<_, PostEntity>(
            r#"
            SELECT id, author_id, board_id, title, content, category, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Loads a post and holds a row lock on it until the transaction ends.
    ///
    /// Every pin mutation for a post goes through this lock, which serialises
    /// create, extend and remove for the same post.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_post_for_update");
        let result = sqlx::query_as::<_, PostEntity>(
            r#"
            SELECT id, author_id, board_id, title, content, category, created_at, updated_at
            FROM posts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Lists posts with the end date of their active pin on the post's board.
    ///
    /// Pinned posts come first, then newest first.
    pub async fn list_with_active_pin(
        &self,
        board_id: Option<Uuid>,
        author_id: Option<Uuid>,
    ) -> Result<Vec<PostWithPinEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_posts_with_active_pin");
        let result = sqlx::query_as::<_, PostWithPinEntity>(
            r#"
            SELECT p.id, p.author_id, p.board_id, p.title, p.content, p.category, p.created_at, p.updated_at,
                   pin.end_date AS pin_end_date
            FROM posts p
            LEFT JOIN pins pin
              ON pin.post_id = p.id AND pin.board_id = p.board_id AND pin.is_active
            WHERE ($1::uuid IS NULL OR p.board_id = $1)
              AND ($2::uuid IS NULL OR p.author_id = $2)
            ORDER BY (pin.id IS NOT NULL) DESC, p.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(board_id)
        .bind(author_id)
        .bind(MAX_POSTS_PER_PAGE)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
