//! Post entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the posts table.
#[derive(Debug, Clone, FromRow)]
pub struct PostEntity {
    pub id: Uuid,
    pub author_id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostEntity> for domain::models::Post {
    fn from(entity: PostEntity) -> Self {
        Self {
            id: entity.id,
            author_id: entity.author_id,
            board_id: entity.board_id,
            title: entity.title,
            content: entity.content,
            category: entity.category,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// A post row joined with the end date of its active pin on its own board.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithPinEntity {
    #[sqlx(flatten)]
    pub post: PostEntity,
    pub pin_end_date: Option<DateTime<Utc>>,
}
