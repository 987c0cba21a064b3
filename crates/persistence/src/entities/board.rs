//! Board entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::BoardType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for board_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "board_type", rename_all = "UPPERCASE")]
pub enum BoardTypeDb {
    National,
    State,
    City,
    Social,
}

impl From<BoardTypeDb> for BoardType {
    fn from(db: BoardTypeDb) -> Self {
        match db {
            BoardTypeDb::National => BoardType::National,
            BoardTypeDb::State => BoardType::State,
            BoardTypeDb::City => BoardType::City,
            BoardTypeDb::Social => BoardType::Social,
        }
    }
}

impl From<BoardType> for BoardTypeDb {
    fn from(board_type: BoardType) -> Self {
        match board_type {
            BoardType::National => BoardTypeDb::National,
            BoardType::State => BoardTypeDb::State,
            BoardType::City => BoardTypeDb::City,
            BoardType::Social => BoardTypeDb::Social,
        }
    }
}

/// Database row mapping for the boards table.
#[derive(Debug, Clone, FromRow)]
pub struct BoardEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub board_type: BoardTypeDb,
    pub state: Option<String>,
    pub city: Option<String>,
    pub social_owner_id: Option<Uuid>,
    pub is_approved: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BoardEntity> for domain::models::Board {
    fn from(entity: BoardEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            board_type: entity.board_type.into(),
            state: entity.state,
            city: entity.city,
            social_owner_id: entity.social_owner_id,
            is_approved: entity.is_approved,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
