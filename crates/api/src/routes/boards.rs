//! Board endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::board::{Board, CreateBoardRequest, ListBoardsQuery};
use persistence::repositories::{BoardFilter, BoardRepository, NewBoard, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminUser, UserAuth};

/// List approved boards.
///
/// GET /api/v1/boards?type=&state=&city=
pub async fn list_boards(
    State(state): State<AppState>,
    Query(query): Query<ListBoardsQuery>,
) -> Result<Json<Vec<Board>>, ApiError> {
    let filter = BoardFilter {
        board_type: query.board_type,
        state: query.state.map(|s| s.to_uppercase()),
        city: query.city,
        approved: Some(true),
    };

    let boards = BoardRepository::new(state.pool.clone())
        .list(&filter)
        .await?
        .into_iter()
        .map(Board::from)
        .collect();

    Ok(Json(boards))
}

/// GET /api/v1/boards/:board_id
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Board>, ApiError> {
    let board = BoardRepository::new(state.pool.clone())
        .find_by_id(board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(board.into()))
}

/// Create a state or city board.
///
/// Boards created by admins are approved immediately; everyone else's wait
/// for approval.
///
/// POST /api/v1/boards
pub async fn create_board(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    request.validate()?;
    request.validate_scope().map_err(ApiError::Validation)?;

    let creator = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let state_code = request.state.as_deref().map(str::to_uppercase);
    let new_board = NewBoard {
        name: request.name.trim(),
        description: request.description.as_deref(),
        board_type: request.board_type,
        state: state_code.as_deref(),
        city: request.city.as_deref().map(str::trim),
        is_approved: creator.is_admin,
        created_by: creator.id,
    };

    let board: Board = BoardRepository::new(state.pool.clone())
        .create(&new_board)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("A board already exists for this location".to_string())
            }
            other => other,
        })?
        .into();

    info!(
        board_id = %board.id,
        board_type = %board.board_type,
        approved = board.is_approved,
        "Board created"
    );

    Ok((StatusCode::CREATED, Json(board)))
}

/// Boards waiting for approval.
///
/// GET /api/v1/admin/boards/pending
pub async fn list_pending_boards(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<Board>>, ApiError> {
    let filter = BoardFilter {
        approved: Some(false),
        ..BoardFilter::default()
    };

    let boards = BoardRepository::new(state.pool.clone())
        .list(&filter)
        .await?
        .into_iter()
        .map(Board::from)
        .collect();

    Ok(Json(boards))
}

/// Approve a pending board.
///
/// POST /api/v1/admin/boards/:board_id/approve
pub async fn approve_board(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Board>, ApiError> {
    let board: Board = BoardRepository::new(state.pool.clone())
        .approve(board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?
        .into();

    info!(board_id = %board.id, admin_id = %admin.id, "Board approved");
    Ok(Json(board))
}
