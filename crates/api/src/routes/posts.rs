//! Post endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::board::Board;
use domain::models::post::{CreatePostRequest, ListPostsQuery, Post, PostWithPin};
use persistence::repositories::{BoardRepository, PostRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::upkeep::UpkeepService;

/// Create a post on a board.
///
/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    request.validate()?;

    let board: Board = BoardRepository::new(state.pool.clone())
        .find_by_id(request.board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?
        .into();
    if !board.is_open_to(auth.user_id) {
        return Err(ApiError::Forbidden(
            "Only the owner can post on a social board".to_string(),
        ));
    }

    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let post: Post = PostRepository::new(state.pool.clone())
        .create(
            auth.user_id,
            request.board_id,
            request.title.trim(),
            &request.content,
            category,
        )
        .await?
        .into();

    info!(post_id = %post.id, board_id = %post.board_id, "Post created");

    UpkeepService::new(state.pool.clone()).run_inline().await;

    Ok((StatusCode::CREATED, Json(post)))
}

/// List posts, pinned first, with the state of each post's active pin.
///
/// Expired pins are swept before listing so they never show as pinned.
///
/// GET /api/v1/posts?boardId=&authorId=
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostWithPin>>, ApiError> {
    UpkeepService::new(state.pool.clone()).run_inline().await;

    let now = Utc::now();
    let posts = PostRepository::new(state.pool.clone())
        .list_with_active_pin(query.board_id, query.author_id)
        .await?
        .into_iter()
        .map(|row| PostWithPin::new(row.post.into(), row.pin_end_date, now))
        .collect();

    Ok(Json(posts))
}
