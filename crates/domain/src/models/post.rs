//! Post domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Content published to a single board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a post.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub board_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,
}

/// Query parameters for listing posts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub board_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

/// A post together with the state of its active pin, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithPin {
    #[serde(flatten)]
    pub post: Post,
    pub is_pinned: bool,
    pub pin_end_date: Option<DateTime<Utc>>,
    pub pin_days_remaining: Option<i64>,
}

impl PostWithPin {
    pub fn new(post: Post, pin_end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            post,
            is_pinned: pin_end_date.is_some(),
            pin_end_date,
            pin_days_remaining: pin_end_date.map(|end| days_remaining(end, now)),
        }
    }
}

/// Whole days left until `end`, rounded up. Never negative.
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const MILLIS_PER_DAY: i64 = 86_400_000;

    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}
