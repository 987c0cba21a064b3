//! Pin create, extend and remove.
//!
//! Every mutation runs in one transaction that first locks the post row.
//! The balance change and the pin write commit together or not at all.

use chrono::{DateTime, Utc};
use domain::models::user::PinBalances;
use domain::models::{Board, Pin};
use domain::services::{plan_pin, PinPlan, PinRuleError};
use metrics::counter;
use persistence::repositories::{
    BoardRepository, NewPin, PinRepository, PostRepository, UserRepository,
};
use shared::validation::ALLOWED_PIN_DURATIONS;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::upkeep::UpkeepService;

#[derive(Debug, Error)]
pub enum PinError {
    #[error(transparent)]
    Rule(#[from] PinRuleError),

    #[error("Board not found")]
    BoardNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Only the author of a post can change its pins")]
    NotAuthor,

    #[error("Social pins can only be used on your own social board")]
    NotBoardOwner,

    #[error("No active pin for this post on this board")]
    NoActivePin,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a create or extend.
#[derive(Debug, Clone)]
pub struct PinOutcome {
    pub pin: Pin,
    pub extended: bool,
    pub balances: PinBalances,
}

/// Result of an unpin.
#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    pub pin_id: Uuid,
    pub pins_returned: i32,
    pub balances: PinBalances,
}

pub struct PinService {
    pool: PgPool,
    boards: BoardRepository,
}

impl PinService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            boards: BoardRepository::new(pool.clone()),
            pool,
        }
    }

    /// Pins a post on a board for `days` days, or adds `days` to its active pin.
    pub async fn create_or_extend(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        board_id: Uuid,
        days: i32,
        now: DateTime<Utc>,
    ) -> Result<PinOutcome, PinError> {
        if !ALLOWED_PIN_DURATIONS.contains(&days) {
            return Err(PinRuleError::InvalidDuration(days).into());
        }

        let board: Board = self
            .boards
            .find_by_id(board_id)
            .await?
            .ok_or(PinError::BoardNotFound)?
            .into();
        if !board.is_open_to(user_id) {
            return Err(PinError::NotBoardOwner);
        }
        let pin_type = board.board_type.pin_type();

        let mut tx = self.pool.begin().await?;
        lock_own_post(&mut *tx, post_id, user_id).await?;

        // A pin past its end date counts as gone even before the sweeper runs.
        let existing = match PinRepository::find_active(&mut *tx, post_id, board_id).await? {
            Some(pin) if pin.end_date <= now => {
                expire_stale(&mut *tx, pin.id).await?;
                None
            }
            active => active.map(|pin| pin.as_active_pin()),
        };

        let balances: PinBalances = UserRepository::balances(&mut *tx, user_id)
            .await?
            .ok_or(PinError::UserNotFound)?
            .into();
        let available = balances.get(pin_type);

        let plan = plan_pin(days, pin_type, available, existing.as_ref(), now)?;

        let pin = match plan {
            PinPlan::Create {
                days_pinned,
                pins_used,
                start_date,
                end_date,
            } => {
                let new_pin = NewPin {
                    post_id,
                    board_id,
                    user_id,
                    pin_type,
                    pins_used,
                    days_pinned,
                    start_date,
                    end_date,
                };
                PinRepository::insert(&mut *tx, &new_pin).await?
            }
            PinPlan::Extend {
                pin_id,
                days_pinned,
                pins_used,
                end_date,
                ..
            } => PinRepository::extend(&mut *tx, pin_id, days_pinned, pins_used, end_date)
                .await?
                .ok_or(PinError::NoActivePin)?,
        };

        let balances = UserRepository::debit(&mut *tx, user_id, pin_type, plan.debit())
            .await?
            .ok_or(PinRuleError::InsufficientFunds {
                pin_type,
                required: days,
                available,
            })?;

        tx.commit().await?;

        let pin = Pin::from(pin);
        let extended = plan.is_extension();
        if extended {
            counter!("pins_extended_total", "pin_type" => pin_type.as_str()).increment(1);
        } else {
            counter!("pins_created_total", "pin_type" => pin_type.as_str()).increment(1);
        }
        info!(
            pin_id = %pin.id,
            post_id = %post_id,
            board_id = %board_id,
            pin_type = %pin_type,
            days,
            days_pinned = pin.days_pinned,
            extended,
            "Pin saved"
        );

        UpkeepService::new(self.pool.clone()).run_inline().await;

        Ok(PinOutcome {
            pin,
            extended,
            balances: balances.into(),
        })
    }

    /// Unpins a post from a board, refunding the units of a social pin.
    pub async fn remove(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        board_id: Uuid,
    ) -> Result<RemoveOutcome, PinError> {
        let mut tx = self.pool.begin().await?;
        lock_own_post(&mut *tx, post_id, user_id).await?;

        let active = PinRepository::find_active(&mut *tx, post_id, board_id)
            .await?
            .ok_or(PinError::NoActivePin)?;
        let pin = PinRepository::deactivate(&mut *tx, active.id)
            .await?
            .map(Pin::from)
            .ok_or(PinError::NoActivePin)?;

        let pins_returned = pin.refund();
        let balances = if pins_returned > 0 {
            UserRepository::credit(&mut *tx, user_id, pin.pin_type, pins_returned).await?
        } else {
            UserRepository::balances(&mut *tx, user_id).await?
        }
        .ok_or(PinError::UserNotFound)?;

        tx.commit().await?;

        counter!("pins_removed_total", "pin_type" => pin.pin_type.as_str()).increment(1);
        info!(
            pin_id = %pin.id,
            post_id = %post_id,
            board_id = %board_id,
            pins_returned,
            "Pin removed"
        );

        Ok(RemoveOutcome {
            pin_id: pin.id,
            pins_returned,
            balances: balances.into(),
        })
    }
}

/// Deactivates an expired pin inside the caller's transaction and refunds it.
async fn expire_stale(conn: &mut PgConnection, pin_id: Uuid) -> Result<(), PinError> {
    let Some(entity) = PinRepository::deactivate(&mut *conn, pin_id).await? else {
        return Ok(());
    };
    let pin = Pin::from(entity);

    let refund = pin.refund();
    if refund > 0 {
        UserRepository::credit(&mut *conn, pin.user_id, pin.pin_type, refund).await?;
    }

    counter!("pins_expired_total", "pin_type" => pin.pin_type.as_str()).increment(1);
    debug!(pin_id = %pin.id, refund, "Stale pin expired before re-pinning");
    Ok(())
}

/// Locks the post row and checks the caller wrote it.
async fn lock_own_post(
    conn: &mut PgConnection,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<(), PinError> {
    let post = PostRepository::lock_for_update(conn, post_id)
        .await?
        .ok_or(PinError::PostNotFound)?;

    if post.author_id != user_id {
        return Err(PinError::NotAuthor);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::PinType;

    #[test]
    fn test_rule_errors_pass_through_message() {
        let err: PinError = PinRuleError::InsufficientFunds {
            pin_type: PinType::Regular,
            required: 7,
            available: 5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient pin packs. You need 7 pins but have 5."
        );
    }

    #[test]
    fn test_not_board_owner_message() {
        assert_eq!(
            PinError::NotBoardOwner.to_string(),
            "Social pins can only be used on your own social board"
        );
    }

    #[test]
    fn test_database_error_converts() {
        let err: PinError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, PinError::Database(_)));
    }
}
