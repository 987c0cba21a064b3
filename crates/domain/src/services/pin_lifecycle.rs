//! Pin lifecycle rules.
//!
//! Pure decisions about creating and extending pins. The caller loads the
//! current state inside a transaction, asks [`plan_pin`] what to do, and
//! applies the returned [`PinPlan`] before committing.
//!
//! `days_pinned` is the single source of truth for a pin's length:
//! `end_date` is always `start_date + days_pinned` days, and one unit of
//! balance is spent per day.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::pin::PinType;
use shared::validation::ALLOWED_PIN_DURATIONS;

/// Longest a single pin may stay active, in days.
pub const MAX_PIN_DAYS: i32 = 7;

/// Rule violations when pinning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinRuleError {
    #[error("Pin duration must be 1, 3, or 7 days (got {0})")]
    InvalidDuration(i32),

    #[error("Insufficient {}. You need {required} pins but have {available}.", .pin_type.balance_name())]
    InsufficientFunds {
        pin_type: PinType,
        required: i32,
        available: i32,
    },

    #[error("Pins cannot last more than {max} days. This pin has {current} days and {requested} more were requested.")]
    DurationLimitExceeded {
        current: i32,
        requested: i32,
        max: i32,
    },
}

/// The parts of an active pin that planning depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePin {
    pub id: Uuid,
    pub days_pinned: i32,
    pub pins_used: i32,
    pub start_date: DateTime<Utc>,
}

/// What to write for a valid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPlan {
    Create {
        days_pinned: i32,
        pins_used: i32,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    },
    Extend {
        pin_id: Uuid,
        days_pinned: i32,
        pins_used: i32,
        end_date: DateTime<Utc>,
        added_days: i32,
    },
}

impl PinPlan {
    /// Units to take from the balance.
    pub fn debit(&self) -> i32 {
        match self {
            PinPlan::Create { pins_used, .. } => *pins_used,
            PinPlan::Extend { added_days, .. } => *added_days,
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, PinPlan::Extend { .. })
    }
}

/// End of a pin that started at `start_date` and runs for `days_pinned` days.
pub fn pin_end_date(start_date: DateTime<Utc>, days_pinned: i32) -> DateTime<Utc> {
    start_date + Duration::days(i64::from(days_pinned))
}

/// Decides how to honour a request for `requested_days` more days of pinning.
///
/// Checks run in a fixed order: duration, balance, then the total length cap.
pub fn plan_pin(
    requested_days: i32,
    pin_type: PinType,
    balance: i32,
    existing: Option<&ActivePin>,
    now: DateTime<Utc>,
) -> Result<PinPlan, PinRuleError> {
    if !ALLOWED_PIN_DURATIONS.contains(&requested_days) {
        return Err(PinRuleError::InvalidDuration(requested_days));
    }

    if balance < requested_days {
        return Err(PinRuleError::InsufficientFunds {
            pin_type,
            required: requested_days,
            available: balance,
        });
    }

    match existing {
        None => Ok(PinPlan::Create {
            days_pinned: requested_days,
            pins_used: requested_days,
            start_date: now,
            end_date: pin_end_date(now, requested_days),
        }),
        Some(pin) => {
            if pin.days_pinned + requested_days > MAX_PIN_DAYS {
                return Err(PinRuleError::DurationLimitExceeded {
                    current: pin.days_pinned,
                    requested: requested_days,
                    max: MAX_PIN_DAYS,
                });
            }

            let days_pinned = pin.days_pinned + requested_days;
            Ok(PinPlan::Extend {
                pin_id: pin.id,
                days_pinned,
                pins_used: pin.pins_used + requested_days,
                end_date: pin_end_date(pin.start_date, days_pinned),
                added_days: requested_days,
            })
        }
    }
}
