//! Domain services for Pinboard.
//!
//! Services contain business logic that operates on domain models.

pub mod pin_lifecycle;

pub use pin_lifecycle::{plan_pin, ActivePin, PinPlan, PinRuleError, MAX_PIN_DAYS};
