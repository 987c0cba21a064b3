//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod idempotency_key;
pub mod user_auth;

pub use idempotency_key::{IdempotencyKey, OptionalIdempotencyKey, IDEMPOTENCY_KEY_HEADER};
pub use user_auth::{AdminUser, UserAuth};
