//! Repository implementations for database operations.
//!
//! Methods taking `&self` run on the pool. Associated functions taking a
//! `&mut PgConnection` run inside a transaction owned by the caller.

pub mod board;
pub mod pin;
pub mod pin_purchase;
pub mod post;
pub mod user;

pub use board::{BoardFilter, BoardRepository, NewBoard};
pub use pin::{NewPin, PinRepository};
pub use pin_purchase::PinPurchaseRepository;
pub use post::PostRepository;
pub use user::UserRepository;
