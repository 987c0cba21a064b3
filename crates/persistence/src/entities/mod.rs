//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod board;
pub mod pin;
pub mod pin_purchase;
pub mod post;
pub mod user;

pub use board::{BoardEntity, BoardTypeDb};
pub use pin::{PinEntity, PinTypeDb};
pub use pin_purchase::{PackTypeDb, PinPurchaseEntity};
pub use post::{PostEntity, PostWithPinEntity};
pub use user::{BalancesEntity, UserEntity};
