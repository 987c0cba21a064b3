//! Domain models for Pinboard.

pub mod board;
pub mod payment;
pub mod pin;
pub mod post;
pub mod purchase;
pub mod user;

pub use board::{Board, BoardType};
pub use payment::{PaymentEvent, PaymentIntent, PaymentIntentStatus, PaymentMetadata};
pub use pin::{Pin, PinType};
pub use post::Post;
pub use purchase::{PackType, PinPack, PinPurchase};
pub use user::User;
