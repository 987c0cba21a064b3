//! Business logic services.

pub mod auth;
pub mod payments;
pub mod pins;
pub mod settlement;
pub mod upkeep;
pub mod webhook;
