//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod boards;
pub mod health;
pub mod payments;
pub mod pins;
pub mod posts;
pub mod users;
