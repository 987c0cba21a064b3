//! Domain layer for the Pinboard backend.
//!
//! This crate contains:
//! - Domain models (User, Board, Post, Pin, PinPurchase, payment events)
//! - Pure pin lifecycle rules and the pin pack catalogue
//! - Domain error types

pub mod models;
pub mod services;
