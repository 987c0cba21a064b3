//! Shared utilities and common types for the Pinboard backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (SHA-256 digests, HMAC-SHA256 signatures)
//! - Password hashing with Argon2id
//! - Bearer token issuing and validation
//! - Request field validators

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
