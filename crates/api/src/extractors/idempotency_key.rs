//! Idempotency key header extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts},
};
use shared::crypto::sha256_hex;
use uuid::Uuid;

use crate::error::ApiError;

/// The header name for idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Longest key a client may send. Matches the provider's own limit.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Client-chosen key that makes a retried request safe to replay.
#[derive(Debug, Clone)]
pub struct IdempotencyKey {
    /// The original key value from the header.
    pub original: String,
}

impl IdempotencyKey {
    pub fn new(original: String) -> Self {
        Self { original }
    }

    /// Key forwarded to the payment provider.
    ///
    /// Hashed together with the user id so two users choosing the same key
    /// never share a provider request.
    pub fn scoped_to(&self, user_id: Uuid) -> String {
        sha256_hex(&format!("{}:{}", user_id, self.original))
    }
}

/// Optional idempotency key extractor.
/// Returns `None` if the header is not present.
#[derive(Debug, Clone)]
pub struct OptionalIdempotencyKey(pub Option<IdempotencyKey>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalIdempotencyKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_name = HeaderName::from_static(IDEMPOTENCY_KEY_HEADER);

        let Some(value) = parts.headers.get(&header_name) else {
            return Ok(OptionalIdempotencyKey(None));
        };

        let key = value
            .to_str()
            .map_err(|_| ApiError::Validation("Idempotency-Key must be ASCII".to_string()))?
            .trim();

        if key.is_empty() {
            return Ok(OptionalIdempotencyKey(None));
        }
        if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
            return Err(ApiError::Validation(format!(
                "Idempotency-Key must be at most {} characters",
                MAX_IDEMPOTENCY_KEY_LEN
            )));
        }

        Ok(OptionalIdempotencyKey(Some(IdempotencyKey::new(
            key.to_string(),
        ))))
    }
}
