//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header looks like `t=1492774577,v1=5257a8...`.
//! The signed payload is `"{t}.{raw body}"`, HMAC-SHA256 keyed with the
//! endpoint's signing secret.

use shared::crypto::{hmac_sha256_hex, verify_hmac_sha256_hex};
use thiserror::Error;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

const SIGNATURE_SCHEME: &str = "v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    #[error("Malformed Stripe-Signature header")]
    MalformedSignature,

    #[error("Signature timestamp outside tolerance")]
    TimestampOutsideTolerance,

    #[error("No signature matches the payload")]
    SignatureMismatch,

    #[error("Webhook signing secret is not configured")]
    NotConfigured,
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` signature present. Stripe sends several while a secret is rotated.
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or(WebhookError::MalformedSignature)?;
            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| WebhookError::MalformedSignature)?,
                    )
                }
                SIGNATURE_SCHEME => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
        if signatures.is_empty() {
            return Err(WebhookError::MalformedSignature);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

fn signed_payload(timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let prefix = format!("{}.", timestamp);
    let mut signed = Vec::with_capacity(prefix.len() + payload.len());
    signed.extend_from_slice(prefix.as_bytes());
    signed.extend_from_slice(payload);
    signed
}

/// Checks a webhook delivery against the signing secret.
///
/// `now` is a unix timestamp. Signatures older than `tolerance_secs` are rejected.
pub fn verify_signature(
    secret: &str,
    header: Option<&str>,
    payload: &[u8],
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::NotConfigured);
    }

    let header = SignatureHeader::parse(header.ok_or(WebhookError::MissingSignature)?)?;

    if now - header.timestamp > tolerance_secs {
        return Err(WebhookError::TimestampOutsideTolerance);
    }

    let signed = signed_payload(header.timestamp, payload);
    let matched = header
        .signatures
        .iter()
        .any(|signature| verify_hmac_sha256_hex(secret.as_bytes(), &signed, signature));

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Builds a `Stripe-Signature` header value for a payload.
pub fn signature_header(secret: &str, payload: &[u8], timestamp: i64) -> Result<String, WebhookError> {
    let signature = hmac_sha256_hex(secret.as_bytes(), &signed_payload(timestamp, payload))
        .map_err(|_| WebhookError::NotConfigured)?;
    Ok(format!("t={},{}={}", timestamp, SIGNATURE_SCHEME, signature))
}
