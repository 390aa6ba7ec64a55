//! Webhook signature verification.
//!
//! LINE signs each webhook body with HMAC-SHA256 keyed by the channel
//! secret and sends the base64-encoded digest in `X-Line-Signature`.

use crate::error::WebhookError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn keyed_digest(channel_secret: &str, body: &[u8]) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(body);
    Ok(mac)
}

/// Computes the base64 signature of a body.
///
/// # Errors
///
/// Returns an error if the secret cannot key the HMAC.
pub fn sign(channel_secret: &str, body: &[u8]) -> Result<String, WebhookError> {
    let mac = keyed_digest(channel_secret, body)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies a body against its signature header value.
///
/// # Errors
///
/// Returns `MissingSignature` for an absent or blank header and
/// `InvalidSignature` when the digest does not match.
pub fn verify(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), WebhookError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(WebhookError::MissingSignature)?;

    let expected = STANDARD
        .decode(signature)
        .map_err(|_| WebhookError::InvalidSignature)?;

    keyed_digest(channel_secret, body)?
        .verify_slice(&expected)
        .map_err(|_| WebhookError::InvalidSignature)
}
