//! Slack request signature verification.
//!
//! Slack signs every slash-command request using HMAC-SHA256 over
//! `v0:{timestamp}:{raw body}` and sends the result as `v0={hex digest}`.
//! Reference: https://api.slack.com/authentication/verifying-requests-from-slack

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Version prefix used both in the signing string and the signature.
pub const SIGNATURE_VERSION: &str = "v0";

/// Header carrying the request timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Compute the Slack signature for a request.
///
/// Returns `v0=` followed by the lowercase hex HMAC-SHA256 of
/// `v0:{timestamp}:{body}` keyed with `signing_secret`, or `None` if the key
/// is rejected by the MAC.
pub fn compute_slack_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("slack_signature_invalid_key");
            return None;
        }
    };

    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);

    Some(format!(
        "{}={}",
        SIGNATURE_VERSION,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Verify a Slack request signature.
///
/// # Arguments
///
/// * `signing_secret` - The Slack app signing secret
/// * `timestamp` - The `X-Slack-Request-Timestamp` header, if present
/// * `body` - The raw request body, byte for byte
/// * `signature` - The `X-Slack-Signature` header, if present
///
/// # Returns
///
/// `true` only if every input is present and the signature matches.
pub fn verify_slack_signature(
    signing_secret: &str,
    timestamp: Option<&str>,
    body: &[u8],
    signature: Option<&str>,
) -> bool {
    let (timestamp, signature) = match (timestamp, signature) {
        (Some(t), Some(s)) if !signing_secret.is_empty() && !t.is_empty() && !s.is_empty() && !body.is_empty() => {
            (t, s)
        }
        _ => {
            warn!(
                has_signing_secret = !signing_secret.is_empty(),
                has_timestamp = timestamp.is_some_and(|t| !t.is_empty()),
                has_signature = signature.is_some_and(|s| !s.is_empty()),
                body_length = body.len(),
                "slack_signature_missing_fields"
            );
            return false;
        }
    };

    let expected_signature = match compute_slack_signature(signing_secret, timestamp, body) {
        Some(sig) => sig,
        None => return false,
    };

    // Constant-time comparison to prevent timing attacks
    let valid: bool = expected_signature
        .as_bytes()
        .ct_eq(signature.as_bytes())
        .into();

    if !valid {
        warn!(
            expected_length = expected_signature.len(),
            actual_length = signature.len(),
            "slack_signature_mismatch"
        );
    }

    valid
}

/// Check that a Slack timestamp is within `max_age_seconds` of now.
///
/// A `max_age_seconds` of zero disables the check. Non-numeric timestamps
/// are always rejected.
pub fn is_timestamp_fresh(timestamp: &str, max_age_seconds: u64) -> bool {
    let request_time: u64 = match timestamp.trim().parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp = %timestamp, "slack_signature_invalid_timestamp");
            return false;
        }
    };

    if max_age_seconds == 0 {
        return true;
    }

    let current_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let age = current_time.abs_diff(request_time);

    if age > max_age_seconds {
        warn!(
            request_time = request_time,
            current_time = current_time,
            age_seconds = age,
            max_age_seconds = max_age_seconds,
            "slack_signature_stale"
        );
        return false;
    }

    true
}
