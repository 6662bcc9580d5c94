//! HMAC-SHA256 computation for provider webhook signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Optional prefix some providers attach to the signature header value.
const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the HMAC-SHA256 signature for a provider webhook delivery.
///
/// The signature covers `{event_id}.{timestamp}.{body}` so neither the
/// delivery id, the timestamp, nor the payload can be swapped independently.
/// Returns a hex-encoded signature string.
pub fn compute_signature(secret: &str, event_id: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");

    mac.update(event_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    hex::encode(mac.finalize().into_bytes())
}

/// Verify a supplied signature using constant-time comparison.
///
/// Accepts the raw hex digest or a `sha256=`-prefixed form.
pub fn verify_signature(
    supplied: &str,
    secret: &str,
    event_id: &str,
    timestamp: &str,
    body: &[u8],
) -> bool {
    let supplied = supplied.strip_prefix(SIGNATURE_PREFIX).unwrap_or(supplied);
    let computed = compute_signature(secret, event_id, timestamp, body);
    constant_time_eq(supplied.as_bytes(), computed.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks.
///
/// SECURITY: Uses the `subtle` crate for proper constant-time comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
