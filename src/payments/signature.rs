//! HMAC-SHA256 callback signature verification.
//!
//! The gateway signs `"{gateway_order_id}|{gateway_payment_id}"` with the
//! shared webhook secret and sends the hex digest alongside the callback.
//! We recompute and compare in constant time; the comparison is load-bearing
//! and runs even when the gateway SDK already reported success.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature for an (order, payment) pair.
pub fn sign(secret: &[u8], gateway_order_id: &str, gateway_payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a callback signature.
///
/// Returns `false` for malformed hex, truncated digests, or any bit
/// mismatch. Never panics on attacker-controlled input.
pub fn verify(
    secret: &[u8],
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature_hex: &str,
) -> bool {
    let provided = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());

    // Constant-time comparison
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test_0123456789";

    #[test]
    fn test_verify_valid_signature() {
        let sig = sign(SECRET, "order_123", "pay_456");
        assert!(verify(SECRET, "order_123", "pay_456", &sig));
    }

    #[test]
    fn test_verify_tampered_signature() {
        let mut sig = sign(SECRET, "order_123", "pay_456");
        // Flip one nibble
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify(SECRET, "order_123", "pay_456", &sig));
    }

    #[test]
    fn test_verify_wrong_payment_id() {
        let sig = sign(SECRET, "order_123", "pay_456");
        assert!(!verify(SECRET, "order_123", "pay_999", &sig));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let sig = sign(b"whsec_other", "order_123", "pay_456");
        assert!(!verify(SECRET, "order_123", "pay_456", &sig));
    }

    #[test]
    fn test_verify_malformed_hex() {
        assert!(!verify(SECRET, "order_123", "pay_456", "not-hex!"));
        assert!(!verify(SECRET, "order_123", "pay_456", ""));
        // Truncated digest
        let sig = sign(SECRET, "order_123", "pay_456");
        assert!(!verify(SECRET, "order_123", "pay_456", &sig[..32]));
    }
}
