//! Webhook signature verification (HMAC-SHA256)

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::SIGNATURE_PREFIX;
use super::types::WebhookSecret;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("webhook secret is not configured")]
    SecretNotConfigured,
    #[error("signature header is missing")]
    Missing,
    #[error("signature header is malformed")]
    Malformed,
    #[error("signature does not match payload")]
    Mismatch,
}

/// `sha256=<hex>` for `payload` under `secret`
pub fn sign_payload(secret: &WebhookSecret, payload: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Check `header` against the HMAC of `payload`. Fails closed when no
/// secret is configured. The digest comparison is constant-time.
pub fn verify_signature(
    secret: Option<&WebhookSecret>,
    payload: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let secret = secret.ok_or(SignatureError::SecretNotConfigured)?;
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::Missing)?;

    let digest_hex = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let digest = hex::decode(digest_hex).map_err(|_| SignatureError::Malformed)?;

    let mut mac = keyed_mac(secret);
    mac.update(payload);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

fn keyed_mac(secret: &WebhookSecret) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(secret.expose())
        .expect("HMAC can take key of any size")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> WebhookSecret {
        WebhookSecret::new("It's a Secret to Everybody").unwrap()
    }

    #[test]
    fn test_known_vector() {
        // Published GitHub webhook example
        let header = sign_payload(&secret(), b"Hello, World!");
        assert_eq!(
            header,
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn test_round_trip() {
        let payload = br#"{"ref":"refs/heads/main"}"#;
        let header = sign_payload(&secret(), payload);
        assert_eq!(verify_signature(Some(&secret()), payload, Some(&header)), Ok(()));
    }

    #[test]
    fn test_unset_secret_fails_closed() {
        let header = sign_payload(&secret(), b"{}");
        assert_eq!(
            verify_signature(None, b"{}", Some(&header)),
            Err(SignatureError::SecretNotConfigured)
        );
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let s = secret();
        assert_eq!(verify_signature(Some(&s), b"{}", None), Err(SignatureError::Missing));
        assert_eq!(verify_signature(Some(&s), b"{}", Some("")), Err(SignatureError::Missing));
        assert_eq!(
            verify_signature(Some(&s), b"{}", Some("sha1=abcdef")),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(Some(&s), b"{}", Some("sha256=not-hex")),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_tampered_payload_or_key() {
        let s = secret();
        let header = sign_payload(&s, b"original");
        assert_eq!(
            verify_signature(Some(&s), b"tampered", Some(&header)),
            Err(SignatureError::Mismatch)
        );

        let other = WebhookSecret::new("other").unwrap();
        assert_eq!(
            verify_signature(Some(&other), b"original", Some(&header)),
            Err(SignatureError::Mismatch)
        );

        // Truncated digest
        assert_eq!(
            verify_signature(Some(&s), b"original", Some(&header[..header.len() - 2])),
            Err(SignatureError::Mismatch)
        );
    }
}
