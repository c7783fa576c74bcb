use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks the webhook signature header against an HMAC-SHA256 over the exact
/// request bytes. Total: a missing, non-hex or wrong-length token is simply
/// not verified. The comparison runs in constant time.
pub fn verify(body: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(signature) = signature else {
        return false;
    };
    let Ok(supplied) = hex::decode(signature.trim_start_matches("0x")) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&supplied).is_ok()
}

/// Hex token for `body`, as the indexer side computes it.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"apply":[],"rollback":[]}"#;
        let token = sign(body, SECRET);
        assert!(verify(body, Some(&token), SECRET));
    }

    #[test]
    fn accepts_prefixed_token() {
        let body = b"payload";
        let token = format!("0x{}", sign(body, SECRET));
        assert!(verify(body, Some(&token), SECRET));
    }

    #[test]
    fn rejects_tampered_body() {
        let token = sign(b"original", SECRET);
        assert!(!verify(b"tampered", Some(&token), SECRET));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"payload";
        let token = sign(body, "other-secret");
        assert!(!verify(body, Some(&token), SECRET));
    }

    #[test]
    fn rejects_missing_signature() {
        assert!(!verify(b"payload", None, SECRET));
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(!verify(b"payload", Some("not hex"), SECRET));
        assert!(!verify(b"payload", Some("deadbeef"), SECRET));
        assert!(!verify(b"payload", Some(""), SECRET));
    }
}
