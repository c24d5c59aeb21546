//! Opaque session tokens.

use sha2::{Digest, Sha256};

/// Bytes of entropy in a token.
const TOKEN_BYTES: usize = 32;

/// The bearer credential handed to the client after login.
///
/// Only `digest()` is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a fresh 256-bit token, base64url encoded without padding.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(base64_url::encode(&bytes))
    }

    /// Wraps a token presented by a client.
    #[must_use]
    pub fn from_client(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token, for the response body and cookie.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Lower-case hex SHA-256 of the token, the session store key.
    #[must_use]
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(a.expose().len(), 43);
        assert!(
            a.expose()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let token = SessionToken::from_client("abc");
        assert_eq!(
            token.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(token.digest(), SessionToken::from_client("abc").digest());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = SessionToken::from_client("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
    }
}
