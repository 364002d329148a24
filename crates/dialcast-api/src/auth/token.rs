//! Access token helpers
//!
//! Tokens are `dc_` followed by 64 hex characters. Only the first
//! [`TOKEN_PREFIX_LEN`] characters are stored in clear, for lookup; the full token is
//! kept as an argon2 hash.

use dialcast_core::constants::TOKEN_PREFIX_LEN;
use dialcast_core::encryption::{hash_secret, verify_secret};
use dialcast_core::AppError;

use crate::constants::{ACCESS_TOKEN_BYTES, ACCESS_TOKEN_PREFIX};

/// Generate a fresh bearer token.
pub fn generate_access_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..ACCESS_TOKEN_BYTES).map(|_| rng.random()).collect();

    format!("{}{}", ACCESS_TOKEN_PREFIX, hex::encode(random_bytes))
}

/// Clear-text lookup prefix of a token.
pub fn extract_token_prefix(token: &str) -> String {
    token.chars().take(TOKEN_PREFIX_LEN).collect()
}

pub fn hash_access_token(token: &str) -> Result<String, AppError> {
    hash_secret(token)
}

pub fn verify_access_token(token: &str, hash: &str) -> bool {
    verify_secret(token, hash)
}

/// Cheap shape check done before touching the database.
pub fn looks_like_access_token(token: &str) -> bool {
    token.len() == ACCESS_TOKEN_PREFIX.len() + ACCESS_TOKEN_BYTES * 2
        && token.starts_with(ACCESS_TOKEN_PREFIX)
        && token[ACCESS_TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_well_formed() {
        let a = generate_access_token();
        let b = generate_access_token();
        assert_ne!(a, b);
        assert!(a.starts_with("dc_"));
        assert!(looks_like_access_token(&a));
        assert_eq!(extract_token_prefix(&a).len(), TOKEN_PREFIX_LEN);
    }

    #[test]
    fn test_hash_roundtrip() {
        let token = generate_access_token();
        let hash = hash_access_token(&token).unwrap();
        assert!(verify_access_token(&token, &hash));
        assert!(!verify_access_token(&generate_access_token(), &hash));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(!looks_like_access_token("dc_short"));
        assert!(!looks_like_access_token(&format!("xx_{}", "a".repeat(64))));
        assert!(!looks_like_access_token(&format!("dc_{}", "z".repeat(64))));
    }
}
