//! Provider secret sealing
//!
//! A telephony provider secret is stored twice: as an argon2 hash, used to check a
//! re-submitted secret without decrypting anything, and as an AES-256-GCM sealed blob,
//! opened only when a call needs to answer a SIP digest challenge.

use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose, Engine as _};

/// Output of [`SecretSealer::seal`], ready to be written by the provider repository.
#[derive(Debug, Clone)]
pub struct SealedSecret {
    pub hash: String,
    pub sealed: String,
}

/// Hashes and encrypts provider secrets. Uses AES-256-GCM for the sealed copy.
#[derive(Clone)]
pub struct SecretSealer {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SecretSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSealer").finish_non_exhaustive()
    }
}

impl SecretSealer {
    /// Create a sealer from a raw 32-byte key (e.g. for tests; avoids env mutation).
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::Internal(
                "Encryption key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create a sealer from a base64-encoded 32-byte key
    pub fn from_base64_key(key_str: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(key_str.trim())
            .map_err(|e| AppError::Internal(format!("Failed to decode encryption key: {}", e)))?;

        Self::from_key_bytes(&key_bytes)
    }

    /// Hash and encrypt a plaintext secret.
    pub fn seal(&self, secret: &str) -> Result<SealedSecret, AppError> {
        Ok(SealedSecret {
            hash: hash_secret(secret)?,
            sealed: self.encrypt(secret)?,
        })
    }

    /// Recover the plaintext secret from its sealed form.
    pub fn open(&self, sealed: &str) -> Result<String, AppError> {
        self.decrypt(sealed)
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Internal(format!("Encryption failed: {}", e)))?;

        // nonce || ciphertext, base64
        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    fn decrypt(&self, encrypted: &str) -> Result<String, AppError> {
        let combined = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| AppError::Internal(format!("Failed to decode sealed secret: {}", e)))?;

        if combined.len() < 12 {
            return Err(AppError::Internal("Sealed secret too short".to_string()));
        }

        let nonce = Nonce::from_slice(&combined[..12]);
        let ciphertext = &combined[12..];

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| AppError::Internal(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Internal(format!("Invalid UTF-8 in sealed secret: {}", e)))
    }
}

/// Hash a secret with argon2 (PHC string).
pub fn hash_secret(secret: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash secret: {}", e)))
}

/// Verify a secret against an argon2 PHC string. Malformed hashes never match.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sealer() -> SecretSealer {
        SecretSealer::from_key_bytes(b"01234567890123456789012345678901").unwrap()
    }

    #[test]
    fn test_seal_and_open() {
        let sealer = test_sealer();
        let sealed = sealer.seal("sip-password").unwrap();

        assert_ne!(sealed.sealed, "sip-password");
        assert!(sealed.hash.starts_with("$argon2"));
        assert_eq!(sealer.open(&sealed.sealed).unwrap(), "sip-password");
    }

    #[test]
    fn test_hash_verifies() {
        let sealed = test_sealer().seal("sip-password").unwrap();
        assert!(verify_secret("sip-password", &sealed.hash));
        assert!(!verify_secret("wrong", &sealed.hash));
        assert!(!verify_secret("sip-password", "not-a-phc-string"));
    }

    #[test]
    fn test_wrong_key_cannot_open() {
        let sealed = test_sealer().seal("sip-password").unwrap();
        let other = SecretSealer::from_key_bytes(b"abcdefghijabcdefghijabcdefghijab").unwrap();
        assert!(other.open(&sealed.sealed).is_err());
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(SecretSealer::from_key_bytes(b"short").is_err());
    }
}
