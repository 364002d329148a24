//! Shared key generation for storage backends.

use dialcast_core::constants::AUDIO_KEY_PREFIX;
use uuid::Uuid;

/// Generate a storage key for the given user and filename: `audio/{user_id}/{filename}`.
pub fn generate_storage_key(user_id: Uuid, filename: &str) -> String {
    format!("{}/{}/{}", AUDIO_KEY_PREFIX, user_id, filename)
}

/// Reject keys that could escape the storage root.
pub fn validate_key(storage_key: &str) -> bool {
    !storage_key.is_empty()
        && !storage_key.contains("..")
        && !storage_key.starts_with('/')
        && !storage_key.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_user_scoped() {
        let user = Uuid::nil();
        assert_eq!(
            generate_storage_key(user, "a.mp3"),
            "audio/00000000-0000-0000-0000-000000000000/a.mp3"
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("audio/u/a.mp3"));
        assert!(!validate_key("../etc/passwd"));
        assert!(!validate_key("/abs"));
        assert!(!validate_key(""));
    }
}
