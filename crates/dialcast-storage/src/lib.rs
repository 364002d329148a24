//! Dialcast Storage Library
//!
//! Storage abstraction for uploaded audio artifacts, with a local filesystem backend.
//!
//! # Storage key format
//!
//! Keys are user-scoped: `audio/{user_id}/{filename}`. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::generate_storage_key;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

use dialcast_core::AppError;

/// A missing object surfaces as `NotFound`; everything else as a storage failure.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                AppError::NotFound(format!("Stored file not found: {}", key))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}
