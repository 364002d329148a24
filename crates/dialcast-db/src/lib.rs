//! Dialcast database layer
//!
//! Postgres repositories for the campaign configuration store, plus the store traits
//! the services depend on so they can be exercised without a database.

pub mod db;
pub mod store_traits;

pub use db::*;
pub use store_traits::{AudioFileStore, ProviderStore, SettingsStore, SubscriberStore};
