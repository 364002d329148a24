//! Database repositories for data access layer
//!
//! Each repository owns one table and scopes every query by the owning user.
//! Dependents are never removed by the database: deletes that must cascade do so
//! explicitly inside one transaction.

pub mod audio_file;
pub mod campaign_settings;
pub mod subscriber;
pub mod telephony_provider;
pub mod token;
pub mod transaction;
pub mod user;

pub use audio_file::AudioFileRepository;
pub use campaign_settings::CampaignSettingsRepository;
pub use subscriber::SubscriberRepository;
pub use telephony_provider::TelephonyProviderRepository;
pub use token::AccessTokenRepository;
pub use transaction::with_transaction;
pub use user::UserRepository;

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// True when `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}
