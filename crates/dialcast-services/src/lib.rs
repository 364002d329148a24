//! Dialcast Services Layer
//!
//! Business services sitting between the HTTP handlers and the stores: subscriber list
//! ingest and the sequential campaign runner. Handlers stay thin; coordination lives here.

pub mod campaign;
pub mod ingest;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use campaign::{AudioDecoder, CampaignRunner, NOT_CONFIGURED_MESSAGE};
pub use ingest::{parse_subscriber_csv, IngestSummary, SubscriberIngestService};

pub use dialcast_media::{MediaValidator, TelephonyAudio};
pub use dialcast_sip::{detect_local_ip, PhoneFactory, SipPhoneFactory};
pub use dialcast_storage::{LocalStorage, Storage, StorageError, StorageResult};
