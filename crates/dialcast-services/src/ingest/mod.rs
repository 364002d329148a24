//! Subscriber list ingest

mod parser;

pub use parser::{parse_subscriber_csv, MISSING_COLUMN_MESSAGE};

use std::sync::Arc;

use dialcast_core::models::{CampaignSettings, IngestReport};
use dialcast_core::AppError;
use dialcast_db::{AudioFileStore, ProviderStore, SettingsStore, SubscriberStore};
use uuid::Uuid;

/// Result of an upload plus the campaign settings it produced, if any.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub report: IngestReport,
    /// `None` when the user has no provider or no audio file yet.
    pub settings: Option<CampaignSettings>,
}

#[derive(Clone)]
pub struct SubscriberIngestService {
    subscribers: Arc<dyn SubscriberStore>,
    settings: Arc<dyn SettingsStore>,
    providers: Arc<dyn ProviderStore>,
    audio_files: Arc<dyn AudioFileStore>,
}

impl SubscriberIngestService {
    pub fn new(
        subscribers: Arc<dyn SubscriberStore>,
        settings: Arc<dyn SettingsStore>,
        providers: Arc<dyn ProviderStore>,
        audio_files: Arc<dyn AudioFileStore>,
    ) -> Self {
        Self {
            subscribers,
            settings,
            providers,
            audio_files,
        }
    }

    /// Parse the whole upload, then clear (optionally) and insert in one transaction.
    /// A parse failure leaves the stored list untouched.
    #[tracing::instrument(skip(self, data), fields(ingest.bytes = data.len()))]
    pub async fn ingest(
        &self,
        user_id: Uuid,
        data: &[u8],
        clear: bool,
    ) -> Result<IngestReport, AppError> {
        let numbers = parse_subscriber_csv(data)?;

        let report = self
            .subscribers
            .replace_subscribers(user_id, numbers, clear)
            .await?;

        tracing::info!(
            user_id = %user_id,
            inserted = report.inserted,
            cleared = report.cleared,
            "Subscriber list ingested"
        );

        Ok(report)
    }

    /// Point the user's campaign at their most recent provider and audio file.
    pub async fn configure_settings(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CampaignSettings>, AppError> {
        let provider = self.providers.latest_provider(user_id).await?;
        let audio_file = self.audio_files.latest_audio_file(user_id).await?;

        match (provider, audio_file) {
            (Some(provider), Some(audio_file)) => {
                let settings = self
                    .settings
                    .upsert_settings(user_id, provider.id, audio_file.id)
                    .await?;
                Ok(Some(settings))
            }
            (provider, audio_file) => {
                tracing::debug!(
                    user_id = %user_id,
                    has_provider = provider.is_some(),
                    has_audio_file = audio_file.is_some(),
                    "Campaign settings left unconfigured"
                );
                Ok(None)
            }
        }
    }

    /// Ingest, then configure settings. Settings failures do not undo the ingest.
    pub async fn ingest_and_configure(
        &self,
        user_id: Uuid,
        data: &[u8],
        clear: bool,
    ) -> Result<IngestSummary, AppError> {
        let report = self.ingest(user_id, data, clear).await?;
        let settings = self.configure_settings(user_id).await?;
        Ok(IngestSummary { report, settings })
    }
}
