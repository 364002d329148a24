//! Repository trait abstractions for service testing
//!
//! These traits define the minimal interface the ingest and campaign services need
//! from storage, allowing them to be exercised without a database.

use async_trait::async_trait;
use dialcast_core::{
    models::{AudioFile, CampaignSettings, IngestReport, Subscriber, TelephonyProvider},
    AppError,
};
use uuid::Uuid;

use crate::db::{
    AudioFileRepository, CampaignSettingsRepository, SubscriberRepository,
    TelephonyProviderRepository,
};

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Subscribers of a user in the order the campaign should dial them.
    async fn subscribers_for_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, AppError>;

    /// Atomically (optionally clear and) insert a batch of normalized numbers.
    async fn replace_subscribers(
        &self,
        user_id: Uuid,
        phone_numbers: Vec<String>,
        clear: bool,
    ) -> Result<IngestReport, AppError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings_for_user(&self, user_id: Uuid) -> Result<Option<CampaignSettings>, AppError>;

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
        audio_file_id: Uuid,
    ) -> Result<CampaignSettings, AppError>;
}

#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn find_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TelephonyProvider>, AppError>;

    async fn latest_provider(&self, user_id: Uuid) -> Result<Option<TelephonyProvider>, AppError>;
}

#[async_trait]
pub trait AudioFileStore: Send + Sync {
    async fn find_audio_file(&self, user_id: Uuid, id: Uuid)
        -> Result<Option<AudioFile>, AppError>;

    async fn latest_audio_file(&self, user_id: Uuid) -> Result<Option<AudioFile>, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl SubscriberStore for SubscriberRepository {
    async fn subscribers_for_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, AppError> {
        self.list_subscribers(user_id).await
    }

    async fn replace_subscribers(
        &self,
        user_id: Uuid,
        phone_numbers: Vec<String>,
        clear: bool,
    ) -> Result<IngestReport, AppError> {
        self.replace_for_user(user_id, phone_numbers, clear).await
    }
}

#[async_trait]
impl SettingsStore for CampaignSettingsRepository {
    async fn settings_for_user(&self, user_id: Uuid) -> Result<Option<CampaignSettings>, AppError> {
        self.get_for_user(user_id).await
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
        audio_file_id: Uuid,
    ) -> Result<CampaignSettings, AppError> {
        self.upsert_for_user(user_id, provider_id, audio_file_id)
            .await
    }
}

#[async_trait]
impl ProviderStore for TelephonyProviderRepository {
    async fn find_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TelephonyProvider>, AppError> {
        self.get_provider(user_id, id).await
    }

    async fn latest_provider(&self, user_id: Uuid) -> Result<Option<TelephonyProvider>, AppError> {
        self.latest_for_user(user_id).await
    }
}

#[async_trait]
impl AudioFileStore for AudioFileRepository {
    async fn find_audio_file(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AudioFile>, AppError> {
        self.get_audio_file(user_id, id).await
    }

    async fn latest_audio_file(&self, user_id: Uuid) -> Result<Option<AudioFile>, AppError> {
        self.latest_for_user(user_id).await
    }
}
