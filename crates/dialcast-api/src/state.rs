//! Application state
//!
//! AppState is split into domain sub-states so handlers reach for exactly what they
//! use: repositories, the audio store, or the workflow services.

use dialcast_core::{Config, SecretSealer};
use dialcast_db::{
    AccessTokenRepository, AudioFileRepository, CampaignSettingsRepository,
    SubscriberRepository, TelephonyProviderRepository, UserRepository,
};
use dialcast_media::MediaValidator;
use dialcast_services::{CampaignRunner, SubscriberIngestService};
use dialcast_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and one repository per table.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub tokens: AccessTokenRepository,
    pub providers: TelephonyProviderRepository,
    pub audio_files: AudioFileRepository,
    pub subscribers: SubscriberRepository,
    pub settings: CampaignSettingsRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: AccessTokenRepository::new(pool.clone()),
            providers: TelephonyProviderRepository::new(pool.clone()),
            audio_files: AudioFileRepository::new(pool.clone()),
            subscribers: SubscriberRepository::new(pool.clone()),
            settings: CampaignSettingsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Audio uploads: where they are kept and how they are checked.
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub validator: Arc<MediaValidator>,
}

/// Services behind the workflow endpoints.
#[derive(Clone)]
pub struct WorkflowState {
    pub ingest: SubscriberIngestService,
    pub campaign: CampaignRunner,
}

pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
    pub workflow: WorkflowState,
    pub sealer: SecretSealer,
    pub config: Config,
}
