//! Service and repository wiring

use crate::state::{AppState, DbState, MediaState, WorkflowState};
use anyhow::{Context, Result};
use dialcast_core::{Config, SecretSealer};
use dialcast_media::MediaValidator;
use dialcast_services::{CampaignRunner, SubscriberIngestService};
use dialcast_sip::SipPhoneFactory;
use dialcast_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

/// Local audio store rooted at `LOCAL_STORAGE_PATH`.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.local_storage_path())
        .await
        .context("Failed to initialize audio storage")?;
    tracing::info!(path = %storage.base_path().display(), "Audio storage ready");
    Ok(Arc::new(storage))
}

/// Build the repositories and services behind the handlers.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let sealer = SecretSealer::from_base64_key(config.secret_encryption_key())
        .map_err(|e| anyhow::anyhow!("Invalid SECRET_ENCRYPTION_KEY: {}", e))?;

    let db = DbState::new(pool);

    let ingest = SubscriberIngestService::new(
        Arc::new(db.subscribers.clone()),
        Arc::new(db.settings.clone()),
        Arc::new(db.providers.clone()),
        Arc::new(db.audio_files.clone()),
    );

    let campaign = CampaignRunner::new(
        Arc::new(db.settings.clone()),
        Arc::new(db.providers.clone()),
        Arc::new(db.audio_files.clone()),
        Arc::new(db.subscribers.clone()),
        storage.clone(),
        Arc::new(SipPhoneFactory::new(config.call().clone())),
        sealer.clone(),
        config.call().clone(),
    );

    tracing::info!(
        sip_port = config.call().sip_port,
        answer_timeout_secs = config.call().answer_timeout.as_secs(),
        "Campaign runner ready"
    );

    Ok(Arc::new(AppState {
        db,
        media: MediaState {
            storage,
            validator: Arc::new(MediaValidator::mp3(config.max_audio_size_bytes())),
        },
        workflow: WorkflowState { ingest, campaign },
        sealer,
        config: config.clone(),
    }))
}
