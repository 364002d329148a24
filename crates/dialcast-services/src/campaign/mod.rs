//! Sequential outbound campaign runner

mod attempt;

use std::sync::Arc;
use std::time::Instant;

use dialcast_core::models::{CallOutcome, CallState, CampaignReport};
use dialcast_core::{AppError, CallConfig, ErrorMetadata, SecretSealer};
use dialcast_db::{AudioFileStore, ProviderStore, SettingsStore, SubscriberStore};
use dialcast_media::{prepare_for_telephony, MediaError, TelephonyAudio};
use dialcast_sip::{detect_local_ip, PhoneFactory, PhoneParams, Softphone};
use dialcast_storage::Storage;
use uuid::Uuid;

use attempt::CallAttempt;

pub const NOT_CONFIGURED_MESSAGE: &str = "You must configure your settings before making calls.";

/// Turns stored audio bytes into PCMU frames.
pub type AudioDecoder = fn(&[u8]) -> Result<TelephonyAudio, MediaError>;

/// Dials every subscriber of a user, one at a time, and plays the configured message.
///
/// Each attempt builds a fresh softphone, so a failed attempt never leaks a registration
/// into the next one. Per-subscriber failures are recorded in the report and the run
/// continues; only configuration and loading errors abort the run.
#[derive(Clone)]
pub struct CampaignRunner {
    settings: Arc<dyn SettingsStore>,
    providers: Arc<dyn ProviderStore>,
    audio_files: Arc<dyn AudioFileStore>,
    subscribers: Arc<dyn SubscriberStore>,
    storage: Arc<dyn Storage>,
    phones: Arc<dyn PhoneFactory>,
    sealer: SecretSealer,
    config: CallConfig,
    decode: AudioDecoder,
}

impl CampaignRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        providers: Arc<dyn ProviderStore>,
        audio_files: Arc<dyn AudioFileStore>,
        subscribers: Arc<dyn SubscriberStore>,
        storage: Arc<dyn Storage>,
        phones: Arc<dyn PhoneFactory>,
        sealer: SecretSealer,
        config: CallConfig,
    ) -> Self {
        Self {
            settings,
            providers,
            audio_files,
            subscribers,
            storage,
            phones,
            sealer,
            config,
            decode: prepare_for_telephony,
        }
    }

    /// Replace the MP3 pipeline, e.g. with a fixed clip.
    pub fn with_audio_decoder(mut self, decode: AudioDecoder) -> Self {
        self.decode = decode;
        self
    }

    #[tracing::instrument(skip(self), fields(campaign.user_id = %user_id))]
    pub async fn run(&self, user_id: Uuid) -> Result<CampaignReport, AppError> {
        let not_configured = || AppError::NotConfigured(NOT_CONFIGURED_MESSAGE.to_string());

        let settings = self
            .settings
            .settings_for_user(user_id)
            .await?
            .ok_or_else(not_configured)?;
        let provider = self
            .providers
            .find_provider(user_id, settings.provider_id)
            .await?
            .ok_or_else(not_configured)?;
        let audio_file = self
            .audio_files
            .find_audio_file(user_id, settings.audio_file_id)
            .await?
            .ok_or_else(not_configured)?;

        let password = self.sealer.open(&provider.secret_sealed)?;
        let audio = self.load_audio(&audio_file.storage_key).await?;

        let subscribers = self.subscribers.subscribers_for_user(user_id).await?;
        let mut report = CampaignReport::default();
        if subscribers.is_empty() {
            tracing::info!("No subscribers to call");
            return Ok(report);
        }

        let params = PhoneParams {
            gateway: provider.sip_gateway_address.clone(),
            port: self.config.sip_port,
            username: provider.username.clone(),
            password,
            local_ip: detect_local_ip(),
        };

        tracing::info!(
            subscribers = subscribers.len(),
            gateway = %params.gateway,
            local_ip = %params.local_ip,
            audio_ms = audio.duration_ms,
            "Starting campaign"
        );

        for subscriber in &subscribers {
            let outcome = self
                .call_subscriber(&params, &subscriber.phone_number, &audio)
                .await;
            report.record(outcome);
        }

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "Campaign finished"
        );

        Ok(report)
    }

    async fn load_audio(&self, storage_key: &str) -> Result<TelephonyAudio, AppError> {
        let data = self.storage.download(storage_key).await?;
        let decode = self.decode;

        let audio = tokio::task::spawn_blocking(move || decode(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Audio decode task failed: {}", e)))??;

        if audio.frames.is_empty() {
            return Err(MediaError::Empty.into());
        }
        Ok(audio)
    }

    /// One attempt. Never fails; the outcome carries the error.
    async fn call_subscriber(
        &self,
        params: &PhoneParams,
        number: &str,
        audio: &TelephonyAudio,
    ) -> CallOutcome {
        let started = Instant::now();
        let mut attempt = CallAttempt::new(number);
        let mut phone = self.phones.build(params.clone());

        let result = drive_call(phone.as_mut(), &mut attempt, number, audio).await;

        // Release the provider connection whatever happened
        if let Err(e) = phone.stop().await {
            tracing::warn!(phone_number = %number, error = %e, "Failed to stop softphone");
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => {
                tracing::info!(phone_number = %number, elapsed_ms, "Call completed");
                attempt.finish(elapsed_ms)
            }
            Err(e) => {
                tracing::warn!(
                    phone_number = %number,
                    state = %attempt.state(),
                    elapsed_ms,
                    error = %e,
                    "Call attempt failed"
                );
                attempt.fail(e.client_message(), elapsed_ms)
            }
        }
    }
}

async fn drive_call(
    phone: &mut dyn Softphone,
    attempt: &mut CallAttempt,
    number: &str,
    audio: &TelephonyAudio,
) -> Result<(), AppError> {
    attempt.advance(CallState::Connecting);
    phone.start().await?;

    attempt.advance(CallState::Calling);
    let call = phone
        .call(number)
        .await?
        .ok_or_else(|| AppError::CallAttemptFailed(format!("Failed to make call to {}", number)))?;

    attempt.advance(CallState::Playing);
    if let Err(e) = phone.play(&call, &audio.frames).await {
        if let Err(hangup_err) = phone.hangup(call).await {
            tracing::debug!(error = %hangup_err, "Hangup after playback failure also failed");
        }
        return Err(e.into());
    }

    attempt.advance(CallState::HangingUp);
    phone.hangup(call).await?;

    Ok(())
}
