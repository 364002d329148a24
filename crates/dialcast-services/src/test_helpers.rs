//! In-memory stores, storage and a scripted softphone for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dialcast_core::models::{
    AudioFile, CampaignSettings, IngestReport, Subscriber, TelephonyProvider,
};
use dialcast_core::{AppError, SecretSealer};
use dialcast_db::{AudioFileStore, ProviderStore, SettingsStore, SubscriberStore};
use dialcast_media::{MediaError, TelephonyAudio, FRAME_SAMPLES};
use dialcast_sip::{
    CallHandle, PhoneFactory, PhoneParams, SipError, Softphone, PCMU_FRAME_BYTES,
};
use dialcast_storage::{generate_storage_key, Storage, StorageError, StorageResult};
use uuid::Uuid;

pub fn test_sealer() -> SecretSealer {
    SecretSealer::from_key_bytes(&[7u8; 32]).unwrap()
}

/// Stand-in for the MP3 pipeline: two frames of silence.
pub fn test_audio(_data: &[u8]) -> Result<TelephonyAudio, MediaError> {
    Ok(TelephonyAudio {
        frames: vec![[0xFF; FRAME_SAMPLES]; 2],
        duration_ms: 40,
    })
}

pub fn sample_provider(user_id: Uuid, secret_sealed: &str) -> TelephonyProvider {
    TelephonyProvider {
        id: Uuid::new_v4(),
        user_id,
        sip_gateway_address: "sip.example.com".to_string(),
        username: "alice".to_string(),
        secret_hash: "unused".to_string(),
        secret_sealed: secret_sealed.to_string(),
        created_at: Utc::now(),
    }
}

pub fn sample_audio_file(user_id: Uuid) -> AudioFile {
    let id = Uuid::new_v4();
    AudioFile {
        id,
        user_id,
        name: "greeting".to_string(),
        original_filename: "greeting.mp3".to_string(),
        storage_key: generate_storage_key(user_id, &format!("{}.mp3", id)),
        content_type: "audio/mpeg".to_string(),
        file_size: 9,
        duration_ms: Some(40),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
struct StoreState {
    subscribers: Vec<Subscriber>,
    providers: Vec<TelephonyProvider>,
    audio_files: Vec<AudioFile>,
    settings: HashMap<Uuid, CampaignSettings>,
}

/// Implements every store trait over plain vectors.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn add_subscribers(&self, user_id: Uuid, numbers: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for number in numbers {
            state.subscribers.push(Subscriber {
                id: Uuid::new_v4(),
                user_id,
                phone_number: number.to_string(),
                created_at: Utc::now(),
            });
        }
    }

    pub fn numbers(&self, user_id: Uuid) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.phone_number.clone())
            .collect()
    }

    pub fn add_provider(&self, provider: TelephonyProvider) -> TelephonyProvider {
        self.state.lock().unwrap().providers.push(provider.clone());
        provider
    }

    pub fn add_audio_file(&self, audio_file: AudioFile) -> AudioFile {
        self.state
            .lock()
            .unwrap()
            .audio_files
            .push(audio_file.clone());
        audio_file
    }

    pub fn set_settings(&self, user_id: Uuid, provider_id: Uuid, audio_file_id: Uuid) {
        let now = Utc::now();
        self.state.lock().unwrap().settings.insert(
            user_id,
            CampaignSettings {
                id: Uuid::new_v4(),
                user_id,
                provider_id,
                audio_file_id,
                created_at: now,
                updated_at: now,
            },
        );
    }
}

#[async_trait]
impl SubscriberStore for InMemoryStore {
    async fn subscribers_for_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn replace_subscribers(
        &self,
        user_id: Uuid,
        phone_numbers: Vec<String>,
        clear: bool,
    ) -> Result<IngestReport, AppError> {
        let mut state = self.state.lock().unwrap();
        let mut cleared = 0u64;
        if clear {
            let before = state.subscribers.len();
            state.subscribers.retain(|s| s.user_id != user_id);
            cleared = (before - state.subscribers.len()) as u64;
        }
        let inserted = phone_numbers.len();
        for phone_number in phone_numbers {
            state.subscribers.push(Subscriber {
                id: Uuid::new_v4(),
                user_id,
                phone_number,
                created_at: Utc::now(),
            });
        }
        Ok(IngestReport { inserted, cleared })
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn settings_for_user(&self, user_id: Uuid) -> Result<Option<CampaignSettings>, AppError> {
        Ok(self.state.lock().unwrap().settings.get(&user_id).cloned())
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
        audio_file_id: Uuid,
    ) -> Result<CampaignSettings, AppError> {
        {
            let state = self.state.lock().unwrap();
            let owns_provider = state
                .providers
                .iter()
                .any(|p| p.id == provider_id && p.user_id == user_id);
            let owns_audio = state
                .audio_files
                .iter()
                .any(|a| a.id == audio_file_id && a.user_id == user_id);
            if !owns_provider || !owns_audio {
                return Err(AppError::NotFound(
                    "Provider or audio file not found".to_string(),
                ));
            }
        }
        self.set_settings(user_id, provider_id, audio_file_id);
        self.state
            .lock()
            .unwrap()
            .settings
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::Internal("settings vanished".to_string()))
    }
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn find_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TelephonyProvider>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .providers
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn latest_provider(&self, user_id: Uuid) -> Result<Option<TelephonyProvider>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .providers
            .iter()
            .rev()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl AudioFileStore for InMemoryStore {
    async fn find_audio_file(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AudioFile>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .audio_files
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn latest_audio_file(&self, user_id: Uuid) -> Result<Option<AudioFile>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .audio_files
            .iter()
            .rev()
            .find(|a| a.user_id == user_id)
            .cloned())
    }
}

/// Object storage over a HashMap.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn put(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        user_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let key = generate_storage_key(user_id, filename);
        self.put(&key, data);
        Ok(key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }
}

/// How one scripted softphone behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhoneScript {
    #[default]
    Answer,
    StartFails,
    NoAnswer,
    PlayFails,
}

#[derive(Default)]
struct PhoneLog {
    built: usize,
    events: Vec<&'static str>,
    params: Vec<PhoneParams>,
    scripts: HashMap<usize, PhoneScript>,
}

/// Builds softphones whose behaviour is scripted per attempt (0-based build order)
/// and records every operation.
#[derive(Default)]
pub struct ScriptedPhoneFactory {
    log: Arc<Mutex<PhoneLog>>,
}

impl ScriptedPhoneFactory {
    pub fn script(&self, attempt: usize, script: PhoneScript) {
        self.log.lock().unwrap().scripts.insert(attempt, script);
    }

    pub fn built(&self) -> usize {
        self.log.lock().unwrap().built
    }

    pub fn calls_of(&self, operation: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| **e == operation)
            .count()
    }

    pub fn last_params(&self) -> Option<PhoneParams> {
        self.log.lock().unwrap().params.last().cloned()
    }
}

impl PhoneFactory for ScriptedPhoneFactory {
    fn build(&self, params: PhoneParams) -> Box<dyn Softphone> {
        let mut log = self.log.lock().unwrap();
        let script = log.scripts.get(&log.built).copied().unwrap_or_default();
        log.built += 1;
        log.params.push(params);
        Box::new(ScriptedPhone {
            script,
            log: self.log.clone(),
        })
    }
}

struct ScriptedPhone {
    script: PhoneScript,
    log: Arc<Mutex<PhoneLog>>,
}

impl ScriptedPhone {
    fn record(&self, event: &'static str) {
        self.log.lock().unwrap().events.push(event);
    }
}

#[async_trait]
impl Softphone for ScriptedPhone {
    async fn start(&mut self) -> Result<(), SipError> {
        self.record("start");
        if self.script == PhoneScript::StartFails {
            return Err(SipError::Timeout("REGISTER response".to_string()));
        }
        Ok(())
    }

    async fn call(&mut self, number: &str) -> Result<Option<CallHandle>, SipError> {
        self.record("call");
        if self.script == PhoneScript::NoAnswer {
            return Ok(None);
        }
        Ok(Some(CallHandle {
            call_id: Uuid::new_v4(),
            number: number.to_string(),
        }))
    }

    async fn play(
        &mut self,
        _call: &CallHandle,
        frames: &[[u8; PCMU_FRAME_BYTES]],
    ) -> Result<(), SipError> {
        self.record("play");
        if self.script == PhoneScript::PlayFails || frames.is_empty() {
            return Err(SipError::Media("RTP socket closed".to_string()));
        }
        Ok(())
    }

    async fn hangup(&mut self, _call: CallHandle) -> Result<(), SipError> {
        self.record("hangup");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SipError> {
        self.record("stop");
        Ok(())
    }
}
