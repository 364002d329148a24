//! Audio processing module

pub mod decode;
pub mod g711;
pub mod resample;

pub use decode::{decode_mp3, PcmAudio};
pub use g711::{encode_frames, FRAME_SAMPLES, MU_LAW_SILENCE};
pub use resample::resample_linear;

use dialcast_core::AppError;

/// G.711 sample rate.
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Unsupported audio: {0}")]
    Unsupported(String),

    #[error("Audio decode failed: {0}")]
    Decode(String),

    #[error("Audio contains no samples")]
    Empty,
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::MediaProcessing(err.to_string())
    }
}

/// Audio ready to stream on a PCMU channel.
#[derive(Debug, Clone)]
pub struct TelephonyAudio {
    /// 20 ms µ-law frames.
    pub frames: Vec<[u8; FRAME_SAMPLES]>,
    pub duration_ms: u64,
}

/// Decode an MP3 and convert it to 8 kHz µ-law frames.
pub fn prepare_for_telephony(data: &[u8]) -> Result<TelephonyAudio, MediaError> {
    let pcm = decode_mp3(data)?;
    let narrowband = resample_linear(&pcm.samples, pcm.sample_rate, TELEPHONY_SAMPLE_RATE);
    let frames = encode_frames(&narrowband);

    tracing::debug!(
        source_rate = pcm.sample_rate,
        source_samples = pcm.samples.len(),
        frames = frames.len(),
        "Prepared audio for telephony"
    );

    Ok(TelephonyAudio {
        duration_ms: frames.len() as u64 * 20,
        frames,
    })
}
