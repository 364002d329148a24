//! Dialcast media library
//!
//! Upload validation for audio messages and the decode pipeline that turns an MP3
//! into 8 kHz G.711 µ-law frames ready for RTP.

pub mod audio;
pub mod validator;

pub use audio::{
    decode_mp3, encode_frames, prepare_for_telephony, resample_linear, MediaError, PcmAudio, TelephonyAudio, FRAME_SAMPLES, TELEPHONY_SAMPLE_RATE,
};
pub use validator::{MediaValidator, ValidationError};
