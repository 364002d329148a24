//! Shared constants

/// Standard SIP signalling port used when dialing a provider.
pub const DEFAULT_SIP_PORT: u16 = 5060;

/// Non-routable address used to discover the outbound interface.
/// Nothing is ever sent to it.
pub const LOCAL_IP_PROBE_ADDR: &str = "10.255.255.255:1";

pub const FALLBACK_LOCAL_IP: &str = "127.0.0.1";

/// Column every subscriber upload must carry.
pub const PHONE_NUMBER_COLUMN: &str = "phone_number";

pub const AUDIO_ALLOWED_EXTENSIONS: &[&str] = &["mp3"];
pub const AUDIO_ALLOWED_CONTENT_TYPES: &[&str] = &["audio/mpeg", "audio/mp3", "audio/mpeg3"];
pub const SUBSCRIBER_ALLOWED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Length of the token prefix stored in clear for lookup.
pub const TOKEN_PREFIX_LEN: usize = 16;

/// Storage key prefix for uploaded audio artifacts.
pub const AUDIO_KEY_PREFIX: &str = "audio";
