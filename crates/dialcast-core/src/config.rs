//! Configuration module
//!
//! This module provides configuration structures for the API server, the audio store
//! and the outbound calling stack. Values come from the environment (optionally via a
//! `.env` file) and are checked once at startup.

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::DEFAULT_SIP_PORT;

// Common constants
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const TOKEN_TTL_HOURS: i64 = 24;
const MAX_AUDIO_SIZE_MB: usize = 20;
const SIP_TRANSACTION_TIMEOUT_SECS: u64 = 32;
const CALL_ANSWER_TIMEOUT_SECS: u64 = 60;
const CALL_PLAYBACK_TIMEOUT_SECS: u64 = 600;

/// Base configuration for the HTTP server and database
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub token_ttl_hours: i64,
    pub environment: String,
    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` headers are believed.
    pub trusted_proxies: Vec<IpAddr>,
}

/// Outbound calling parameters handed to the softphone for every attempt.
#[derive(Clone, Debug)]
pub struct CallConfig {
    /// Remote SIP port on the provider gateway.
    pub sip_port: u16,
    /// Local UDP port for signalling; 0 picks an ephemeral port.
    pub sip_local_port: u16,
    /// Local UDP port for RTP; 0 picks an ephemeral port.
    pub rtp_local_port: u16,
    pub transaction_timeout: Duration,
    pub answer_timeout: Duration,
    pub playback_timeout: Duration,
    pub user_agent: String,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            sip_port: DEFAULT_SIP_PORT,
            sip_local_port: 0,
            rtp_local_port: 0,
            transaction_timeout: Duration::from_secs(SIP_TRANSACTION_TIMEOUT_SECS),
            answer_timeout: Duration::from_secs(CALL_ANSWER_TIMEOUT_SECS),
            playback_timeout: Duration::from_secs(CALL_PLAYBACK_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

/// Comma-separated IP list; blank means no proxy is trusted.
fn parse_trusted_proxies(value: &str) -> Result<Vec<IpAddr>, anyhow::Error> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|_| anyhow::anyhow!("TRUSTED_PROXIES entry '{}' is not an IP address", s))
        })
        .collect()
}

fn default_user_agent() -> String {
    format!("dialcast/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Clone, Debug)]
pub struct DialcastConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub local_storage_path: String,
    pub max_audio_size_bytes: usize,
    /// Base64-encoded 32-byte key used to seal provider secrets.
    pub secret_encryption_key: String,
    pub call: CallConfig,
}

/// Application configuration shared through the API state.
#[derive(Clone, Debug)]
pub struct Config(pub Box<DialcastConfig>);

impl Config {
    fn inner(&self) -> &DialcastConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = DialcastConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn token_ttl_hours(&self) -> i64 {
        self.inner().base.token_ttl_hours
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.inner().base.trusted_proxies
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn max_audio_size_bytes(&self) -> usize {
        self.inner().max_audio_size_bytes
    }

    pub fn secret_encryption_key(&self) -> &str {
        &self.inner().secret_encryption_key
    }

    pub fn call(&self) -> &CallConfig {
        &self.inner().call
    }
}

impl DialcastConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let trusted_proxies = parse_trusted_proxies(
            &env::var("TRUSTED_PROXIES").unwrap_or_default(),
        )?;

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| TOKEN_TTL_HOURS.to_string())
                .parse()
                .unwrap_or(TOKEN_TTL_HOURS),
            environment,
            trusted_proxies,
        };

        let max_audio_size_mb = env::var("MAX_AUDIO_SIZE_MB")
            .unwrap_or_else(|_| MAX_AUDIO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_AUDIO_SIZE_MB);

        let call = CallConfig {
            sip_port: env::var("SIP_PORT")
                .unwrap_or_else(|_| DEFAULT_SIP_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIP_PORT must be a valid port number"))?,
            sip_local_port: env::var("SIP_LOCAL_PORT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIP_LOCAL_PORT must be a valid port number"))?,
            rtp_local_port: env::var("RTP_LOCAL_PORT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RTP_LOCAL_PORT must be a valid port number"))?,
            transaction_timeout: Duration::from_secs(
                env::var("SIP_TRANSACTION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(SIP_TRANSACTION_TIMEOUT_SECS),
            ),
            answer_timeout: Duration::from_secs(
                env::var("CALL_ANSWER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(CALL_ANSWER_TIMEOUT_SECS),
            ),
            playback_timeout: Duration::from_secs(
                env::var("CALL_PLAYBACK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(CALL_PLAYBACK_TIMEOUT_SECS),
            ),
            user_agent: env::var("SIP_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        };

        let config = Self {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/audio".to_string()),
            max_audio_size_bytes: max_audio_size_mb * 1024 * 1024,
            secret_encryption_key: env::var("SECRET_ENCRYPTION_KEY").map_err(|_| {
                anyhow::anyhow!("SECRET_ENCRYPTION_KEY must be set to seal provider secrets")
            })?,
            call,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.local_storage_path.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH must not be empty"));
        }

        if self.max_audio_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_AUDIO_SIZE_MB must be greater than 0"));
        }

        if self.base.token_ttl_hours <= 0 {
            return Err(anyhow::anyhow!("TOKEN_TTL_HOURS must be greater than 0"));
        }

        if self.call.sip_port == 0 {
            return Err(anyhow::anyhow!("SIP_PORT must not be 0"));
        }

        if self.call.transaction_timeout.is_zero() || self.call.answer_timeout.is_zero() {
            return Err(anyhow::anyhow!("SIP timeouts must be greater than 0"));
        }

        crate::encryption::SecretSealer::from_base64_key(&self.secret_encryption_key)
            .map_err(|e| anyhow::anyhow!("SECRET_ENCRYPTION_KEY is invalid: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DialcastConfig {
        DialcastConfig {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 30,
                token_ttl_hours: 24,
                environment: "development".to_string(),
                trusted_proxies: Vec::new(),
            },
            database_url: "postgresql://localhost/dialcast".to_string(),
            local_storage_path: "./data/audio".to_string(),
            max_audio_size_bytes: 1024,
            // base64 of 32 ASCII bytes
            secret_encryption_key: "MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTIzNDU2Nzg5MDE=".to_string(),
            call: CallConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = sample();
        config.database_url = "mysql://localhost/dialcast".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_short_encryption_key() {
        let mut config = sample();
        config.secret_encryption_key = "c2hvcnQ=".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_call_defaults_use_standard_sip_port() {
        let call = CallConfig::default();
        assert_eq!(call.sip_port, 5060);
        assert_eq!(call.sip_local_port, 0);
        assert!(call.user_agent.starts_with("dialcast/"));
    }

    #[test]
    fn test_trusted_proxies_parsing() {
        assert!(parse_trusted_proxies("").unwrap().is_empty());
        let proxies = parse_trusted_proxies(" 10.0.0.1, ::1 ,").unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0], "10.0.0.1".parse::<IpAddr>().unwrap());
        assert!(parse_trusted_proxies("10.0.0.1,proxy.local").is_err());
    }

    #[test]
    fn test_is_production() {
        let mut inner = sample();
        inner.base.environment = "Production".to_string();
        assert!(Config(Box::new(inner)).is_production());
        assert!(!Config(Box::new(sample())).is_production());
    }
}
