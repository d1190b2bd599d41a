use std::env;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 30;

/// Options the host hands to one coordinator instance: the application
/// client id, the user-selected channel ids to track, and the polling
/// cadence. OAuth2 tokens themselves stay with the host's token
/// machinery (see `AccessTokenProvider`).
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationOptions {
    pub client_id: String,
    /// Fixed, user-selected list of channel ids to track. May include
    /// the authenticated user's own id.
    pub channel_ids: Vec<String>,
    /// Seconds between update cycles.
    pub poll_interval_seconds: u64,
    /// Wall-clock bound on one whole update cycle.
    pub cycle_timeout_seconds: u64,
}

impl IntegrationOptions {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(IntegrationOptions {
            client_id: env::var("TWITCH_CLIENT_ID")
                .map_err(|_| ConfigError::MissingEnv("TWITCH_CLIENT_ID".to_string()))?,
            channel_ids: parse_channel_list(
                &env::var("TWITCH_CHANNELS")
                    .map_err(|_| ConfigError::MissingEnv("TWITCH_CHANNELS".to_string()))?,
            ),
            poll_interval_seconds: env::var("TWITCH_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TWITCH_POLL_INTERVAL_SECS".to_string()))?,
            cycle_timeout_seconds: env::var("TWITCH_CYCLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_CYCLE_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TWITCH_CYCLE_TIMEOUT_SECS".to_string()))?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_seconds)
    }
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        IntegrationOptions {
            client_id: String::new(),
            channel_ids: Vec::new(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            cycle_timeout_seconds: DEFAULT_CYCLE_TIMEOUT_SECS,
        }
    }
}

/// Split a comma-separated channel list, trimming whitespace and
/// dropping empty entries.
fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
