use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_engine::{ClientSettings, PollSettings};
use serde::{Deserialize, Serialize};
use url::Url;

use super::logging::{LogDestination, LogLevel};

pub const DEFAULT_CONFIG_FILE: &str = "chat_client.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid base_url '{url}': {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Client configuration as stored in the RON file. Durations are in
/// milliseconds; every field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub status_interval_ms: u64,
    pub status_ceiling_ms: u64,
    pub critic_interval_ms: u64,
    pub critic_ceiling_ms: u64,
    pub score_refresh_interval_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        let poll = PollSettings::default();
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            session_cookie: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            status_interval_ms: millis(poll.status_interval),
            status_ceiling_ms: millis(poll.status_ceiling),
            critic_interval_ms: millis(poll.critic_interval),
            critic_ceiling_ms: millis(poll.critic_ceiling),
            score_refresh_interval_ms: millis(poll.score_refresh_interval),
            log_destination: LogDestination::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        let mut settings = ClientSettings::new(base_url);
        settings.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        settings.request_timeout = Duration::from_millis(self.request_timeout_ms);
        settings.session_cookie = self
            .session_cookie
            .clone()
            .filter(|cookie| !cookie.trim().is_empty());
        Ok(settings)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            status_interval: Duration::from_millis(self.status_interval_ms),
            status_ceiling: Duration::from_millis(self.status_ceiling_ms),
            critic_interval: Duration::from_millis(self.critic_interval_ms),
            critic_ceiling: Duration::from_millis(self.critic_ceiling_ms),
            score_refresh_interval: Duration::from_millis(self.score_refresh_interval_ms),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
