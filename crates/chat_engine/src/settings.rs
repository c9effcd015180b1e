use std::time::Duration;

use url::Url;

/// How to reach the backend.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Raw `Cookie` header value carrying the backend's login session.
    pub session_cookie: Option<String>,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            session_cookie: None,
        }
    }
}

/// Cadences and ceilings of the polling loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub status_interval: Duration,
    /// Status loop gives up after this long, leaving the last panel as final.
    pub status_ceiling: Duration,
    pub critic_interval: Duration,
    pub critic_ceiling: Duration,
    pub score_refresh_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(700),
            status_ceiling: Duration::from_secs(180),
            critic_interval: Duration::from_millis(2000),
            critic_ceiling: Duration::from_secs(120),
            score_refresh_interval: Duration::from_millis(5000),
        }
    }
}
