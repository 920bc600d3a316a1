use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::api::ApiConfig;
use crate::application::TrackerConfig;

pub const ENV_BASE_URL: &str = "CLASSROOM_DL_BASE_URL";
pub const ENV_SESSION: &str = "CLASSROOM_DL_SESSION";
pub const ENV_DOWNLOAD_DIR: &str = "CLASSROOM_DL_DOWNLOAD_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "CLASSROOM_DL_POLL_INTERVAL_MS";
pub const ENV_AUTO_CLEAR_MS: &str = "CLASSROOM_DL_AUTO_CLEAR_MS";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub tracker: TrackerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` provides. Bad values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BASE_URL) {
            match Url::parse(raw.trim()) {
                Ok(url) if !url.cannot_be_a_base() => config.api.base_url = url,
                Ok(_) => tracing::warn!(key = ENV_BASE_URL, value = %raw, "Base URL cannot hold paths, using default"),
                Err(e) => tracing::warn!(key = ENV_BASE_URL, value = %raw, error = %e, "Invalid base URL, using default"),
            }
        }

        if let Some(session) = lookup(ENV_SESSION).filter(|s| !s.trim().is_empty()) {
            config.api.session_cookie = Some(session.trim().to_string());
        }

        if let Some(dir) = lookup(ENV_DOWNLOAD_DIR).filter(|s| !s.trim().is_empty()) {
            config.api.download_dir = PathBuf::from(dir.trim());
        }

        if let Some(interval) = millis(&lookup, ENV_POLL_INTERVAL_MS) {
            config.tracker.poll_interval = interval;
        }
        if let Some(delay) = millis(&lookup, ENV_AUTO_CLEAR_MS) {
            config.tracker.auto_clear_delay = delay;
        }

        config
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!(key = key, "Duration must be positive, using default");
            None
        }
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            tracing::warn!(key = key, value = %raw, error = %e, "Invalid duration, using default");
            None
        }
    }
}
