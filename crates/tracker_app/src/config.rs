use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracker_engine::{BackendSettings, ControllerSettings, HANDOFF_DELAY, POLL_INTERVAL};
use tracker_logging::{tracker_info, tracker_warn};
use url::Url;

pub const CONFIG_FILENAME: &str = "tracker.ron";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CACHE_DIR: &str = ".tracker_cache";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub handoff_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            handoff_delay_ms: HANDOFF_DELAY.as_millis() as u64,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        Url::parse(self.base_url.trim())
            .with_context(|| format!("invalid base url `{}`", self.base_url))
    }

    pub fn backend_settings(&self, base_url: Url) -> BackendSettings {
        BackendSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..BackendSettings::new(base_url)
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            handoff_delay: Duration::from_millis(self.handoff_delay_ms),
        }
    }
}

/// Loads `explicit` strictly, or `./tracker.ron` leniently when no path is given.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => read(path),
        None => Ok(load_or_default(Path::new(CONFIG_FILENAME))),
    }
}

fn read(path: &Path) -> anyhow::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracker_info!("Loaded config from {:?}", path);
    Ok(config)
}

pub(crate) fn load_or_default(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            tracker_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            tracker_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            tracker_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
