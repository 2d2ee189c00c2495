use std::sync::Arc;

use thiserror::Error;
use tracker_core::{prepend_capped, RecentEntry};
use tracker_logging::{tracker_debug, tracker_warn};

use crate::persist::{KeyValueStore, PersistError};
use crate::AnalysisBackend;

/// Key of the local recent-analyses cache.
pub const RECENT_STORAGE_KEY: &str = "recent_analyses";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Recent analyses: remote list first, local cache as fallback.
#[derive(Clone)]
pub struct RecentHistoryStore {
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<dyn KeyValueStore>,
}

impl RecentHistoryStore {
    pub fn new(backend: Arc<dyn AnalysisBackend>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { backend, store }
    }

    pub async fn load(&self) -> Vec<RecentEntry> {
        match self.backend.recent_analyses().await {
            Ok(entries) => entries,
            Err(err) => {
                tracker_warn!("Remote history unavailable, using local cache: {}", err);
                self.cached()
            }
        }
    }

    /// Local cache contents; empty when missing or unreadable.
    pub fn cached(&self) -> Vec<RecentEntry> {
        let raw = match self.store.get(RECENT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracker_warn!("Failed to read history cache: {}", err);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracker_warn!("Discarding unreadable history cache: {}", err);
                Vec::new()
            }
        }
    }

    /// Prepends `entry` to the local cache, keeps the newest entries, and persists.
    pub fn record(&self, entry: RecentEntry) -> Result<Vec<RecentEntry>, HistoryError> {
        let id = entry.id.clone();
        let entries = prepend_capped(self.cached(), entry);
        let encoded = serde_json::to_string(&entries)?;
        self.store.set(RECENT_STORAGE_KEY, &encoded)?;
        tracker_debug!("Recorded history entry id={} size={}", id, entries.len());
        Ok(entries)
    }
}
