//! Durable location storage
//!
//! Keeps the last resolved place and the filter flag under a namespaced
//! directory (~/.cache/placefinder/ by default), one file per key.

use crate::config::StorageConfig;
use crate::constants::storage::{FILTER_ENABLED_KEY, LOCATION_KEY};
use crate::error::Result;
use crate::place::Place;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Location storage
#[derive(Debug, Clone)]
pub struct LocationCache {
    dir: Option<PathBuf>,
}

/// Stored place entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPlace {
    pub place: Place,
    pub saved_at: DateTime<Utc>,
}

impl LocationCache {
    /// Create a cache from storage settings
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: config.storage_dir(),
        }
    }

    /// Create a cache in a specific directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Create a cache that persists nothing
    pub fn without_storage() -> Self {
        Self { dir: None }
    }

    fn key_path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(key))
    }

    /// Load the stored place
    ///
    /// Missing, unreadable, corrupt and invalid entries all load as None.
    pub fn load(&self) -> Option<Place> {
        self.load_entry().map(|entry| entry.place)
    }

    /// Load the stored place along with when it was saved
    pub fn load_entry(&self) -> Option<CachedPlace> {
        let path = self.key_path(LOCATION_KEY)?;
        let content = fs::read_to_string(&path).ok()?;

        let entry: CachedPlace = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring corrupt location entry {}: {}", path.display(), e);
                return None;
            }
        };

        if entry.place.is_valid() {
            Some(entry)
        } else {
            warn!("Ignoring invalid location entry {}", path.display());
            None
        }
    }

    /// Load the filter flag; anything but a stored `true` is off
    pub fn load_filter_enabled(&self) -> bool {
        self.key_path(FILTER_ENABLED_KEY)
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|s| s.trim() == "true")
            .unwrap_or(false)
    }

    /// Persist the place and the filter flag
    pub fn save(&self, place: &Place, filter_enabled: bool) -> Result<()> {
        let Some(path) = self.key_path(LOCATION_KEY) else {
            return Ok(());
        };

        let entry = CachedPlace {
            place: place.clone(),
            saved_at: Utc::now(),
        };
        write_atomic(&path, &serde_json::to_string_pretty(&entry)?)?;
        self.save_filter_enabled(filter_enabled)
    }

    /// Persist only the filter flag
    pub fn save_filter_enabled(&self, enabled: bool) -> Result<()> {
        match self.key_path(FILTER_ENABLED_KEY) {
            Some(path) => write_atomic(&path, if enabled { "true" } else { "false" }),
            None => Ok(()),
        }
    }

    /// Remove the stored place (the filter flag is kept)
    pub fn clear(&self) -> Result<()> {
        let Some(path) = self.key_path(LOCATION_KEY) else {
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Cleared location entry {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write through a temporary file so readers never see a half-written entry
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
