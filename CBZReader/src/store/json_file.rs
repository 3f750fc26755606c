//! JSON-document store on the local filesystem
//!
//! One file holds preferences, per-volume progress and the last session.
//! A missing or unreadable document starts out empty instead of failing;
//! write errors are returned to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::unix_now;
use crate::progress::{LastSession, ProgressSnapshot, ProgressStore, VolumeProgress};
use crate::settings::{ReaderPreferences, SettingsStore};
use crate::utils::error::{CbzError, Result};

/// Environment variable overriding the state file location
pub const STATE_PATH_ENV: &str = "CBZREADER_STATE_PATH";

const STATE_FILENAME: &str = "cbzreader_state.json";

/// `$CBZREADER_STATE_PATH`, else `cbzreader_state.json` in the temp dir
pub fn default_state_path() -> PathBuf {
    if let Some(custom_path) = std::env::var_os(STATE_PATH_ENV) {
        return PathBuf::from(custom_path);
    }

    std::env::temp_dir().join(STATE_FILENAME)
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StateDocument {
    preferences: Option<ReaderPreferences>,
    /// series id -> volume id -> progress
    progress: BTreeMap<String, BTreeMap<String, VolumeProgress>>,
    last_session: Option<LastSession>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: StateDocument,
}

impl JsonFileStore {
    /// Open the store at `path`, loading whatever is already there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable state file {:?}: {}", path, e);
                StateDocument::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateDocument::default(),
            Err(e) => {
                tracing::warn!("Failed to read state file {:?}: {}", path, e);
                StateDocument::default()
            }
        };

        Self { path, document }
    }

    pub fn open_default() -> Self {
        Self::open(default_state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let text = serde_json::to_string_pretty(&self.document)?;
        std::fs::write(&self.path, text).map_err(|e| {
            CbzError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!("State written to {:?}", self.path);
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn persist_progress(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.document
            .progress
            .entry(snapshot.series_id.clone())
            .or_default()
            .insert(
                snapshot.volume_id.clone(),
                VolumeProgress {
                    last_read_page: snapshot.page,
                    total_pages: snapshot.total_pages,
                    last_read_date: unix_now(),
                },
            );
        self.flush()
    }

    fn load_progress(&self, series_id: &str, volume_id: &str) -> Result<Option<usize>> {
        Ok(self
            .document
            .progress
            .get(series_id)
            .and_then(|volumes| volumes.get(volume_id))
            .map(|p| p.last_read_page))
    }

    fn save_last_session(&mut self, session: &LastSession) -> Result<()> {
        self.document.last_session = Some(session.clone());
        self.flush()
    }

    fn last_session(&self) -> Result<Option<LastSession>> {
        Ok(self.document.last_session.clone())
    }
}

impl SettingsStore for JsonFileStore {
    fn save_reader_preferences(&mut self, preferences: &ReaderPreferences) -> Result<()> {
        self.document.preferences = Some(preferences.clone());
        self.flush()
    }

    fn load_reader_preferences(&self) -> Result<Option<ReaderPreferences>> {
        Ok(self.document.preferences.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ReadingMode;
    use tempfile::TempDir;

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");

        {
            let mut store = JsonFileStore::open(&path);
            store
                .persist_progress(&ProgressSnapshot {
                    series_id: "berserk".to_string(),
                    volume_id: "v01".to_string(),
                    page: 42,
                    total_pages: 220,
                })
                .unwrap();
            store
                .save_reader_preferences(&ReaderPreferences {
                    reading_mode: Some(ReadingMode::TwoPage),
                    ..Default::default()
                })
                .unwrap();
        }

        let store = JsonFileStore::open(&path);
        assert_eq!(store.load_progress("berserk", "v01").unwrap(), Some(42));
        assert_eq!(
            store
                .load_reader_preferences()
                .unwrap()
                .unwrap()
                .reading_mode,
            Some(ReadingMode::TwoPage)
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("absent.json"));
        assert_eq!(store.load_progress("a", "b").unwrap(), None);
        assert_eq!(store.last_session().unwrap(), None);
        assert_eq!(store.load_reader_preferences().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.last_session().unwrap(), None);

        let session = LastSession {
            series_id: "s".to_string(),
            volume_id: "v".to_string(),
            page: 1,
        };
        store.save_last_session(&session).unwrap();
        assert_eq!(
            JsonFileStore::open(&path).last_session().unwrap(),
            Some(session)
        );
    }
}
