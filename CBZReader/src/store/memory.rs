use std::collections::HashMap;

use super::unix_now;
use crate::progress::{LastSession, ProgressSnapshot, ProgressStore, VolumeProgress};
use crate::settings::{ReaderPreferences, SettingsStore};
use crate::utils::error::Result;

/// Volatile store; everything is lost when it is dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    preferences: Option<ReaderPreferences>,
    progress: HashMap<(String, String), VolumeProgress>,
    last_session: Option<LastSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume_progress(&self, series_id: &str, volume_id: &str) -> Option<&VolumeProgress> {
        self.progress
            .get(&(series_id.to_string(), volume_id.to_string()))
    }
}

impl ProgressStore for MemoryStore {
    fn persist_progress(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.progress.insert(
            (snapshot.series_id.clone(), snapshot.volume_id.clone()),
            VolumeProgress {
                last_read_page: snapshot.page,
                total_pages: snapshot.total_pages,
                last_read_date: unix_now(),
            },
        );
        Ok(())
    }

    fn load_progress(&self, series_id: &str, volume_id: &str) -> Result<Option<usize>> {
        Ok(self
            .volume_progress(series_id, volume_id)
            .map(|p| p.last_read_page))
    }

    fn save_last_session(&mut self, session: &LastSession) -> Result<()> {
        self.last_session = Some(session.clone());
        Ok(())
    }

    fn last_session(&self) -> Result<Option<LastSession>> {
        Ok(self.last_session.clone())
    }
}

impl SettingsStore for MemoryStore {
    fn save_reader_preferences(&mut self, preferences: &ReaderPreferences) -> Result<()> {
        self.preferences = Some(preferences.clone());
        Ok(())
    }

    fn load_reader_preferences(&self) -> Result<Option<ReaderPreferences>> {
        Ok(self.preferences.clone())
    }
}
