//! Reader preferences
//!
//! View settings that follow the user from volume to volume. Stored as a
//! partial record: any field may be missing, and only present fields are
//! overlaid onto a freshly loaded session. Page position is not a
//! preference; it lives with per-volume progress.

use serde::{Deserialize, Serialize};

use crate::session::{ReadingDirection, ReadingMode, ReadingSession, ZoomMode};
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_mode: Option<ReadingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_direction: Option<ReadingDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_mode: Option<ZoomMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert_colors: Option<bool>,
}

impl ReaderPreferences {
    /// Capture the full set of view settings from a session
    pub fn from_session(session: &ReadingSession) -> Self {
        Self {
            reading_mode: Some(session.reading_mode()),
            reading_direction: Some(session.reading_direction()),
            zoom_mode: Some(session.zoom_mode()),
            zoom_level: Some(session.zoom_level()),
            invert_colors: Some(session.invert_colors()),
        }
    }

    /// Overlay the present fields onto `session`
    pub fn apply_to(&self, session: &mut ReadingSession) {
        if let Some(mode) = self.reading_mode {
            session.set_reading_mode(mode);
        }
        if let Some(direction) = self.reading_direction {
            session.set_reading_direction(direction);
        }
        if let Some(level) = self.zoom_level {
            session.set_zoom(level);
        }
        // After the level: set_zoom forces Custom
        if let Some(zoom_mode) = self.zoom_mode {
            session.set_zoom_mode(zoom_mode);
        }
        if let Some(invert) = self.invert_colors {
            session.set_invert_colors(invert);
        }
    }
}

/// Persists reader preferences between sessions
pub trait SettingsStore {
    fn save_reader_preferences(&mut self, preferences: &ReaderPreferences) -> Result<()>;

    fn load_reader_preferences(&self) -> Result<Option<ReaderPreferences>>;
}
