//! Storage collaborators
//!
//! Ready-made [`ProgressStore`] + [`SettingsStore`] implementations: an
//! in-memory one for tests and ad hoc use, and a JSON document on disk.
//!
//! [`ProgressStore`]: crate::progress::ProgressStore
//! [`SettingsStore`]: crate::settings::SettingsStore

mod json_file;
mod memory;

pub use json_file::{default_state_path, JsonFileStore, STATE_PATH_ENV};
pub use memory::MemoryStore;

use std::time::SystemTime;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
