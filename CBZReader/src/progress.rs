//! Progress synchronisation
//!
//! Progress is written when the reader is torn down, not on every page turn.
//! Only volumes that belong to a library series have somewhere to go; an ad
//! hoc file without a series id is silently skipped.

use serde::{Deserialize, Serialize};

use crate::session::ReadingSession;
use crate::utils::error::Result;

/// Position to persist for one volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub series_id: String,
    pub volume_id: String,
    pub page: usize,
    pub total_pages: usize,
}

impl ProgressSnapshot {
    pub fn last_session(&self) -> LastSession {
        LastSession {
            series_id: self.series_id.clone(),
            volume_id: self.volume_id.clone(),
            page: self.page,
        }
    }
}

/// Stored progress record for one volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProgress {
    pub last_read_page: usize,
    pub total_pages: usize,
    /// Unix seconds
    pub last_read_date: u64,
}

/// The volume the user was reading most recently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSession {
    pub series_id: String,
    pub volume_id: String,
    pub page: usize,
}

/// Storage collaborator for reading progress
pub trait ProgressStore {
    fn persist_progress(&mut self, snapshot: &ProgressSnapshot) -> Result<()>;

    fn load_progress(&self, series_id: &str, volume_id: &str) -> Result<Option<usize>>;

    fn save_last_session(&mut self, session: &LastSession) -> Result<()>;

    fn last_session(&self) -> Result<Option<LastSession>>;
}

/// Progress tuple for `session`, or `None` when it is not a library volume
pub fn snapshot(session: &ReadingSession) -> Option<ProgressSnapshot> {
    let series_id = session.series_id()?;
    let volume_id = session.volume_id()?;

    Some(ProgressSnapshot {
        series_id: series_id.to_string(),
        volume_id: volume_id.to_string(),
        page: session.current_page(),
        total_pages: session.total_pages(),
    })
}

/// Write a snapshot and mark it as the last session
pub fn persist_snapshot<S: ProgressStore + ?Sized>(
    store: &mut S,
    snapshot: &ProgressSnapshot,
) -> Result<()> {
    store.persist_progress(snapshot)?;
    store.save_last_session(&snapshot.last_session())?;

    tracing::info!(
        "Saved progress for {}/{}: page {} of {}",
        snapshot.series_id,
        snapshot.volume_id,
        snapshot.page + 1,
        snapshot.total_pages
    );
    Ok(())
}

/// Move `session` to its saved page, if one exists
///
/// A saved page of 0 is treated as "never read". The page goes through the
/// clamping `go_to_page`, so a stale record cannot escape the volume.
pub fn restore_position<S: ProgressStore + ?Sized>(
    session: &mut ReadingSession,
    store: &S,
) -> Result<Option<usize>> {
    let (Some(series_id), Some(volume_id)) = (session.series_id(), session.volume_id()) else {
        return Ok(None);
    };
    let (series_id, volume_id) = (series_id.to_string(), volume_id.to_string());

    match store.load_progress(&series_id, &volume_id)? {
        Some(page) if page > 0 => {
            session.go_to_page(page as i64);
            tracing::debug!("Restored {}/{} to page {}", series_id, volume_id, page);
            Ok(Some(session.current_page()))
        }
        _ => Ok(None),
    }
}
