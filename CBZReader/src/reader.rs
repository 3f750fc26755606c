//! Reader context
//!
//! [`Reader`] is the explicit owner of one reading activity: the session,
//! the ticket issuer holding every page's display handle, the change
//! channel, and the bookkeeping that lets a newer load supersede an older
//! one. Construct one per reader view and [`close`](Reader::close) it when
//! the user leaves.

use crate::archive::{self, ArchiveSource};
use crate::page::{release_pages, DecodedPage, TicketIssuer};
use crate::progress::{self, ProgressSnapshot, ProgressStore};
use crate::session::events::{EventChannel, Subscription};
use crate::session::input::ReaderCommand;
use crate::session::{FullscreenRequest, ReadingDirection, ReadingMode, ReadingSession, ZoomMode};
use crate::settings::{ReaderPreferences, SettingsStore};
use crate::utils::error::Result;

/// Identity of a volume being loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub volume_id: String,
    pub volume_name: String,
    pub series_id: Option<String>,
}

impl VolumeInfo {
    /// A file opened outside the library; its name doubles as its id
    pub fn ad_hoc(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            volume_id: name.clone(),
            volume_name: name,
            series_id: None,
        }
    }

    pub fn in_series(
        series_id: impl Into<String>,
        volume_id: impl Into<String>,
        volume_name: impl Into<String>,
    ) -> Self {
        Self {
            volume_id: volume_id.into(),
            volume_name: volume_name.into(),
            series_id: Some(series_id.into()),
        }
    }
}

/// Marks one in-flight load; only the newest token may install pages
#[derive(Debug, PartialEq, Eq)]
pub struct LoadToken {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Pages installed; `released` tickets of the previous volume were revoked
    Installed { pages: usize, released: usize },
    /// The attempt failed and the message was recorded as `last_error`
    Failed(String),
    /// A newer load started first; this result was discarded
    Superseded,
}

/// Platform fullscreen API
///
/// Requests may be rejected or complete later. The reader never assumes
/// success; the platform reports the real state through
/// [`Reader::on_fullscreen_change`].
pub trait FullscreenPlatform {
    fn request(&mut self, request: FullscreenRequest) -> Result<()>;
}

pub struct Reader<I: TicketIssuer> {
    session: ReadingSession,
    issuer: I,
    events: EventChannel<ReadingSession>,
    generation: u64,
    pending: Option<u64>,
}

impl<I: TicketIssuer> Reader<I> {
    pub fn new(issuer: I) -> Self {
        Self {
            session: ReadingSession::new(),
            issuer,
            events: EventChannel::new(),
            generation: 0,
            pending: None,
        }
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Listen for state changes; the listener first sees the current state
    pub fn subscribe<F>(&mut self, mut listener: F) -> Subscription<ReadingSession>
    where
        F: FnMut(&ReadingSession) + 'static,
    {
        listener(&self.session);
        self.events.subscribe(listener)
    }

    /// Start a load, superseding any load still in flight
    pub fn begin_load(&mut self) -> LoadToken {
        self.generation += 1;
        if let Some(previous) = self.pending.replace(self.generation) {
            tracing::debug!("Load {} superseded by {}", previous, self.generation);
        }
        self.session.set_loading(true);
        self.publish();

        LoadToken {
            generation: self.generation,
        }
    }

    pub fn is_pending(&self, token: &LoadToken) -> bool {
        self.pending == Some(token.generation)
    }

    /// Complete a load started with [`begin_load`](Self::begin_load)
    ///
    /// Stale tokens are discarded untouched. On success the new pages get
    /// their tickets, replace the old ones, and the old tickets are revoked
    /// before anyone is notified. On failure the error lands in
    /// `last_error` and the current pages stay as they are.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        volume: VolumeInfo,
        result: Result<Vec<DecodedPage>>,
    ) -> LoadOutcome {
        if !self.is_pending(&token) {
            tracing::debug!(
                "Discarding result of superseded load {} ({})",
                token.generation,
                volume.volume_name
            );
            return LoadOutcome::Superseded;
        }
        self.pending = None;

        let outcome = match result {
            Ok(decoded) => {
                let pages: Vec<_> = decoded
                    .into_iter()
                    .map(|page| page.into_page(&mut self.issuer))
                    .collect();
                let count = pages.len();

                let displaced = self.session.load(
                    pages,
                    volume.volume_id,
                    volume.volume_name,
                    volume.series_id,
                );
                let released = release_pages(displaced, &mut self.issuer);

                tracing::info!("Loaded volume with {} pages", count);
                LoadOutcome::Installed {
                    pages: count,
                    released,
                }
            }
            Err(e) => {
                tracing::warn!("Error loading {}: {}", volume.volume_name, e);
                let message = e.user_message();
                self.session.set_error(message.clone());
                LoadOutcome::Failed(message)
            }
        };

        self.publish();
        outcome
    }

    /// Decode `archive_bytes` and install it as the current volume
    pub fn load_archive(&mut self, archive_bytes: &[u8], volume: VolumeInfo) -> LoadOutcome {
        let token = self.begin_load();
        let result = archive::extract_pages(archive_bytes);
        self.finish_load(token, volume, result)
    }

    /// Acquire bytes from `source`, then decode and install them
    ///
    /// Acquisition failures (permissions, missing files) are recorded the same
    /// way as decode failures.
    pub fn open_volume<S: ArchiveSource + ?Sized>(
        &mut self,
        source: &S,
        volume_id: Option<String>,
        series_id: Option<String>,
    ) -> LoadOutcome {
        let token = self.begin_load();
        let volume = VolumeInfo {
            volume_id: volume_id.unwrap_or_else(|| source.name().to_string()),
            volume_name: source.name().to_string(),
            series_id,
        };

        let result = source
            .read_bytes()
            .and_then(|bytes| archive::extract_pages(&bytes));
        self.finish_load(token, volume, result)
    }

    /// Overlay saved preferences and the saved page onto a fresh volume
    pub fn restore_saved_state<P, S>(&mut self, settings: &S, progress: &P) -> Result<()>
    where
        P: ProgressStore + ?Sized,
        S: SettingsStore + ?Sized,
    {
        if let Some(preferences) = settings.load_reader_preferences()? {
            preferences.apply_to(&mut self.session);
        }
        progress::restore_position(&mut self.session, progress)?;
        self.publish();
        Ok(())
    }

    pub fn save_preferences<S: SettingsStore + ?Sized>(&self, settings: &mut S) -> Result<()> {
        settings.save_reader_preferences(&ReaderPreferences::from_session(&self.session))
    }

    /// Navigation is dropped while a load is in flight
    fn navigate(&mut self, step: impl FnOnce(&mut ReadingSession)) -> bool {
        if self.session.is_loading() {
            tracing::debug!("Ignoring navigation while loading");
            return false;
        }
        step(&mut self.session);
        self.publish();
        true
    }

    fn update(&mut self, change: impl FnOnce(&mut ReadingSession)) {
        change(&mut self.session);
        self.publish();
    }

    pub fn go_to_page(&mut self, page: i64) -> bool {
        self.navigate(|s| s.go_to_page(page))
    }

    pub fn next_page(&mut self) -> bool {
        self.navigate(ReadingSession::next_page)
    }

    pub fn prev_page(&mut self) -> bool {
        self.navigate(ReadingSession::prev_page)
    }

    pub fn set_reading_mode(&mut self, mode: ReadingMode) {
        self.update(|s| s.set_reading_mode(mode));
    }

    pub fn set_reading_direction(&mut self, direction: ReadingDirection) {
        self.update(|s| s.set_reading_direction(direction));
    }

    pub fn toggle_direction(&mut self) {
        self.update(ReadingSession::toggle_direction);
    }

    pub fn set_zoom(&mut self, level: u32) {
        self.update(|s| s.set_zoom(level));
    }

    pub fn set_zoom_mode(&mut self, mode: ZoomMode) {
        self.update(|s| s.set_zoom_mode(mode));
    }

    pub fn toggle_invert_colors(&mut self) {
        self.update(ReadingSession::toggle_invert_colors);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| s.set_error(message));
    }

    /// Ask the platform to flip fullscreen
    ///
    /// State does not change here, even on success; it follows the platform's
    /// status notification. Rejections are logged and otherwise ignored.
    pub fn toggle_fullscreen<P: FullscreenPlatform + ?Sized>(&mut self, platform: &mut P) {
        let request = self.session.fullscreen_request();
        if let Err(e) = platform.request(request) {
            tracing::warn!("Fullscreen {:?} rejected: {}", request, e);
        }
    }

    /// Platform status notification for fullscreen
    pub fn on_fullscreen_change(&mut self, active: bool) {
        if self.session.is_fullscreen() != active {
            self.update(|s| s.apply_fullscreen_status(active));
        }
    }

    /// Execute a mapped input command
    ///
    /// Returns true when the command asks to leave the reader.
    pub fn dispatch<P: FullscreenPlatform + ?Sized>(
        &mut self,
        command: ReaderCommand,
        platform: &mut P,
    ) -> bool {
        match command {
            ReaderCommand::NextPage => {
                self.next_page();
            }
            ReaderCommand::PrevPage => {
                self.prev_page();
            }
            ReaderCommand::FirstPage => {
                self.go_to_page(0);
            }
            ReaderCommand::LastPage => {
                let last = self.session.total_pages() as i64 - 1;
                self.go_to_page(last);
            }
            ReaderCommand::ToggleFullscreen => self.toggle_fullscreen(platform),
            ReaderCommand::ToggleInvert => self.toggle_invert_colors(),
            ReaderCommand::ToggleDirection => self.toggle_direction(),
            ReaderCommand::SetMode(mode) => self.set_reading_mode(mode),
            ReaderCommand::Exit => return true,
        }
        false
    }

    /// Release every display ticket and return to the empty session
    ///
    /// Any load still in flight is abandoned. Returns the number of tickets
    /// revoked.
    pub fn reset(&mut self) -> usize {
        self.pending = None;
        let displaced = self.session.reset();
        let released = release_pages(displaced, &mut self.issuer);
        self.publish();
        released
    }

    /// Tear down the reading activity
    ///
    /// Progress is captured before the reset and written afterwards, so the
    /// tickets are released even when the store fails.
    pub fn close<P: ProgressStore + ?Sized>(
        &mut self,
        store: &mut P,
    ) -> Result<Option<ProgressSnapshot>> {
        let snapshot = progress::snapshot(&self.session);
        self.reset();

        match snapshot {
            Some(snapshot) => {
                progress::persist_snapshot(store, &snapshot)?;
                Ok(Some(snapshot))
            }
            None => {
                tracing::debug!("No library volume open; progress not saved");
                Ok(None)
            }
        }
    }

    fn publish(&self) {
        self.events.publish(&self.session);
    }
}
