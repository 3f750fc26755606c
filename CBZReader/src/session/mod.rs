//! Reading session state machine
//!
//! [`ReadingSession`] holds everything about the volume being read. Every
//! operation is total: out-of-range input is clamped, never rejected, and
//! failures are carried as data in `last_error`. No I/O happens here; the
//! session hands displaced pages back to its owner instead of releasing
//! their tickets itself.

pub mod events;
pub mod input;
pub mod layout;

use serde::{Deserialize, Serialize};

use crate::page::PageImage;

pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 200;
pub const DEFAULT_ZOOM: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingMode {
    #[default]
    #[serde(rename = "vertical-scroll")]
    Vertical,
    #[serde(rename = "single-page")]
    Single,
    #[serde(rename = "two-page")]
    TwoPage,
}

impl ReadingMode {
    /// Pages moved by one next/previous step
    pub fn step(&self) -> usize {
        match self {
            Self::TwoPage => 2,
            Self::Vertical | Self::Single => 1,
        }
    }

    pub fn is_paged(&self) -> bool {
        !matches!(self, Self::Vertical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertical => "vertical-scroll",
            Self::Single => "single-page",
            Self::TwoPage => "two-page",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "vertical" | "vertical-scroll" | "v" => Some(Self::Vertical),
            "single" | "single-page" | "1" => Some(Self::Single),
            "two" | "two-page" | "2" => Some(Self::TwoPage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingDirection {
    #[default]
    Ltr,
    Rtl,
}

impl ReadingDirection {
    pub fn flipped(&self) -> Self {
        match self {
            Self::Ltr => Self::Rtl,
            Self::Rtl => Self::Ltr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomMode {
    #[default]
    FitWidth,
    FitHeight,
    Custom,
}

/// What the platform should be asked to do when fullscreen is toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    Enter,
    Exit,
}

/// State of the volume currently open in the reader
#[derive(Debug, Default)]
pub struct ReadingSession {
    volume_id: Option<String>,
    volume_name: Option<String>,
    series_id: Option<String>,
    pages: Vec<PageImage>,
    current_page: usize,
    reading_mode: ReadingMode,
    reading_direction: ReadingDirection,
    zoom_mode: ZoomMode,
    zoom_level: u32,
    invert_colors: bool,
    is_fullscreen: bool,
    is_loading: bool,
    last_error: Option<String>,
}

impl ReadingSession {
    /// Empty session, as it is before anything is loaded
    pub fn new() -> Self {
        Self {
            zoom_level: DEFAULT_ZOOM,
            ..Self::default()
        }
    }

    /// Install a freshly decoded volume
    ///
    /// Replaces pages and volume identity wholesale, moves to page 0 and
    /// clears loading/error state. View settings (mode, direction, zoom,
    /// invert, fullscreen) carry over. The previous pages are returned so
    /// their owner can release the tickets.
    #[must_use = "displaced pages hold display tickets that must be released"]
    pub fn load(
        &mut self,
        pages: Vec<PageImage>,
        volume_id: impl Into<String>,
        volume_name: impl Into<String>,
        series_id: Option<String>,
    ) -> Vec<PageImage> {
        let previous = std::mem::replace(&mut self.pages, pages);
        self.volume_id = Some(volume_id.into());
        self.volume_name = Some(volume_name.into());
        self.series_id = series_id;
        self.current_page = 0;
        self.is_loading = false;
        self.last_error = None;
        previous
    }

    /// Jump to `page`, clamped to the valid range
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.last_page_index() as i64;
        self.current_page = page.clamp(0, last) as usize;
    }

    /// Advance one step (two in spread mode); no-op on the last page
    pub fn next_page(&mut self) {
        if self.current_page + 1 < self.total_pages() {
            let target = self.current_page + self.reading_mode.step();
            self.go_to_page(target as i64);
        }
    }

    /// Retreat one step (two in spread mode); no-op on the first page
    pub fn prev_page(&mut self) {
        if self.current_page > 0 {
            let target = self.current_page as i64 - self.reading_mode.step() as i64;
            self.go_to_page(target);
        }
    }

    /// Switch mode; the current page stays the anchor
    pub fn set_reading_mode(&mut self, mode: ReadingMode) {
        self.reading_mode = mode;
    }

    pub fn set_reading_direction(&mut self, direction: ReadingDirection) {
        self.reading_direction = direction;
    }

    pub fn toggle_direction(&mut self) {
        self.reading_direction = self.reading_direction.flipped();
    }

    /// Set a custom zoom, clamped to [`MIN_ZOOM`, `MAX_ZOOM`]
    pub fn set_zoom(&mut self, level: u32) {
        self.zoom_level = level.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_mode = ZoomMode::Custom;
    }

    pub fn set_zoom_mode(&mut self, mode: ZoomMode) {
        self.zoom_mode = mode;
    }

    pub fn toggle_invert_colors(&mut self) {
        self.invert_colors = !self.invert_colors;
    }

    pub fn set_invert_colors(&mut self, invert: bool) {
        self.invert_colors = invert;
    }

    /// The platform request a fullscreen toggle should make
    ///
    /// Does not touch `is_fullscreen`; only [`apply_fullscreen_status`]
    /// does, once the platform reports what actually happened.
    ///
    /// [`apply_fullscreen_status`]: Self::apply_fullscreen_status
    pub fn fullscreen_request(&self) -> FullscreenRequest {
        if self.is_fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        }
    }

    /// Record the platform's authoritative fullscreen status
    pub fn apply_fullscreen_status(&mut self, active: bool) {
        self.is_fullscreen = active;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Record a failure; always ends the loading state
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.is_loading = false;
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Return to the empty initial session, handing back the old pages
    #[must_use = "displaced pages hold display tickets that must be released"]
    pub fn reset(&mut self) -> Vec<PageImage> {
        std::mem::replace(self, Self::new()).pages
    }

    pub fn volume_id(&self) -> Option<&str> {
        self.volume_id.as_deref()
    }

    pub fn volume_name(&self) -> Option<&str> {
        self.volume_name.as_deref()
    }

    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PageImage> {
        self.pages.get(index)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn reading_mode(&self) -> ReadingMode {
        self.reading_mode
    }

    pub fn reading_direction(&self) -> ReadingDirection {
        self.reading_direction
    }

    pub fn zoom_mode(&self) -> ZoomMode {
        self.zoom_mode
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    pub fn invert_colors(&self) -> bool {
        self.invert_colors
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn last_page_index(&self) -> usize {
        self.total_pages().saturating_sub(1)
    }
}
