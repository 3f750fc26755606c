//! CBZReader - comic archive decoding and reading sessions
//!
//! Turns zip-encoded comic archives (CBZ) into ordered page lists, keeps the
//! state of one reading session (page, mode, direction, zoom, fullscreen)
//! and records reading progress for library volumes.
//!
//! The pieces compose bottom-up:
//! - [`archive`] decodes archive bytes into [`DecodedPage`]s in natural
//!   filename order and picks cover images.
//! - [`session`] is the pure reading state machine plus input mapping.
//! - [`reader::Reader`] owns a session, its display tickets and the change
//!   channel, and is what a front end drives.
//! - [`progress`], [`settings`] and [`store`] persist where the reader left
//!   off and how they like to read.

pub mod archive;
pub mod image_processor;
pub mod page;
pub mod progress;
pub mod reader;
pub mod session;
pub mod settings;
pub mod store;
mod utils;

pub use archive::{decode, extract_pages, select_cover, ArchiveSource, FileSource, MemorySource};
pub use page::{DecodedPage, PageImage, ResourceTicket, TicketIssuer, TicketRegistry};
pub use reader::{FullscreenPlatform, LoadOutcome, Reader, VolumeInfo};
pub use session::{ReadingDirection, ReadingMode, ReadingSession, ZoomMode};
pub use utils::error::{CbzError, Result};
