//! Image inspection for archive pages
//!
//! Pages are never re-encoded. This module only answers two questions about
//! an extracted page: what format its bytes are (**magic**) and how large it
//! is in pixels (**decoder**, header-only).

mod decoder;
pub mod magic;

pub use decoder::{page_dimensions, probe_dimensions};
pub use magic::ImageFormat;
