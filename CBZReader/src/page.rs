//! Page images and their display tickets
//!
//! A [`ResourceTicket`] is the opaque handle a renderer resolves to show a
//! page without copying its bytes. Tickets are not `Clone`: revoking one
//! consumes it, so every ticket is revoked at most once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::image_processor::ImageFormat;

/// Opaque display handle for one page blob
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResourceTicket(u64);

impl ResourceTicket {
    /// Wrap an id minted by a [`TicketIssuer`] implementation
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Allocates and revokes display tickets
///
/// The rendering layer provides the implementation; the core only promises
/// one ticket per page, revoked exactly once.
pub trait TicketIssuer {
    fn issue(&mut self, data: &Arc<[u8]>, format: Option<ImageFormat>) -> ResourceTicket;

    fn revoke(&mut self, ticket: ResourceTicket);
}

/// A page extracted from an archive that has no display ticket yet
#[derive(Debug, Clone)]
pub struct DecodedPage {
    pub index: usize,
    /// Entry name inside the archive
    pub name: String,
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

impl DecodedPage {
    /// Allocate a display ticket and turn this into a displayable page
    pub fn into_page<I: TicketIssuer + ?Sized>(self, issuer: &mut I) -> PageImage {
        let ticket = issuer.issue(&self.data, self.format);
        PageImage {
            index: self.index,
            name: self.name,
            data: self.data,
            ticket,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

/// One displayable page of a loaded volume
#[derive(Debug)]
pub struct PageImage {
    /// 0-based position in natural filename order
    pub index: usize,
    pub name: String,
    pub data: Arc<[u8]>,
    pub ticket: ResourceTicket,
    /// 0 when the header could not be read
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageFormat>,
}

impl PageImage {
    pub fn mime_type(&self) -> Option<&'static str> {
        self.format.map(|f| f.mime_type())
    }
}

/// Revoke the tickets of every page, returning how many were released
pub fn release_pages<I: TicketIssuer + ?Sized>(pages: Vec<PageImage>, issuer: &mut I) -> usize {
    let count = pages.len();
    for page in pages {
        issuer.revoke(page.ticket);
    }
    if count > 0 {
        tracing::debug!("Released {} display tickets", count);
    }
    count
}

/// A resolved ticket as seen by a renderer
#[derive(Debug, Clone, Copy)]
pub struct ResolvedResource<'a> {
    pub data: &'a [u8],
    pub format: Option<ImageFormat>,
}

/// In-process ticket issuer backed by a map of live blobs
#[derive(Debug, Default)]
pub struct TicketRegistry {
    next_id: u64,
    live: HashMap<u64, (Arc<[u8]>, Option<ImageFormat>)>,
    revoked: u64,
}

impl TicketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, ticket: &ResourceTicket) -> Option<ResolvedResource<'_>> {
        self.live.get(&ticket.0).map(|(data, format)| ResolvedResource {
            data,
            format: *format,
        })
    }

    /// Tickets issued and not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }
}

impl TicketIssuer for TicketRegistry {
    fn issue(&mut self, data: &Arc<[u8]>, format: Option<ImageFormat>) -> ResourceTicket {
        self.next_id += 1;
        self.live.insert(self.next_id, (Arc::clone(data), format));
        ResourceTicket(self.next_id)
    }

    fn revoke(&mut self, ticket: ResourceTicket) {
        if self.live.remove(&ticket.0).is_some() {
            self.revoked += 1;
        } else {
            tracing::warn!("Revoking unknown display ticket {}", ticket.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(index: usize, bytes: &[u8]) -> DecodedPage {
        DecodedPage {
            index,
            name: format!("p{}.jpg", index),
            data: Arc::from(bytes),
            width: 0,
            height: 0,
            format: Some(ImageFormat::Jpeg),
        }
    }

    #[test]
    fn test_issue_and_resolve() {
        let mut registry = TicketRegistry::new();
        let page = decoded(0, b"abc").into_page(&mut registry);

        let resolved = registry.resolve(&page.ticket).unwrap();
        assert_eq!(resolved.data, b"abc");
        assert_eq!(resolved.format, Some(ImageFormat::Jpeg));
        assert_eq!(page.mime_type(), Some("image/jpeg"));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut registry = TicketRegistry::new();
        let a = decoded(0, b"a").into_page(&mut registry);
        let b = decoded(1, b"b").into_page(&mut registry);
        assert_ne!(a.ticket.id(), b.ticket.id());
    }

    #[test]
    fn test_release_pages_revokes_all() {
        let mut registry = TicketRegistry::new();
        let pages: Vec<PageImage> = (0..3)
            .map(|i| decoded(i, b"x").into_page(&mut registry))
            .collect();

        assert_eq!(release_pages(pages, &mut registry), 3);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 3);
    }
}
