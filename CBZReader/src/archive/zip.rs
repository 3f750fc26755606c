///! ZIP/CBZ container reader
///!
///! Reads an in-memory archive with the `zip` crate
use std::io::{Cursor, Read};
use zip::ZipArchive as ZipReader;

use super::utils::{page_order, PageEntry, MAX_ENTRY_SIZE};
use super::{detect_archive_type_from_bytes, ArchiveType};
use crate::utils::error::{CbzError, Result};

/// Central-directory record for one entry
#[derive(Debug, Clone)]
pub(crate) struct ArchiveEntry {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Page-oriented view over a zip container held in memory
pub(crate) struct ZipPageReader<'a> {
    archive: ZipReader<Cursor<&'a [u8]>>,
}

impl<'a> ZipPageReader<'a> {
    /// Parse the central directory of `bytes`
    ///
    /// Anything that is not a readable zip container becomes
    /// `CbzError::ArchiveDecode` with advice to re-encode as CBZ.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        tracing::debug!("Opening ZIP archive from {} bytes", bytes.len());

        let archive = ZipReader::new(Cursor::new(bytes)).map_err(|e| {
            tracing::warn!("Invalid ZIP archive: {}", e);
            CbzError::ArchiveDecode(unsupported_container_message(bytes))
        })?;

        Ok(Self { archive })
    }

    /// All entries in central-directory order, unreadable records skipped
    pub fn entries(&mut self) -> Vec<ArchiveEntry> {
        (0..self.archive.len())
            .filter_map(|i| match self.archive.by_index(i) {
                Ok(f) => Some(ArchiveEntry {
                    index: i,
                    name: f.name().to_string(),
                    size: f.size(),
                    is_directory: f.is_dir(),
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {}: {}", i, e);
                    None
                }
            })
            .collect()
    }

    /// Page entries in canonical page order
    pub fn pages(&mut self) -> Vec<PageEntry> {
        let entries = self.entries();
        let pages = page_order(
            entries
                .iter()
                .map(|entry| (entry.index, entry.name.as_str(), entry.is_directory)),
        );

        tracing::debug!(
            "ZIP listing: {} entries, {} pages",
            entries.len(),
            pages.len()
        );
        pages
    }

    /// Decompress one page into an owned buffer
    ///
    /// Reads by central-directory position, so a name that occurs twice
    /// still resolves to the record `page` was built from.
    pub fn extract(&mut self, page: &PageEntry) -> Result<Vec<u8>> {
        let name = page.name.as_str();
        let mut zip_entry = self.archive.by_index(page.index).map_err(|e| {
            CbzError::ArchiveDecode(format!("Failed to open entry {}: {}", name, e))
        })?;

        let size = zip_entry.size();
        if size > MAX_ENTRY_SIZE {
            tracing::warn!(
                "Entry too large: {} is {} bytes (max {})",
                name,
                size,
                MAX_ENTRY_SIZE
            );
            return Err(CbzError::ArchiveDecode(format!(
                "Entry too large: {} is {} bytes (max 64MB)",
                name, size
            )));
        }

        // Bound the read as well; the declared size is only a hint
        let mut buffer = Vec::with_capacity(size as usize);
        (&mut zip_entry)
            .take(MAX_ENTRY_SIZE + 1)
            .read_to_end(&mut buffer)
            .map_err(|e| {
                CbzError::ArchiveDecode(format!("Failed to extract entry {}: {}", name, e))
            })?;

        if buffer.len() as u64 > MAX_ENTRY_SIZE {
            return Err(CbzError::ArchiveDecode(format!(
                "Entry too large: {} exceeds 64MB when decompressed",
                name
            )));
        }

        tracing::debug!("Extracted {} ({} bytes)", name, buffer.len());
        Ok(buffer)
    }
}

/// Decode failure text, naming the container type when it can be sniffed
fn unsupported_container_message(bytes: &[u8]) -> String {
    let detail = match detect_archive_type_from_bytes(bytes) {
        Some(kind @ (ArchiveType::Rar | ArchiveType::SevenZip)) => {
            format!("It is {} encoded.", kind.as_str())
        }
        Some(ArchiveType::Zip) => "The zip container is damaged.".to_string(),
        None => "It may be 7z encoded.".to_string(),
    };

    format!(
        "Failed to load archive. {} Please use zip-encoded CBZ files only.",
        detail
    )
}
