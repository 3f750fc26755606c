//! Archive decoding
//!
//! Turns a CBZ byte buffer into an ordered page sequence, or picks a single
//! cover image from it. Both paths share one filter and natural-sort pipeline
//! so the cover is always page 0 of the full decode.

mod source;
mod utils;
mod zip;

pub use source::{ArchiveSource, FileSource, MemorySource};
pub use utils::{is_image_file, is_os_artifact, natural_sort_cmp, MAX_ENTRY_SIZE};

use std::sync::Arc;

use crate::image_processor::{magic, page_dimensions};
use crate::page::{DecodedPage, PageImage, TicketIssuer};
use crate::utils::error::Result;
use self::zip::ZipPageReader;

/// Container type recognised from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveType {
    /// Detect archive type from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "zip" | "cbz" => Some(Self::Zip),
            "rar" | "cbr" => Some(Self::Rar),
            "7z" | "cb7" => Some(Self::SevenZip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "ZIP",
            Self::Rar => "RAR",
            Self::SevenZip => "7-Zip",
        }
    }
}

/// Detect archive type from magic bytes
///
/// - ZIP: `PK\x03\x04`, `PK\x05\x06` (empty archive) or `PK\x07\x08`
/// - RAR 4.x: `Rar!\x1A\x07\x00`, RAR 5.x: `Rar!\x1A\x07\x01\x00`
/// - 7z: `7z\xBC\xAF\x27\x1C`
///
/// Only used to explain a failed open; decoding always goes through zip.
pub fn detect_archive_type_from_bytes(data: &[u8]) -> Option<ArchiveType> {
    if [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"]
        .iter()
        .any(|magic| data.starts_with(*magic))
    {
        return Some(ArchiveType::Zip);
    }

    if data.starts_with(b"7z\xBC\xAF\x27\x1C") {
        return Some(ArchiveType::SevenZip);
    }

    if data.starts_with(b"Rar!\x1A\x07\x00") || data.starts_with(b"Rar!\x1A\x07\x01\x00") {
        return Some(ArchiveType::Rar);
    }

    None
}

/// Extract every page of an archive without allocating display tickets
///
/// Pages come back in natural filename order with dense indices. An archive
/// with no qualifying images yields an empty vector. Any failure to read the
/// container or one of its pages fails the whole call; no partial sequence is
/// ever returned.
pub fn extract_pages(archive_bytes: &[u8]) -> Result<Vec<DecodedPage>> {
    let mut reader = ZipPageReader::open(archive_bytes)?;
    let entries = reader.pages();

    if entries.is_empty() {
        tracing::info!("Archive contains no page images");
        return Ok(Vec::new());
    }

    let mut pages = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let data = reader.extract(&entry)?;
        let name = entry.name;
        let (width, height) = page_dimensions(&data, &name);
        let format = magic::sniff_page_format(&data, &name);

        pages.push(DecodedPage {
            index,
            name,
            data: Arc::from(data),
            width,
            height,
            format,
        });
    }

    tracing::info!("Decoded {} pages", pages.len());
    Ok(pages)
}

/// Decode an archive into displayable pages
///
/// Each returned page owns a freshly issued ticket; releasing them is the
/// caller's job. Tickets are only issued once every page extracted cleanly.
pub fn decode<I: TicketIssuer + ?Sized>(
    archive_bytes: &[u8],
    issuer: &mut I,
) -> Result<Vec<PageImage>> {
    let decoded = extract_pages(archive_bytes)?;
    Ok(decoded
        .into_iter()
        .map(|page| page.into_page(issuer))
        .collect())
}

/// Return the first page's bytes, or `None`
///
/// Best effort: an unreadable archive, an empty one or a failed extraction
/// all mean "no cover". Only the first page is decompressed.
pub fn select_cover(archive_bytes: &[u8]) -> Option<Vec<u8>> {
    let mut reader = match ZipPageReader::open(archive_bytes) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::debug!("Cover extraction skipped: {}", e);
            return None;
        }
    };

    let first = reader.pages().into_iter().next()?;
    match reader.extract(&first) {
        Ok(data) => {
            tracing::info!("Selected cover: {}", first.name);
            Some(data)
        }
        Err(e) => {
            tracing::debug!("Cover extraction failed for {}: {}", first.name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TicketRegistry;
    use image::{DynamicImage, RgbImage};
    use std::io::{Cursor, Write};
    use ::zip::write::{FileOptions, ZipWriter};
    use ::zip::CompressionMethod;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn create_test_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, content) in files {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_detect_zip_format() {
        assert_eq!(
            detect_archive_type_from_bytes(b"PK\x03\x04\x14\x00\x00\x00"),
            Some(ArchiveType::Zip)
        );
        assert_eq!(
            detect_archive_type_from_bytes(b"PK\x05\x06\x00\x00\x00\x00"),
            Some(ArchiveType::Zip)
        );
    }

    #[test]
    fn test_detect_other_formats() {
        assert_eq!(
            detect_archive_type_from_bytes(b"7z\xBC\xAF\x27\x1C\x00\x00"),
            Some(ArchiveType::SevenZip)
        );
        assert_eq!(
            detect_archive_type_from_bytes(b"Rar!\x1A\x07\x00\x00"),
            Some(ArchiveType::Rar)
        );
        assert_eq!(
            detect_archive_type_from_bytes(b"Rar!\x1A\x07\x01\x00"),
            Some(ArchiveType::Rar)
        );
        assert_eq!(detect_archive_type_from_bytes(b"UNKNOWN\x00"), None);
        assert_eq!(detect_archive_type_from_bytes(b"PK"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ArchiveType::from_extension("CBZ"), Some(ArchiveType::Zip));
        assert_eq!(ArchiveType::from_extension("cbr"), Some(ArchiveType::Rar));
        assert_eq!(
            ArchiveType::from_extension("cb7"),
            Some(ArchiveType::SevenZip)
        );
        assert_eq!(ArchiveType::from_extension("pdf"), None);
    }

    #[test]
    fn test_extract_pages_natural_order() {
        let bytes = create_test_zip(&[
            ("p2.jpg", b"two"),
            ("p10.jpg", b"ten"),
            ("p1.jpg", b"one"),
        ]);

        let pages = extract_pages(&bytes).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p1.jpg", "p2.jpg", "p10.jpg"]);
        assert_eq!(
            pages.iter().map(|p| p.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(&*pages[2].data, b"ten");
    }

    #[test]
    fn test_extract_pages_is_deterministic() {
        let bytes = create_test_zip(&[
            ("Ch1/img_9.png", b"a"),
            ("ch1/IMG_10.png", b"b"),
            ("Ch1/img_09.png", b"c"),
            ("ch1/img_9.png", b"d"),
        ]);

        let names = || -> Vec<String> {
            extract_pages(&bytes)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect()
        };
        let first = names();
        let second = names();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_pages_duplicate_name_is_one_page() {
        let bytes = create_test_zip(&[
            ("01.jpg", b"first"),
            ("02.jpg", b"other"),
            ("01.jpg", b"second"),
        ]);

        let pages = extract_pages(&bytes).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].name, "01.jpg");
        assert_eq!(&*pages[0].data, b"second");
        assert_eq!(&*pages[1].data, b"other");
        assert_eq!(select_cover(&bytes), Some(b"second".to_vec()));
    }

    #[test]
    fn test_extract_pages_rejects_oversized_entry() {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            zip.start_file("001.jpg", options).unwrap();
            zip.write_all(b"small page").unwrap();

            zip.start_file("002.jpg", options).unwrap();
            let chunk = vec![0u8; 1024 * 1024];
            for _ in 0..(MAX_ENTRY_SIZE / chunk.len() as u64) {
                zip.write_all(&chunk).unwrap();
            }
            zip.write_all(&[0]).unwrap();
            zip.finish().unwrap();
        }

        let err = extract_pages(&buffer).unwrap_err();
        assert!(err.is_decode_error());
        assert!(err.to_string().contains("too large"));

        let mut registry = TicketRegistry::new();
        assert!(decode(&buffer, &mut registry).is_err());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_extract_pages_reads_dimensions() {
        let page = png(12, 20);
        let bytes = create_test_zip(&[
            ("001.png", page.as_slice()),
            ("002.jpg", b"not really a jpeg"),
        ]);

        let pages = extract_pages(&bytes).unwrap();
        assert_eq!((pages[0].width, pages[0].height), (12, 20));
        assert_eq!(pages[0].format, Some(crate::image_processor::ImageFormat::Png));
        // Undecodable page keeps its slot with zero dimensions
        assert_eq!((pages[1].width, pages[1].height), (0, 0));
        assert_eq!(pages[1].format, None);
    }

    #[test]
    fn test_extract_pages_skips_artifacts() {
        let bytes = create_test_zip(&[
            ("__MACOSX/._01.jpg", b"fork"),
            ("01.jpg", b"page"),
            ("info.xml", b"<ComicInfo/>"),
        ]);

        let pages = extract_pages(&bytes).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "01.jpg");
    }

    #[test]
    fn test_extract_pages_no_images_is_empty() {
        let bytes = create_test_zip(&[("readme.txt", b"text")]);
        assert!(extract_pages(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_zip() {
        let mut registry = TicketRegistry::new();
        let result = decode(b"\x13\x37 definitely random bytes", &mut registry);
        assert!(result.unwrap_err().is_decode_error());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_decode_issues_one_ticket_per_page() {
        let bytes = create_test_zip(&[("a.png", b"1"), ("b.png", b"2")]);
        let mut registry = TicketRegistry::new();

        let pages = decode(&bytes, &mut registry).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.resolve(&pages[1].ticket).unwrap().data, b"2");
    }

    #[test]
    fn test_select_cover_first_in_order() {
        let bytes = create_test_zip(&[("page10.jpg", b"ten"), ("page2.jpg", b"two")]);
        assert_eq!(select_cover(&bytes), Some(b"two".to_vec()));
    }

    #[test]
    fn test_select_cover_none_cases() {
        let no_images = create_test_zip(&[("readme.txt", b"text")]);
        assert_eq!(select_cover(&no_images), None);
        assert_eq!(select_cover(b"not a zip"), None);
    }
}
