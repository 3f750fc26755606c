///! Shared utilities for archive processing
///!
///! Page filtering and natural ordering used by both full decode and cover selection
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// Maximum uncompressed size for a single page entry (64MB)
pub const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Extensions a CBZ page may carry
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Resource-fork metadata directory written by macOS archivers
const OS_ARTIFACT_PREFIXES: &[&str] = &["__MACOSX"];

/// Check if filename is a page image based on extension
pub fn is_image_file(name: &str) -> bool {
    if let Some(ext) = Path::new(name).extension().and_then(|s| s.to_str()) {
        IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
    } else {
        false
    }
}

/// Check if an entry is operating-system clutter rather than content
///
/// Covers the `__MACOSX/` tree and AppleDouble `._name` siblings.
pub fn is_os_artifact(name: &str) -> bool {
    if OS_ARTIFACT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        return true;
    }

    name.rsplit('/')
        .next()
        .map(|base| base.starts_with("._"))
        .unwrap_or(false)
}

/// Natural sort comparison
///
/// Digit runs compare by value and letters compare case-insensitively; exact
/// ties fall back to a byte comparison so the order is total.
pub fn natural_sort_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b).then_with(|| a.cmp(b))
}

/// A page entry located in the central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Position in the central directory
    pub index: usize,
    pub name: String,
}

/// Filter `(index, name, is_directory)` records to pages in page order
///
/// Names repeated in the central directory yield one page, backed by the
/// last record carrying that name.
pub fn page_order<'a, I>(entries: I) -> Vec<PageEntry>
where
    I: IntoIterator<Item = (usize, &'a str, bool)>,
{
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (index, name, is_dir) in entries {
        if is_dir || !is_image_file(name) || is_os_artifact(name) {
            continue;
        }
        if let Some(earlier) = by_name.insert(name, index) {
            tracing::warn!(
                "Duplicate entry {} (records {} and {}); using the later one",
                name,
                earlier,
                index
            );
        }
    }

    let mut pages: Vec<PageEntry> = by_name
        .into_iter()
        .map(|(name, index)| PageEntry {
            index,
            name: name.to_string(),
        })
        .collect();

    pages.sort_by(|a, b| natural_sort_cmp(&a.name, &b.name));
    pages
}
