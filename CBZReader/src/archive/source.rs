//! Archive byte acquisition
//!
//! The engine does not care where archive bytes come from: a persisted
//! library handle, an ad hoc file pick, or memory. Sources only have to
//! produce the whole buffer and a display name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::ArchiveType;
use crate::utils::error::{CbzError, Result};

/// Supplies raw archive bytes to the decoder
pub trait ArchiveSource {
    /// Name shown to the user, usually the file name
    fn name(&self) -> &str;

    fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// Archive stored on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ArchiveType::from_extension(ext) {
            Some(ArchiveType::Zip) | None => {}
            Some(other) => tracing::warn!(
                "{} looks like a {} archive; only zip is readable",
                name,
                other.as_str()
            ),
        }

        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        tracing::debug!("Reading archive file: {:?}", self.path);

        std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                CbzError::PermissionDenied(format!("Cannot read {}: {}", self.name, e))
            }
            _ => CbzError::Acquisition(format!("Failed to read {}: {}", self.name, e)),
        })
    }
}

/// Archive already held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ArchiveSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
