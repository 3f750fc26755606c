///! Error types for CBZReader
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CbzError {
    #[error("Archive decode error: {0}")]
    ArchiveDecode(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to acquire archive: {0}")]
    Acquisition(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl CbzError {
    /// True for failures that mean the container itself could not be read
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::ArchiveDecode(_))
    }

    /// Message shown to the reader when a load attempt fails
    ///
    /// Decode and acquisition errors carry their own wording; anything else
    /// collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::ArchiveDecode(msg) | Self::Acquisition(msg) | Self::PermissionDenied(msg) => {
                msg.clone()
            }
            _ => "Failed to load the comic file.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CbzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_keeps_decode_text() {
        let err = CbzError::ArchiveDecode("Please use zip-encoded CBZ files only.".to_string());
        assert!(err.is_decode_error());
        assert_eq!(err.user_message(), "Please use zip-encoded CBZ files only.");
    }

    #[test]
    fn test_user_message_generic_fallback() {
        let err = CbzError::Storage("disk full".to_string());
        assert!(!err.is_decode_error());
        assert_eq!(err.user_message(), "Failed to load the comic file.");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CbzError = io.into();
        assert!(matches!(err, CbzError::Io(_)));
    }
}
