use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Track number {0} does not fit into the tag format")]
    TrackNumberOutOfRange(usize),

    #[error("Failed to {operation} tags of {path}: {reason}")]
    Tagging {
        operation: &'static str,
        path: String,
        reason: String,
    },
}

/// Port trait for writing album metadata into an exported audio file.
///
/// The production implementation lives in `tagging::TagWriter`; tests use the
/// generated `MockMetadataWriter`.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataWriter: Send + Sync {
    fn set_album(&self, path: &Path, album: &str) -> Result<(), MetadataError>;

    fn set_track_number(&self, path: &Path, track_number: usize) -> Result<(), MetadataError>;

    fn set_album_artist(&self, path: &Path, album_artist: &str) -> Result<(), MetadataError>;
}
