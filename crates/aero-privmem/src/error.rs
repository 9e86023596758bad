use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrivMemError>;

/// Errors surfaced while opening a private memory disk.
///
/// Only opening can fail. Once a [`crate::PrivMemDisk`] exists, reads and writes are plain
/// memory copies and out-of-range sectors are handled by zero-fill/discard instead of errors.
#[derive(Debug, Error)]
pub enum PrivMemError {
    /// The path does not exist, cannot be accessed, or is not a regular file.
    #[error("invalid image {}: {reason}", .path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// The OS refused to establish the private read-write mapping.
    #[error("failed to map {}: {source}", .path.display())]
    MapFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
}

impl PrivMemError {
    pub(crate) fn invalid_image(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidImage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
