use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::ArtifactKind;
use crate::providers::ProviderError;

/// Failures of artifact cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A source or cached file does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Image bytes could not be decoded into dimensions.
    #[error("Unable to decode image: {0}")]
    Decode(String),

    /// The operation does not accept this artifact kind.
    #[error("Unsupported artifact kind for this operation: {0}")]
    UnsupportedKind(ArtifactKind),

    /// Any other filesystem failure at `path`.
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote provider failed to retrieve or write an image.
    #[error("Provider error: {0}")]
    Remote(#[from] ProviderError),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound(path)
        } else {
            CacheError::Io { path, source }
        }
    }
}

/// Result alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
