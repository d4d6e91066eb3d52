//! Collaborators that locate or retrieve show artwork.
//!
//! Two capabilities are kept apart:
//!
//! - [`LocalArtworkSource`] knows where a media-center metadata layout keeps
//!   the poster image inside a show directory. A fill visits the configured
//!   sources in order.
//! - [`RemoteArtworkProvider`] retrieves artwork bytes from a remote service
//!   and persists them at a cache path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::artifact::ArtifactKind;
use crate::show::ShowRef;

mod error;
mod local;
mod tmdb;

pub use error::ProviderError;
pub use local::{LocalLayoutSource, MetadataLayout};
pub use tmdb::{
    SeriesImage, SeriesImages, TMDB_IMAGE_BASE, TMDB_V3_BASE, TmdbArtworkProvider,
    TmdbSettings, tmdb_size_for,
};

/// Locates show artwork written by a media-center metadata layout.
pub trait LocalArtworkSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn enabled(&self) -> bool {
        true
    }

    /// Where this layout expects the show's poster image, if it keeps one.
    fn poster_path(&self, show: &ShowRef) -> Option<PathBuf>;
}

/// Retrieves artwork from a remote service and persists it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteArtworkProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the raw bytes of `kind` artwork for `show`.
    async fn retrieve_image(
        &self,
        kind: ArtifactKind,
        show: &ShowRef,
    ) -> Result<Vec<u8>, ProviderError>;

    /// Persist retrieved bytes at `dest`, creating its directory if needed.
    async fn write_image(
        &self,
        bytes: &[u8],
        dest: &Path,
    ) -> Result<(), ProviderError> {
        write_image_bytes(bytes, dest).await
    }
}

/// Writes image bytes to `dest`, overwriting any previous file.
///
/// The write is not atomic; a crash mid-write can leave a truncated file.
pub async fn write_image_bytes(
    bytes: &[u8],
    dest: &Path,
) -> Result<(), ProviderError> {
    if bytes.is_empty() {
        return Err(ProviderError::EmptyImage);
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| {
            ProviderError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }

    tokio::fs::write(dest, bytes)
        .await
        .map_err(|source| ProviderError::WriteFailed {
            path: dest.to_path_buf(),
            source,
        })
}
