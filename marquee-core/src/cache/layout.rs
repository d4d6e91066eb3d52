use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::artifact::ArtifactKind;
use crate::error::{CacheError, Result};
use crate::show::ShowId;

/// Thumbnail directory beneath the cache root.
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Directory layout of the artwork cache.
///
/// ```text
/// <root>/<id>.poster.jpg
/// <root>/<id>.banner.jpg
/// <root>/<id>.fanart.jpg
/// <root>/thumbnails/<id>.poster.jpg
/// <root>/thumbnails/<id>.banner.jpg
/// ```
///
/// Path derivation is pure; directories are only created by
/// [`CacheLayout::ensure_directories`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/thumbnails`
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join(THUMBNAILS_DIR)
    }

    /// `<id>.<label>.jpg`
    pub fn file_name(kind: ArtifactKind, id: ShowId) -> String {
        format!("{id}.{}.jpg", kind.file_label())
    }

    /// Full path of `kind` for `id`.
    pub fn path(&self, kind: ArtifactKind, id: ShowId) -> PathBuf {
        let file_name = Self::file_name(kind, id);
        if kind.is_thumbnail() {
            self.thumbnails_dir().join(file_name)
        } else {
            self.root.join(file_name)
        }
    }

    /// `<root>/<id>.poster.jpg`
    pub fn poster_path(&self, id: ShowId) -> PathBuf {
        self.path(ArtifactKind::Poster, id)
    }

    /// `<root>/<id>.banner.jpg`
    pub fn banner_path(&self, id: ShowId) -> PathBuf {
        self.path(ArtifactKind::Banner, id)
    }

    /// `<root>/<id>.fanart.jpg`
    pub fn fanart_path(&self, id: ShowId) -> PathBuf {
        self.path(ArtifactKind::Fanart, id)
    }

    /// `<root>/thumbnails/<id>.poster.jpg`
    pub fn poster_thumb_path(&self, id: ShowId) -> PathBuf {
        self.path(ArtifactKind::PosterThumbnail, id)
    }

    /// `<root>/thumbnails/<id>.banner.jpg`
    pub fn banner_thumb_path(&self, id: ShowId) -> PathBuf {
        self.path(ArtifactKind::BannerThumbnail, id)
    }

    /// Create the root and thumbnails directories if they are missing.
    /// A directory created concurrently by another caller counts as success.
    pub async fn ensure_directories(&self) -> Result<()> {
        ensure_dir(&self.root, "image cache").await?;
        ensure_dir(&self.thumbnails_dir(), "thumbnails cache").await
    }
}

async fn ensure_dir(dir: &Path, label: &str) -> Result<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            warn!(path = %dir.display(), "{label} path exists but is not a directory");
        }
        Err(_) => {
            info!(path = %dir.display(), "{label} dir didn't exist, creating it");
        }
    }

    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists && dir.is_dir() => {
            Ok(())
        }
        Err(err) => Err(CacheError::io(dir, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn paths_follow_documented_layout() {
        let layout = CacheLayout::new("/cache/images");
        let id = ShowId::new(12345);

        assert_eq!(
            layout.poster_path(id),
            PathBuf::from("/cache/images/12345.poster.jpg")
        );
        assert_eq!(
            layout.banner_path(id),
            PathBuf::from("/cache/images/12345.banner.jpg")
        );
        assert_eq!(
            layout.fanart_path(id),
            PathBuf::from("/cache/images/12345.fanart.jpg")
        );
        assert_eq!(
            layout.poster_thumb_path(id),
            PathBuf::from("/cache/images/thumbnails/12345.poster.jpg")
        );
        assert_eq!(
            layout.banner_thumb_path(id),
            PathBuf::from("/cache/images/thumbnails/12345.banner.jpg")
        );
    }

    #[test]
    fn paths_are_distinct_across_kinds_and_ids() {
        let layout = CacheLayout::new("/cache/images");
        let mut seen = HashSet::new();

        for id in [1, 12, 123, 1234, 12345].map(ShowId::new) {
            for kind in ArtifactKind::ALL {
                let path = layout.path(kind, id);
                assert_eq!(path, layout.path(kind, id));
                assert!(seen.insert(path), "{kind} for {id} collided");
            }
        }
        assert_eq!(seen.len(), 25);
    }

    #[tokio::test]
    async fn ensure_directories_is_idempotent() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let layout = CacheLayout::new(dir.path().join("images"));

        layout.ensure_directories().await.expect("first");
        layout.ensure_directories().await.expect("second");

        assert!(layout.root().is_dir());
        assert!(layout.thumbnails_dir().is_dir());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_directory_creation_all_succeed() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let layout = CacheLayout::new(dir.path().join("a").join("b").join("images"));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let layout = layout.clone();
                tokio::spawn(async move { layout.ensure_directories().await })
            })
            .collect();

        for handle in handles {
            handle.await.expect("join").expect("ensure directories");
        }
        assert!(layout.thumbnails_dir().is_dir());
    }
}
