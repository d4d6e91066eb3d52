use std::{
    any::type_name_of_val,
    collections::BTreeSet,
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info, warn};

use super::layout::CacheLayout;
use crate::artifact::ArtifactKind;
use crate::classify::{DimensionDecoder, ImageHeaderDecoder, classify_with};
use crate::error::{CacheError, Result};
use crate::providers::{LocalArtworkSource, RemoteArtworkProvider};
use crate::show::{ShowId, ShowRef};

/// Kinds still missing from the cache for one show during a fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeededArtifacts(BTreeSet<ArtifactKind>);

impl NeededArtifacts {
    /// Every kind is needed.
    pub fn all() -> Self {
        Self(ArtifactKind::ALL.into_iter().collect())
    }

    /// Mark `kind` as needed.
    pub fn insert(&mut self, kind: ArtifactKind) {
        self.0.insert(kind);
    }

    /// Whether `kind` is still needed.
    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.0.contains(&kind)
    }

    /// Returns whether `kind` was still needed.
    pub fn mark_filled(&mut self, kind: ArtifactKind) -> bool {
        self.0.remove(&kind)
    }

    /// Nothing is needed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of kinds still needed.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any kind that a show-directory file could satisfy is missing.
    pub fn any_full_size(&self) -> bool {
        ArtifactKind::FULL_SIZE
            .into_iter()
            .any(|kind| self.contains(kind))
    }

    /// Needed kinds in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.0.iter().copied()
    }
}

/// Show artwork cache.
///
/// Holds no locks: two fills for the same show can race on the same
/// destination file, last writer wins. Callers that need per-show exclusivity
/// serialize fills themselves.
#[derive(Clone)]
pub struct ArtifactCache {
    layout: CacheLayout,
    decoder: Arc<dyn DimensionDecoder>,
    local_sources: Vec<Arc<dyn LocalArtworkSource>>,
    remote: Arc<dyn RemoteArtworkProvider>,
}

impl fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local_sources: Vec<&str> =
            self.local_sources.iter().map(|s| s.name()).collect();

        f.debug_struct("ArtifactCache")
            .field("layout", &self.layout)
            .field("decoder", &type_name_of_val(self.decoder.as_ref()))
            .field("local_sources", &local_sources)
            .field("remote", &self.remote.name())
            .finish()
    }
}

impl ArtifactCache {
    /// Cache over `layout` backed by `remote`, with no local sources.
    pub fn new(
        layout: CacheLayout,
        remote: Arc<dyn RemoteArtworkProvider>,
    ) -> Self {
        Self {
            layout,
            decoder: Arc::new(ImageHeaderDecoder),
            local_sources: Vec::new(),
            remote,
        }
    }

    /// Local layouts consulted during a fill, in the given order.
    pub fn with_local_sources(
        mut self,
        sources: Vec<Arc<dyn LocalArtworkSource>>,
    ) -> Self {
        self.local_sources = sources;
        self
    }

    /// Replace the header decoder used for classification.
    pub fn with_decoder(mut self, decoder: Arc<dyn DimensionDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// The path layout this cache writes into.
    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Cache path of `kind` for `id`.
    pub fn path(&self, kind: ArtifactKind, id: ShowId) -> PathBuf {
        self.layout.path(kind, id)
    }

    /// Whether a regular file is cached for `kind`. Advisory: any stat
    /// failure other than not-found is logged and reported as not cached.
    pub async fn exists(&self, kind: ArtifactKind, id: ShowId) -> bool {
        let path = self.layout.path(kind, id);
        debug!(path = %path.display(), "checking if cached artifact exists");

        match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    show_id = %id,
                    %kind,
                    "unable to stat cached artifact, treating it as missing: {err}"
                );
                false
            }
        }
    }

    /// Every kind with no cached file for `id`.
    pub async fn needed(&self, id: ShowId) -> NeededArtifacts {
        let mut needed = NeededArtifacts::default();
        for kind in ArtifactKind::ALL {
            if !self.exists(kind, id).await {
                needed.insert(kind);
            }
        }
        needed
    }

    /// Classify image bytes with this cache's decoder.
    pub fn classify(&self, bytes: &[u8]) -> Option<ArtifactKind> {
        classify_with(self.decoder.as_ref(), bytes)
    }

    /// Read and classify an image file. Unreadable files classify as `None`.
    pub async fn classify_file(&self, path: &Path) -> Option<ArtifactKind> {
        match tokio::fs::read(path).await {
            Ok(bytes) => self.classify(&bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "couldn't check the type of image because it doesn't exist"
                );
                None
            }
            Err(err) => {
                warn!(path = %path.display(), "unable to read image: {err}");
                None
            }
        }
    }

    /// Copy a local image into the cache as `kind`, overwriting any cached
    /// file. Only full-size kinds are accepted; there is no resize step.
    pub async fn cache_from_file(
        &self,
        source: &Path,
        kind: ArtifactKind,
        id: ShowId,
    ) -> Result<()> {
        if kind.is_thumbnail() {
            error!(show_id = %id, %kind, "invalid cache image type for a file copy");
            return Err(CacheError::UnsupportedKind(kind));
        }

        match tokio::fs::metadata(source).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                error!(path = %source.display(), "image source is not a regular file");
                return Err(CacheError::NotFound(source.to_path_buf()));
            }
            Err(err) => {
                let err = CacheError::io(source, err);
                match &err {
                    CacheError::NotFound(_) => {
                        debug!(path = %source.display(), "image source does not exist")
                    }
                    _ => {
                        error!(path = %source.display(), "unable to read image source: {err}")
                    }
                }
                return Err(err);
            }
        }

        self.layout.ensure_directories().await.inspect_err(|err| {
            error!(
                root = %self.layout.root().display(),
                "unable to create image cache directories: {err}"
            );
        })?;

        let dest = self.layout.path(kind, id);
        info!(
            from = %source.display(),
            to = %dest.display(),
            show_id = %id,
            %kind,
            "copying image into cache"
        );

        tokio::fs::copy(source, &dest).await.map_err(|err| {
            error!(
                from = %source.display(),
                to = %dest.display(),
                "failed to copy image into cache: {err}"
            );
            CacheError::Io { path: dest, source: err }
        })?;

        Ok(())
    }

    /// Retrieve `kind` from the remote provider and persist it at the cache
    /// path. Failures are returned as-is; there is no retry here.
    pub async fn cache_from_provider(
        &self,
        show: &ShowRef,
        kind: ArtifactKind,
    ) -> Result<()> {
        let dest = self.layout.path(kind, show.id);
        let provider = self.remote.name();

        let bytes = self
            .remote
            .retrieve_image(kind, show)
            .await
            .inspect_err(|err| {
                warn!(provider, show_id = %show.id, %kind, "unable to retrieve image: {err}");
            })?;

        self.remote
            .write_image(&bytes, &dest)
            .await
            .inspect_err(|err| {
                error!(
                    provider,
                    path = %dest.display(),
                    show_id = %show.id,
                    %kind,
                    "unable to write retrieved image: {err}"
                );
            })?;

        info!(provider, path = %dest.display(), show_id = %show.id, %kind, "cached image from provider");
        Ok(())
    }

    /// Bring the cached artwork for `show` up to date.
    ///
    /// Artwork found in the show directory is preferred; whatever is still
    /// missing afterwards is fetched remotely. Individual failures only leave
    /// that artifact missing. Outcomes are observable through [`Self::exists`].
    pub async fn fill(&self, show: &ShowRef) {
        debug!(show_id = %show.id, "checking if we need any cache images for show");

        let mut needed = self.needed(show.id).await;
        if needed.is_empty() {
            debug!(show_id = %show.id, "no new cache images needed, not retrieving new ones");
            return;
        }

        if needed.any_full_size() {
            if is_dir(show.location()).await {
                self.fill_from_show_dir(show, &mut needed).await;
            } else {
                warn!(
                    show_id = %show.id,
                    location = %show.location().display(),
                    "unable to search for images in show dir because it doesn't exist"
                );
            }
        }

        for kind in ArtifactKind::FETCH_ORDER {
            debug!(show_id = %show.id, %kind, needed = needed.contains(kind), "seeing if we still need an image");
            if !needed.contains(kind) {
                continue;
            }

            if self.cache_from_provider(show, kind).await.is_ok() {
                needed.mark_filled(kind);
            }
        }

        info!(show_id = %show.id, missing = needed.len(), "done cache check");
    }

    async fn fill_from_show_dir(
        &self,
        show: &ShowRef,
        needed: &mut NeededArtifacts,
    ) {
        for source in &self.local_sources {
            if !source.enabled() {
                continue;
            }

            debug!(
                provider = source.name(),
                show_id = %show.id,
                "checking if we can use the show image from the metadata"
            );

            let Some(path) = source.poster_path(show) else {
                continue;
            };
            if !is_file(&path).await {
                continue;
            }

            let Some(kind) = self.classify_file(&path).await else {
                warn!(
                    provider = source.name(),
                    path = %path.display(),
                    "unable to retrieve image type, not using the image"
                );
                continue;
            };

            if !needed.contains(kind) {
                debug!(path = %path.display(), %kind, "image type already cached, skipping");
                continue;
            }

            debug!(
                path = %path.display(),
                %kind,
                "found an image in the show dir that doesn't exist in the cache, caching it"
            );
            if self.cache_from_file(&path, kind, show.id).await.is_ok() {
                needed.mark_filled(kind);
            }
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
