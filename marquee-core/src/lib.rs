//! # Marquee Core
//!
//! Show artwork cache for a personal video recorder.
//!
//! ## Overview
//!
//! `marquee-core` keeps a flat on-disk cache of show artwork:
//!
//! - **Layout**: deterministic `<root>/<id>.<label>.jpg` paths, with thumbnails
//!   under `<root>/thumbnails/`
//! - **Classification**: sorts an unlabeled image into poster, banner or fanart
//!   from its pixel aspect ratio
//! - **Population**: copies artwork already sitting in the show directory, then
//!   fetches whatever is still missing from a remote provider
//!
//! ## Architecture
//!
//! - [`artifact`]: the closed set of artifact kinds
//! - [`cache`]: path layout and the [`ArtifactCache`] operations
//! - [`classify`]: dimension decoding and aspect-ratio classification
//! - [`providers`]: local-layout and remote collaborator traits plus built-ins
//! - [`show`]: the show reference supplied by the host
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use marquee_core::{
//!     ArtifactCache, CacheLayout, ShowId, ShowRef,
//!     providers::{
//!         LocalArtworkSource, MetadataLayout, TmdbArtworkProvider, TmdbSettings,
//!     },
//! };
//!
//! async fn refresh() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = TmdbArtworkProvider::new(TmdbSettings::new("api-key"))?;
//!     let kodi: Arc<dyn LocalArtworkSource> = Arc::new(MetadataLayout::Kodi.source());
//!     let cache = ArtifactCache::new(
//!         CacheLayout::new("/var/cache/marquee/images"),
//!         Arc::new(remote),
//!     )
//!     .with_local_sources(vec![kodi]);
//!
//!     let show = ShowRef::new(ShowId::new(12345), "/srv/tv/Some Show");
//!     cache.fill(&show).await;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Artifact kinds and their labels
pub mod artifact;

/// Cache layout and the artifact cache itself
pub mod cache;

/// Image dimension decoding and aspect-ratio classification
pub mod classify;

/// Error types and error handling utilities
pub mod error;

/// Metadata provider collaborators (local layouts and remote sources)
pub mod providers;

/// Show identifiers and references
pub mod show;

pub use artifact::ArtifactKind;
pub use cache::{ArtifactCache, CacheLayout, NeededArtifacts};
pub use classify::{
    DimensionDecoder, Dimensions, ImageHeaderDecoder, classify,
    kind_for_dimensions, kind_for_ratio,
};
pub use error::{CacheError, Result};
pub use show::{ShowId, ShowRef};
