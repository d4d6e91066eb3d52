//! On-disk artwork cache.
//!
//! [`CacheLayout`] owns the directory layout and path derivation;
//! [`ArtifactCache`] answers existence queries and populates missing artwork
//! from the show directory or a remote provider.

mod artifact_cache;
mod layout;

pub use artifact_cache::{ArtifactCache, NeededArtifacts};
pub use layout::{CacheLayout, THUMBNAILS_DIR};
