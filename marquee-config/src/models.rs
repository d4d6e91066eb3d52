use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use marquee_core::{
    CacheLayout,
    providers::{LocalArtworkSource, MetadataLayout, TmdbSettings},
};
use url::Url;

/// Name of the artwork directory beneath the cache root.
pub const IMAGES_DIR: &str = "images";

/// Fully composed runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache location.
    pub cache: CacheConfig,
    /// Local metadata layouts.
    pub metadata: MetadataConfig,
    /// Remote provider settings.
    pub tmdb: TmdbConfig,
    /// Post-processing endpoint.
    pub postprocess: PostProcessConfig,
    /// Where the values came from.
    pub source: ConfigMetadata,
}

impl Config {
    /// Layout rooted at `<cache.root>/images`.
    pub fn cache_layout(&self) -> CacheLayout {
        CacheLayout::new(self.cache.images_dir())
    }

    /// Enabled local layouts, in configured order.
    pub fn local_sources(&self) -> Vec<Arc<dyn LocalArtworkSource>> {
        self.metadata
            .local_sources
            .iter()
            .map(|layout| {
                Arc::new(layout.source()) as Arc<dyn LocalArtworkSource>
            })
            .collect()
    }

    /// TMDB client settings, when an API key is configured.
    pub fn tmdb_settings(&self) -> Option<TmdbSettings> {
        let api_key = self.tmdb.api_key.clone()?;
        Some(TmdbSettings {
            api_key,
            language: self.tmdb.language.clone(),
            api_base: self.tmdb.api_base.clone(),
            image_base: self.tmdb.image_base.clone(),
            timeout: self.tmdb.timeout,
        })
    }
}

/// Cache location settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Absolute cache root.
    pub root: PathBuf,
}

impl CacheConfig {
    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/images`
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }
}

/// Local metadata layout settings.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// Enabled layouts, searched in order.
    pub local_sources: Vec<MetadataLayout>,
}

/// TMDB settings.
#[derive(Clone)]
pub struct TmdbConfig {
    /// API key; remote retrieval is disabled without one.
    pub api_key: Option<String>,
    /// Preferred image language.
    pub language: Option<String>,
    /// API base URL.
    pub api_base: String,
    /// Image CDN base URL.
    pub image_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("api_base", &self.api_base)
            .field("image_base", &self.image_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Post-processing endpoint settings.
#[derive(Clone)]
pub struct PostProcessConfig {
    /// Base URL of the media manager.
    pub url: Url,
    /// Basic-auth user.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl PostProcessConfig {
    /// Basic-auth credentials, only when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for PostProcessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostProcessConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    /// The TOML file that was read, if any.
    pub config_path: Option<PathBuf>,
    /// Whether a `.env` file was loaded.
    pub env_file_loaded: bool,
}
