use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, warn};

use marquee_config::Config;
use marquee_core::{
    ArtifactCache, ArtifactKind, ShowRef,
    providers::{ProviderError, RemoteArtworkProvider, TmdbArtworkProvider},
};

/// Stand-in used when no TMDB key is configured. Every retrieval misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl RemoteArtworkProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn retrieve_image(
        &self,
        _kind: ArtifactKind,
        _show: &ShowRef,
    ) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::NotFound)
    }
}

/// Wire an [`ArtifactCache`] from loaded configuration.
pub fn build_cache(config: &Config) -> anyhow::Result<ArtifactCache> {
    let remote: Arc<dyn RemoteArtworkProvider> = match config.tmdb_settings() {
        Some(settings) => {
            let provider = TmdbArtworkProvider::new(settings)
                .context("failed to build TMDB client")?;
            info!(provider = "tmdb", "remote artwork provider ready");
            Arc::new(provider)
        }
        None => {
            warn!("no TMDB API key; remote artwork retrieval disabled");
            Arc::new(OfflineProvider)
        }
    };

    Ok(ArtifactCache::new(config.cache_layout(), remote)
        .with_local_sources(config.local_sources()))
}
