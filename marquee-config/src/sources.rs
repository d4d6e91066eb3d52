use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    /// `[cache]`
    #[serde(default)]
    pub cache: FileCacheConfig,
    /// `[metadata]`
    #[serde(default)]
    pub metadata: FileMetadataConfig,
    /// `[tmdb]`
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    /// `[postprocess]`
    #[serde(default)]
    pub postprocess: FilePostProcessConfig,
}

/// `[cache]` table.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileCacheConfig {
    /// `cache.root`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// `[metadata]` table.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileMetadataConfig {
    /// `metadata.local_sources`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_sources: Option<Vec<String>>,
}

/// `[tmdb]` table.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileTmdbConfig {
    /// `tmdb.api_key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// `tmdb.language`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// `tmdb.api_base`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// `tmdb.image_base`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
    /// `tmdb.timeout`, humantime syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// `[postprocess]` table.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilePostProcessConfig {
    /// `postprocess.url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `postprocess.username`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// `postprocess.password`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// `postprocess.timeout`, humantime syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    /// `MARQUEE_CONFIG`
    pub config_path: Option<PathBuf>,
    /// `CACHE_DIR`
    pub cache_root: Option<PathBuf>,
    /// `METADATA_LOCAL_SOURCES`, comma separated.
    pub local_sources: Option<Vec<String>>,
    /// `TMDB_API_KEY`
    pub tmdb_api_key: Option<String>,
    /// `TMDB_LANG`
    pub tmdb_language: Option<String>,
    /// `TMDB_TIMEOUT`
    pub tmdb_timeout: Option<String>,
    /// `POSTPROCESS_URL`
    pub postprocess_url: Option<String>,
    /// `POSTPROCESS_USERNAME`
    pub postprocess_username: Option<String>,
    /// `POSTPROCESS_PASSWORD`
    pub postprocess_password: Option<String>,
    /// `POSTPROCESS_TIMEOUT`
    pub postprocess_timeout: Option<String>,
}

impl EnvConfig {
    /// Read from the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: var("MARQUEE_CONFIG").map(PathBuf::from),
            cache_root: var("CACHE_DIR").map(PathBuf::from),
            local_sources: var("METADATA_LOCAL_SOURCES").map(|raw| parse_csv(&raw)),
            tmdb_api_key: var("TMDB_API_KEY"),
            tmdb_language: var("TMDB_LANG"),
            tmdb_timeout: var("TMDB_TIMEOUT"),
            postprocess_url: var("POSTPROCESS_URL"),
            postprocess_username: var("POSTPROCESS_USERNAME"),
            postprocess_password: var("POSTPROCESS_PASSWORD"),
            postprocess_timeout: var("POSTPROCESS_TIMEOUT"),
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
