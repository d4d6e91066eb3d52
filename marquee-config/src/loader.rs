use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use marquee_core::providers::{MetadataLayout, TMDB_IMAGE_BASE, TMDB_V3_BASE};

use crate::{
    models::{
        CacheConfig, Config, ConfigMetadata, MetadataConfig, PostProcessConfig,
        TmdbConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("marquee.toml"),
        PathBuf::from("config/marquee.toml"),
    ]
});

const DEFAULT_CACHE_ROOT: &str = "./cache";
const DEFAULT_LOCAL_SOURCES: [MetadataLayout; 2] =
    [MetadataLayout::Kodi, MetadataLayout::MediaBrowser];
const DEFAULT_POSTPROCESS_URL: &str = "http://localhost:8081";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inputs that pick where configuration is read from.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    /// Explicit TOML file; must exist when set.
    pub config_path: Option<PathBuf>,
    /// `.env` file to load instead of searching for one.
    pub env_file: Option<PathBuf>,
}

/// Builds a [`Config`] from file, `.env`, environment and defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    /// Loader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with explicit options.
    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    /// Read this TOML file.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Load this `.env` file.
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, gather the process environment and compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose from an already-gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(explicit) = &self.options.config_path {
            (Some(explicit.clone()), true)
        } else if let Some(from_env) = &env.config_path {
            (Some(from_env.clone()), true)
        } else {
            (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            )
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        debug!(path = %path.display(), "reading configuration file");
        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No marquee.toml detected; falling back to environment variables",
            "Create marquee.toml or point MARQUEE_CONFIG at a configuration file",
        );
    }

    let FileConfig {
        cache: file_cache,
        metadata: file_metadata,
        tmdb: file_tmdb,
        postprocess: file_postprocess,
    } = file_config.unwrap_or_default();

    let cache_root = env
        .cache_root
        .or(file_cache.root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_ROOT));
    let cache = CacheConfig {
        root: absolutize(&cache_root)?,
    };

    let local_sources = match env.local_sources.or(file_metadata.local_sources) {
        Some(names) => resolve_layouts(&names, &mut warnings),
        None => DEFAULT_LOCAL_SOURCES.to_vec(),
    };
    let metadata = MetadataConfig { local_sources };

    let tmdb = TmdbConfig {
        api_key: env
            .tmdb_api_key
            .or(file_tmdb.api_key)
            .filter(|key| !key.trim().is_empty()),
        language: env.tmdb_language.or(file_tmdb.language),
        api_base: file_tmdb
            .api_base
            .unwrap_or_else(|| TMDB_V3_BASE.to_string()),
        image_base: file_tmdb
            .image_base
            .unwrap_or_else(|| TMDB_IMAGE_BASE.to_string()),
        timeout: parse_timeout(
            "tmdb.timeout",
            env.tmdb_timeout.or(file_tmdb.timeout),
        )?,
    };

    let raw_url = env
        .postprocess_url
        .or(file_postprocess.url)
        .unwrap_or_else(|| DEFAULT_POSTPROCESS_URL.to_string());
    let postprocess = PostProcessConfig {
        url: Url::parse(raw_url.trim()).map_err(|source| {
            ConfigLoadError::InvalidUrl {
                key: "postprocess.url",
                value: raw_url.clone(),
                source,
            }
        })?,
        username: env.postprocess_username.or(file_postprocess.username),
        password: env.postprocess_password.or(file_postprocess.password),
        timeout: parse_timeout(
            "postprocess.timeout",
            env.postprocess_timeout.or(file_postprocess.timeout),
        )?,
    };

    let config = Config {
        cache,
        metadata,
        tmdb,
        postprocess,
        source: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    warnings.extend(validation::check(&config));

    Ok((config, warnings))
}

fn resolve_layouts(
    names: &[String],
    warnings: &mut ConfigWarnings,
) -> Vec<MetadataLayout> {
    let mut layouts = Vec::with_capacity(names.len());
    for name in names {
        match MetadataLayout::parse(name) {
            Some(layout) if !layouts.contains(&layout) => layouts.push(layout),
            Some(_) => {}
            None => warnings.push_with_hint(
                format!("Unknown metadata layout '{name}' ignored"),
                "Known layouts: kodi, kodi_12plus, mediabrowser, ps3, wdtv, tivo, mede8er",
            ),
        }
    }
    layouts
}

fn parse_timeout(
    key: &'static str,
    raw: Option<String>,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(value) => humantime::parse_duration(value.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration { key, value, source }
        }),
        None => Ok(DEFAULT_TIMEOUT),
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigLoadError> {
    std::path::absolute(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// An explicitly named config file does not exist.
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    /// The config file could not be read.
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// A URL value failed to parse.
    #[error("invalid URL for {key}: '{value}'")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// A duration value failed to parse.
    #[error("invalid duration for {key}: '{value}'")]
    InvalidDuration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    /// The `.env` file is malformed.
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

/// A loaded configuration with its warnings.
#[derive(Debug)]
pub struct ConfigLoad {
    /// The composed configuration.
    pub config: Config,
    /// Problems that did not stop loading.
    pub warnings: ConfigWarnings,
}
