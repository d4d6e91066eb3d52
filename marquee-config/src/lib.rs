//! Configuration loading for marquee.
//!
//! Values are layered, highest precedence first: process environment, a
//! `.env` file, a `marquee.toml` file, built-in defaults. The resulting
//! [`Config`] is handed explicitly to the artwork cache and the CLI; nothing
//! in `marquee-core` reads configuration on its own.

/// Layered loading and composition.
pub mod loader;
/// Composed configuration handed to the binaries.
pub mod models;
/// Raw file and environment inputs.
pub mod sources;
/// Non-fatal configuration warnings.
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    CacheConfig, Config, ConfigMetadata, MetadataConfig, PostProcessConfig,
    TmdbConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigWarning, ConfigWarnings};
