use crate::models::Config;

/// One non-fatal configuration problem.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// What is wrong.
    pub message: String,
    /// How to fix it.
    pub hint: Option<String>,
}

/// Warnings collected while loading.
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    /// Warnings in the order they were found.
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    /// Record a warning without a hint.
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    /// Record a warning with a fix hint.
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// No warnings were recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Append another set.
    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Iterate in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Non-fatal checks on a composed configuration.
pub fn check(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.tmdb.api_key.is_none() {
        warnings.push_with_hint(
            "TMDB_API_KEY not configured; missing artwork cannot be fetched remotely",
            "Set TMDB_API_KEY or add tmdb.api_key to marquee.toml",
        );
    }

    if config.metadata.local_sources.is_empty() {
        warnings.push(
            "No local metadata layouts enabled; show directories will not be searched for artwork",
        );
    }

    if config.postprocess.username.is_some() != config.postprocess.password.is_some() {
        warnings.push_with_hint(
            "Only one of postprocess username/password is set; requests will be sent without credentials",
            "Set both POSTPROCESS_USERNAME and POSTPROCESS_PASSWORD",
        );
    }

    warnings
}
