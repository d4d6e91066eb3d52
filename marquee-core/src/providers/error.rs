use std::path::PathBuf;

/// Failures of artwork collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The service answered with an unexpected status.
    #[error("API error: {0}")]
    ApiError(String),

    /// The show or the requested artwork does not exist remotely.
    #[error("Not found")]
    NotFound,

    /// The service asked the client to slow down.
    #[error("Rate limited")]
    RateLimited,

    /// The API key was rejected.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The request could not be completed.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response or an image URL could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A retrieval produced zero bytes.
    #[error("Provider returned no image data")]
    EmptyImage,

    /// Retrieved bytes could not be written to `path`.
    #[error("Failed to write image {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
