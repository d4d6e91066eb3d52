use std::{
    fmt,
    num::ParseIntError,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Indexer identifier of a show.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShowId(u64);

impl ShowId {
    /// Wrap a raw indexer id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw indexer id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShowId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ShowId)
    }
}

impl From<u64> for ShowId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The host's view of a show, as far as the cache is concerned.
///
/// `location` is the show's own media directory and may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRef {
    /// Indexer id used in cache file names.
    pub id: ShowId,
    /// The show's media directory.
    pub location: PathBuf,
}

impl ShowRef {
    /// Reference to show `id` stored at `location`.
    pub fn new(id: impl Into<ShowId>, location: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
        }
    }

    /// The show's media directory.
    pub fn location(&self) -> &Path {
        &self.location
    }
}
