use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kinds of artwork cached per show.
///
/// The set is closed. Full-size kinds live in the cache root; thumbnail kinds
/// live in the `thumbnails/` directory beneath it and share the file label of
/// their full-size counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Portrait show poster.
    Poster,
    /// Wide show banner.
    Banner,
    /// Widescreen background art.
    Fanart,
    /// Small copy of the poster.
    PosterThumbnail,
    /// Small copy of the banner.
    BannerThumbnail,
}

impl ArtifactKind {
    /// Every kind, in declaration order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Poster,
        ArtifactKind::Banner,
        ArtifactKind::Fanart,
        ArtifactKind::PosterThumbnail,
        ArtifactKind::BannerThumbnail,
    ];

    /// Order in which a fill asks the remote provider for missing kinds.
    pub const FETCH_ORDER: [ArtifactKind; 5] = [
        ArtifactKind::Poster,
        ArtifactKind::Banner,
        ArtifactKind::PosterThumbnail,
        ArtifactKind::BannerThumbnail,
        ArtifactKind::Fanart,
    ];

    /// Kinds that can be copied in from a file in the show directory.
    pub const FULL_SIZE: [ArtifactKind; 3] = [
        ArtifactKind::Poster,
        ArtifactKind::Banner,
        ArtifactKind::Fanart,
    ];

    /// Canonical name, also the kind name handed to metadata providers.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Poster => "poster",
            ArtifactKind::Banner => "banner",
            ArtifactKind::Fanart => "fanart",
            ArtifactKind::PosterThumbnail => "poster_thumb",
            ArtifactKind::BannerThumbnail => "banner_thumb",
        }
    }

    /// Label embedded in the cached file name (`<id>.<label>.jpg`).
    pub fn file_label(self) -> &'static str {
        match self {
            ArtifactKind::Poster | ArtifactKind::PosterThumbnail => "poster",
            ArtifactKind::Banner | ArtifactKind::BannerThumbnail => "banner",
            ArtifactKind::Fanart => "fanart",
        }
    }

    /// Whether this kind lives in the thumbnails directory.
    pub fn is_thumbnail(self) -> bool {
        matches!(
            self,
            ArtifactKind::PosterThumbnail | ArtifactKind::BannerThumbnail
        )
    }

    /// Parses a kind name using ASCII-case-insensitive matching. Accepts the
    /// long `*_thumbnail` spelling alongside the canonical `*_thumb`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| value.eq_ignore_ascii_case(kind.as_str()))
            .or_else(|| {
                if value.eq_ignore_ascii_case("poster_thumbnail") {
                    Some(ArtifactKind::PosterThumbnail)
                } else if value.eq_ignore_ascii_case("banner_thumbnail") {
                    Some(ArtifactKind::BannerThumbnail)
                } else {
                    None
                }
            })
    }
}

/// Returned when a string names no artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown artifact kind '{0}' (expected poster, banner, fanart, poster_thumb or banner_thumb)")]
pub struct ParseArtifactKindError(String);

impl FromStr for ArtifactKind {
    type Err = ParseArtifactKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::parse(s).ok_or_else(|| ParseArtifactKindError(s.to_string()))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ArtifactKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArtifactKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        ArtifactKind::parse(&value).ok_or_else(|| {
            serde::de::Error::custom(ParseArtifactKindError(value))
        })
    }
}
