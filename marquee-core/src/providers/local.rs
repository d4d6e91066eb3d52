use std::{fmt, path::PathBuf};

use super::LocalArtworkSource;
use crate::show::ShowRef;

/// Media-center metadata layouts whose show-directory artwork can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataLayout {
    /// Kodi (XBMC) before version 12.
    Kodi,
    /// Kodi 12 and later.
    Kodi12Plus,
    /// MediaBrowser.
    MediaBrowser,
    /// Sony PS3.
    Ps3,
    /// WD TV Live.
    Wdtv,
    /// TiVo; carries no show image.
    Tivo,
    /// Mede8er.
    Mede8er,
}

impl MetadataLayout {
    /// Every supported layout.
    pub const ALL: [MetadataLayout; 7] = [
        MetadataLayout::Kodi,
        MetadataLayout::Kodi12Plus,
        MetadataLayout::MediaBrowser,
        MetadataLayout::Ps3,
        MetadataLayout::Wdtv,
        MetadataLayout::Tivo,
        MetadataLayout::Mede8er,
    ];

    /// Configuration name of the layout.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataLayout::Kodi => "kodi",
            MetadataLayout::Kodi12Plus => "kodi_12plus",
            MetadataLayout::MediaBrowser => "mediabrowser",
            MetadataLayout::Ps3 => "ps3",
            MetadataLayout::Wdtv => "wdtv",
            MetadataLayout::Tivo => "tivo",
            MetadataLayout::Mede8er => "mede8er",
        }
    }

    /// File name of the show-level poster, relative to the show directory.
    /// TiVo metadata carries no show image.
    pub fn poster_file_name(self) -> Option<&'static str> {
        match self {
            MetadataLayout::Kodi | MetadataLayout::Kodi12Plus => {
                Some("poster.jpg")
            }
            MetadataLayout::MediaBrowser
            | MetadataLayout::Wdtv
            | MetadataLayout::Mede8er => Some("folder.jpg"),
            MetadataLayout::Ps3 => Some("cover.jpg"),
            MetadataLayout::Tivo => None,
        }
    }

    /// Case-insensitive lookup by configuration name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        MetadataLayout::ALL
            .into_iter()
            .find(|layout| value.eq_ignore_ascii_case(layout.as_str()))
    }

    /// An enabled source for this layout.
    pub fn source(self) -> LocalLayoutSource {
        LocalLayoutSource::new(self, true)
    }
}

impl fmt::Display for MetadataLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata layout as a local artwork source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalLayoutSource {
    layout: MetadataLayout,
    enabled: bool,
}

impl LocalLayoutSource {
    /// Source for `layout`, switched on or off.
    pub fn new(layout: MetadataLayout, enabled: bool) -> Self {
        Self { layout, enabled }
    }

    /// The wrapped layout.
    pub fn layout(&self) -> MetadataLayout {
        self.layout
    }
}

impl LocalArtworkSource for LocalLayoutSource {
    fn name(&self) -> &'static str {
        self.layout.as_str()
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn poster_path(&self, show: &ShowRef) -> Option<PathBuf> {
        self.layout
            .poster_file_name()
            .map(|file| show.location().join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::{ShowId, ShowRef};

    #[test]
    fn poster_paths_resolve_inside_show_directory() {
        let show = ShowRef::new(ShowId::new(7), "/tv/Show");

        assert_eq!(
            MetadataLayout::Kodi.source().poster_path(&show),
            Some(PathBuf::from("/tv/Show/poster.jpg"))
        );
        assert_eq!(
            MetadataLayout::MediaBrowser.source().poster_path(&show),
            Some(PathBuf::from("/tv/Show/folder.jpg"))
        );
        assert_eq!(
            MetadataLayout::Ps3.source().poster_path(&show),
            Some(PathBuf::from("/tv/Show/cover.jpg"))
        );
        assert_eq!(MetadataLayout::Tivo.source().poster_path(&show), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(MetadataLayout::parse("KODI"), Some(MetadataLayout::Kodi));
        assert_eq!(
            MetadataLayout::parse(" kodi_12plus "),
            Some(MetadataLayout::Kodi12Plus)
        );
        assert_eq!(MetadataLayout::parse("xbmc"), None);
    }

    #[test]
    fn disabled_source_reports_disabled() {
        let source = LocalLayoutSource::new(MetadataLayout::Wdtv, false);
        assert!(!source.enabled());
        assert_eq!(source.name(), "wdtv");
    }
}
