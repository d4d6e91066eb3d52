use std::io::Cursor;

use image::ImageReader;
use tracing::{debug, warn};

use crate::artifact::ArtifactKind;
use crate::error::{CacheError, Result};

/// Open ratio intervals (width / height), checked in order, first match wins.
///
/// Most posters are around 0.68 (680x1000), banners around 5.4 (758x140) and
/// fanart around 1.78 (1280x720, 1920x1080).
const RATIO_BANDS: [(f64, f64, ArtifactKind); 3] = [
    (0.55, 0.8, ArtifactKind::Poster),
    (5.0, 6.0, ArtifactKind::Banner),
    (1.7, 1.8, ArtifactKind::Fanart),
];

/// Pixel dimensions of a decoded image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of `width` by `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when the height is zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(f64::from(self.width) / f64::from(self.height))
        }
    }
}

/// Reads pixel dimensions out of raw image bytes.
pub trait DimensionDecoder: Send + Sync {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<Dimensions>;
}

/// [`DimensionDecoder`] backed by the `image` crate. Only the header is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHeaderDecoder;

impl DimensionDecoder for ImageHeaderDecoder {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<Dimensions> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CacheError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(CacheError::Decode("unrecognised image format".into()));
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CacheError::Decode(e.to_string()))?;

        Ok(Dimensions::new(width, height))
    }
}

/// Artifact kind whose aspect-ratio band strictly contains `ratio`.
pub fn kind_for_ratio(ratio: f64) -> Option<ArtifactKind> {
    RATIO_BANDS
        .iter()
        .find(|(low, high, _)| *low < ratio && ratio < *high)
        .map(|(_, _, kind)| *kind)
}

/// Artifact kind for decoded dimensions; zero height never matches.
pub fn kind_for_dimensions(dimensions: Dimensions) -> Option<ArtifactKind> {
    let Some(ratio) = dimensions.ratio() else {
        debug!(
            width = dimensions.width,
            "image has zero height, cannot determine its type"
        );
        return None;
    };

    let kind = kind_for_ratio(ratio);
    if kind.is_none() {
        warn!(ratio, "image has size ratio of {ratio:.4}, unknown type");
    }
    kind
}

/// Classifies raw image bytes with the given decoder. Never fails: anything
/// that cannot be decoded or does not fit a band is `None`.
pub fn classify_with(
    decoder: &dyn DimensionDecoder,
    bytes: &[u8],
) -> Option<ArtifactKind> {
    match decoder.decode_dimensions(bytes) {
        Ok(dimensions) => kind_for_dimensions(dimensions),
        Err(err) => {
            debug!("unable to read image dimensions: {err}");
            None
        }
    }
}

/// Classifies raw image bytes with [`ImageHeaderDecoder`].
pub fn classify(bytes: &[u8]) -> Option<ArtifactKind> {
    classify_with(&ImageHeaderDecoder, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn common_artwork_sizes_classify() {
        assert_eq!(
            kind_for_dimensions(Dimensions::new(680, 1000)),
            Some(ArtifactKind::Poster)
        );
        assert_eq!(
            kind_for_dimensions(Dimensions::new(758, 140)),
            Some(ArtifactKind::Banner)
        );
        assert_eq!(
            kind_for_dimensions(Dimensions::new(1920, 1080)),
            Some(ArtifactKind::Fanart)
        );
        assert_eq!(
            kind_for_dimensions(Dimensions::new(1280, 720)),
            Some(ArtifactKind::Fanart)
        );
    }

    #[test]
    fn band_edges_are_exclusive() {
        // 4/5 == 0.8 and 11/20 == 0.55 exactly as f64 literals.
        assert_eq!(kind_for_dimensions(Dimensions::new(4, 5)), None);
        assert_eq!(kind_for_dimensions(Dimensions::new(11, 20)), None);
        assert_eq!(kind_for_ratio(5.0), None);
        assert_eq!(kind_for_ratio(6.0), None);
        assert_eq!(kind_for_ratio(1.7), None);
        assert_eq!(kind_for_ratio(1.8), None);
    }

    #[test]
    fn unmatched_ratios_are_unknown() {
        assert_eq!(kind_for_dimensions(Dimensions::new(1000, 1000)), None);
        assert_eq!(kind_for_dimensions(Dimensions::new(0, 500)), None);
        assert_eq!(kind_for_ratio(3.0), None);
    }

    #[test]
    fn zero_height_is_unknown_without_dividing() {
        assert_eq!(Dimensions::new(758, 0).ratio(), None);
        assert_eq!(kind_for_dimensions(Dimensions::new(758, 0)), None);
    }

    #[test]
    fn decodes_header_from_encoded_image() {
        let dims = ImageHeaderDecoder
            .decode_dimensions(&png(68, 100))
            .expect("dimensions");
        assert_eq!(dims, Dimensions::new(68, 100));
        assert_eq!(classify(&png(68, 100)), Some(ArtifactKind::Poster));
        assert_eq!(classify(&png(192, 108)), Some(ArtifactKind::Fanart));
    }

    #[test]
    fn garbage_bytes_are_unknown() {
        assert!(matches!(
            ImageHeaderDecoder.decode_dimensions(b"definitely not an image"),
            Err(CacheError::Decode(_))
        ));
        assert_eq!(classify(b"definitely not an image"), None);
        assert_eq!(classify(&[]), None);
    }
}
