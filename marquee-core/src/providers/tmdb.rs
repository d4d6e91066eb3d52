use std::{
    fmt,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error};
use url::Url;

use super::{ProviderError, RemoteArtworkProvider};
use crate::artifact::ArtifactKind;
use crate::show::{ShowId, ShowRef};

/// Default TMDB image CDN base.
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
/// Default TMDB v3 API base.
pub const TMDB_V3_BASE: &str = "https://api.themoviedb.org/3";

/// Connection settings for [`TmdbArtworkProvider`].
#[derive(Clone)]
pub struct TmdbSettings {
    /// TMDB v3 API key.
    pub api_key: String,
    /// Preferred image language; `en` when unset.
    pub language: Option<String>,
    /// API base URL.
    pub api_base: String,
    /// Image CDN base URL.
    pub image_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TmdbSettings {
    /// Defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: None,
            api_base: TMDB_V3_BASE.to_string(),
            image_base: TMDB_IMAGE_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .field("api_base", &self.api_base)
            .field("image_base", &self.image_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One entry of a TMDB `/tv/{id}/images` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesImage {
    /// Path below the image CDN size segment.
    pub file_path: String,
    /// Width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Community rating used to pick the best image.
    #[serde(default)]
    pub vote_average: f64,
    /// Image language; `None` for language-neutral art.
    #[serde(default)]
    pub iso_639_1: Option<String>,
}

/// The `/tv/{id}/images` listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesImages {
    /// Portrait posters.
    #[serde(default)]
    pub posters: Vec<SeriesImage>,
    /// Wide backdrops, used as fanart.
    #[serde(default)]
    pub backdrops: Vec<SeriesImage>,
    /// Title logos, used as banners.
    #[serde(default)]
    pub logos: Vec<SeriesImage>,
}

impl SeriesImages {
    /// Best-voted candidate for `kind`. TMDB has no wide banner artwork, so
    /// banner kinds fall back to the series logo.
    pub fn best_for(&self, kind: ArtifactKind) -> Option<&SeriesImage> {
        let candidates = match kind {
            ArtifactKind::Poster | ArtifactKind::PosterThumbnail => &self.posters,
            ArtifactKind::Fanart => &self.backdrops,
            ArtifactKind::Banner | ArtifactKind::BannerThumbnail => &self.logos,
        };

        candidates
            .iter()
            .filter(|image| !image.file_path.is_empty())
            .reduce(|best, image| {
                if image.vote_average > best.vote_average {
                    image
                } else {
                    best
                }
            })
    }
}

#[derive(Debug, Clone, Serialize)]
struct SeriesImagesQuery<'a> {
    api_key: &'a str,
    include_image_language: String,
}

/// TMDB image size requested per artifact kind.
pub fn tmdb_size_for(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Poster | ArtifactKind::Banner => "w500",
        ArtifactKind::PosterThumbnail | ArtifactKind::BannerThumbnail => "w185",
        ArtifactKind::Fanart => "original",
    }
}

/// How long a series image listing is reused across kinds.
const LISTING_TTL: Duration = Duration::from_secs(300);

struct CachedListing {
    id: ShowId,
    fetched_at: Instant,
    images: Arc<SeriesImages>,
}

/// Remote artwork from TMDB, keyed by the show's TMDB series id.
///
/// The most recent series listing is kept briefly so a fill asking for
/// several kinds of one show lists its images once.
pub struct TmdbArtworkProvider {
    http: reqwest::Client,
    settings: TmdbSettings,
    last_listing: Mutex<Option<CachedListing>>,
}

impl fmt::Debug for TmdbArtworkProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbArtworkProvider")
            .field("settings", &self.settings)
            .finish()
    }
}

impl TmdbArtworkProvider {
    /// Build the HTTP client for `settings`.
    pub fn new(settings: TmdbSettings) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            settings,
            last_listing: Mutex::new(None),
        })
    }

    async fn get_tmdb_json<Q, T>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<T, ProviderError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return serde_json::from_slice(&body)
                .map_err(|e| ProviderError::ParseError(e.to_string()));
        }

        #[derive(Debug, Deserialize)]
        struct TmdbErrorBody {
            #[serde(default)]
            status_message: Option<String>,
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        Err(status_error(status.as_u16(), message))
    }

    /// List the artwork TMDB holds for a series.
    pub async fn series_images(
        &self,
        id: ShowId,
    ) -> Result<SeriesImages, ProviderError> {
        let language = self.settings.language.as_deref().unwrap_or("en");
        let query = SeriesImagesQuery {
            api_key: &self.settings.api_key,
            include_image_language: format!("{language},null"),
        };

        let url = format!(
            "{}/tv/{}/images",
            self.settings.api_base.trim_end_matches('/'),
            id
        );
        self.get_tmdb_json(&url, &query).await
    }

    /// Series listing, reused while it is fresh for the same show.
    async fn listing_for(
        &self,
        id: ShowId,
    ) -> Result<Arc<SeriesImages>, ProviderError> {
        if let Some(images) = self.fresh_listing(id) {
            debug!(show_id = %id, "reusing TMDB image listing");
            return Ok(images);
        }

        let images = Arc::new(self.series_images(id).await?);
        if let Ok(mut slot) = self.last_listing.lock() {
            *slot = Some(CachedListing {
                id,
                fetched_at: Instant::now(),
                images: Arc::clone(&images),
            });
        }
        Ok(images)
    }

    fn fresh_listing(&self, id: ShowId) -> Option<Arc<SeriesImages>> {
        let slot = self.last_listing.lock().ok()?;
        slot.as_ref()
            .filter(|cached| {
                cached.id == id && cached.fetched_at.elapsed() < LISTING_TTL
            })
            .map(|cached| Arc::clone(&cached.images))
    }

    /// Build a full image URL from a TMDB file path and size.
    pub fn image_url(
        &self,
        file_path: &str,
        size: &str,
    ) -> Result<Url, ProviderError> {
        let raw = format!(
            "{}/{}/{}",
            self.settings.image_base.trim_end_matches('/'),
            size,
            file_path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    async fn download(&self, url: Url) -> Result<Vec<u8>, ProviderError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(
                status.as_u16(),
                format!("image download failed with status {status}: {url}"),
            ));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn status_error(status: u16, message: String) -> ProviderError {
    match status {
        401 => ProviderError::InvalidApiKey,
        404 => ProviderError::NotFound,
        429 => ProviderError::RateLimited,
        _ => ProviderError::ApiError(message),
    }
}

#[async_trait]
impl RemoteArtworkProvider for TmdbArtworkProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn retrieve_image(
        &self,
        kind: ArtifactKind,
        show: &ShowRef,
    ) -> Result<Vec<u8>, ProviderError> {
        let images = self.listing_for(show.id).await.inspect_err(|e| {
            error!(show_id = %show.id, "failed to list TMDB images: {e}");
        })?;

        let Some(image) = images.best_for(kind) else {
            debug!(show_id = %show.id, %kind, "TMDB has no artwork of this kind");
            return Err(ProviderError::NotFound);
        };

        let url = self.image_url(&image.file_path, tmdb_size_for(kind))?;
        debug!(show_id = %show.id, %kind, %url, "downloading artwork");
        self.download(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGES_JSON: &str = r#"{
        "id": 1399,
        "backdrops": [
            {"file_path": "/b1.jpg", "width": 1920, "height": 1080, "vote_average": 5.2, "iso_639_1": null},
            {"file_path": "/b2.jpg", "width": 3840, "height": 2160, "vote_average": 5.8, "iso_639_1": null}
        ],
        "logos": [],
        "posters": [
            {"file_path": "/p1.jpg", "width": 680, "height": 1000, "vote_average": 5.5, "iso_639_1": "en"}
        ]
    }"#;

    #[test]
    fn picks_best_voted_image_per_kind() {
        let images: SeriesImages =
            serde_json::from_str(IMAGES_JSON).expect("parse");

        assert_eq!(
            images.best_for(ArtifactKind::Fanart).map(|i| i.file_path.as_str()),
            Some("/b2.jpg")
        );
        assert_eq!(
            images
                .best_for(ArtifactKind::PosterThumbnail)
                .map(|i| i.file_path.as_str()),
            Some("/p1.jpg")
        );
        assert!(images.best_for(ArtifactKind::Banner).is_none());
    }

    #[test]
    fn image_url_joins_base_size_and_path() {
        let provider =
            TmdbArtworkProvider::new(TmdbSettings::new("key")).expect("client");

        let url = provider
            .image_url("/p1.jpg", tmdb_size_for(ArtifactKind::PosterThumbnail))
            .expect("url");

        assert_eq!(url.as_str(), "https://image.tmdb.org/t/p/w185/p1.jpg");
    }

    #[test]
    fn status_codes_map_to_provider_errors() {
        assert!(matches!(
            status_error(401, String::new()),
            ProviderError::InvalidApiKey
        ));
        assert!(matches!(status_error(404, String::new()), ProviderError::NotFound));
        assert!(matches!(
            status_error(429, String::new()),
            ProviderError::RateLimited
        ));
        assert!(matches!(
            status_error(500, "boom".into()),
            ProviderError::ApiError(msg) if msg == "boom"
        ));
    }

    /// Serve every connection on a local port, recording request lines.
    fn serve_tmdb(listing: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                let mut request_line = String::new();
                reader.read_line(&mut request_line).expect("read");
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }
                let body: &[u8] = if request_line.contains("/tv/") {
                    listing.as_bytes()
                } else {
                    b"image-bytes"
                };
                seen.lock().unwrap().push(request_line.trim().to_string());
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });

        (base, requests)
    }

    #[tokio::test]
    async fn one_listing_serves_every_kind_of_a_show() {
        let (base, requests) = serve_tmdb(IMAGES_JSON);
        let mut settings = TmdbSettings::new("key");
        settings.api_base = base.clone();
        settings.image_base = base;
        settings.timeout = Duration::from_secs(5);
        let provider = TmdbArtworkProvider::new(settings).expect("client");
        let show = ShowRef::new(ShowId::new(1399), "/tv/show");

        let poster = provider
            .retrieve_image(ArtifactKind::Poster, &show)
            .await
            .expect("poster");
        let fanart = provider
            .retrieve_image(ArtifactKind::Fanart, &show)
            .await
            .expect("fanart");
        let banner = provider.retrieve_image(ArtifactKind::Banner, &show).await;

        assert_eq!(poster, b"image-bytes");
        assert_eq!(fanart, b"image-bytes");
        assert!(matches!(banner, Err(ProviderError::NotFound)));

        let requests = requests.lock().unwrap().clone();
        let listings = requests.iter().filter(|r| r.contains("/tv/1399/images")).count();
        assert_eq!(listings, 1, "{requests:?}");
        assert!(requests.iter().any(|r| r.starts_with("GET /w500/p1.jpg ")));
        assert!(requests.iter().any(|r| r.starts_with("GET /original/b2.jpg ")));
    }

    #[test]
    fn settings_debug_redacts_api_key() {
        let rendered = format!("{:?}", TmdbSettings::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
