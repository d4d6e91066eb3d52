mod support;

use std::sync::Arc;

use marquee_core::{
    ArtifactCache, ArtifactKind, CacheLayout, ShowId, ShowRef,
    providers::{LocalArtworkSource, LocalLayoutSource, MetadataLayout},
};
use support::{RecordingProvider, png};

struct Fixture {
    _dir: tempfile::TempDir,
    remote: Arc<RecordingProvider>,
    cache: ArtifactCache,
    show: ShowRef,
}

fn fixture(
    remote: RecordingProvider,
    sources: Vec<Arc<dyn LocalArtworkSource>>,
) -> Fixture {
    let dir = tempfile::tempdir().expect("tmpdir");
    let show_dir = dir.path().join("tv").join("Show");
    std::fs::create_dir_all(&show_dir).expect("show dir");

    let remote = Arc::new(remote);
    let cache = ArtifactCache::new(
        CacheLayout::new(dir.path().join("cache").join("images")),
        remote.clone(),
    )
    .with_local_sources(sources);

    Fixture {
        show: ShowRef::new(ShowId::new(12345), show_dir),
        _dir: dir,
        remote,
        cache,
    }
}

#[tokio::test]
async fn empty_show_dir_fetches_all_five_kinds() {
    let fx = fixture(
        RecordingProvider::default(),
        vec![Arc::new(MetadataLayout::Kodi.source())],
    );

    fx.cache.fill(&fx.show).await;

    assert_eq!(fx.remote.retrieved(), ArtifactKind::FETCH_ORDER.to_vec());
    for kind in ArtifactKind::ALL {
        assert!(fx.cache.exists(kind, fx.show.id).await, "{kind} missing");
    }
}

#[tokio::test]
async fn second_fill_is_a_no_op() {
    let fx = fixture(RecordingProvider::default(), Vec::new());

    fx.cache.fill(&fx.show).await;
    assert_eq!(fx.remote.write_count(), 5);

    fx.cache.fill(&fx.show).await;

    assert_eq!(fx.remote.retrieved().len(), 5);
    assert_eq!(fx.remote.write_count(), 5);
}

#[tokio::test]
async fn local_poster_is_copied_instead_of_fetched() {
    let fx = fixture(
        RecordingProvider::default(),
        vec![Arc::new(MetadataLayout::Kodi.source())],
    );
    let poster = png(680, 1000);
    std::fs::write(fx.show.location().join("poster.jpg"), &poster).expect("poster");

    fx.cache.fill(&fx.show).await;

    assert_eq!(
        fx.remote.retrieved(),
        vec![
            ArtifactKind::Banner,
            ArtifactKind::PosterThumbnail,
            ArtifactKind::BannerThumbnail,
            ArtifactKind::Fanart,
        ]
    );
    assert_eq!(
        std::fs::read(fx.cache.layout().poster_path(fx.show.id)).expect("read"),
        poster
    );
}

#[tokio::test]
async fn first_enabled_source_wins_for_a_kind() {
    let fx = fixture(
        RecordingProvider::default(),
        vec![
            Arc::new(LocalLayoutSource::new(MetadataLayout::Ps3, false)),
            Arc::new(MetadataLayout::MediaBrowser.source()),
            Arc::new(MetadataLayout::Kodi.source()),
        ],
    );
    let location = fx.show.location().to_path_buf();
    std::fs::write(location.join("cover.jpg"), png(68, 100)).expect("cover");
    let folder = png(70, 100);
    std::fs::write(location.join("folder.jpg"), &folder).expect("folder");
    std::fs::write(location.join("poster.jpg"), png(60, 100)).expect("poster");

    fx.cache.fill(&fx.show).await;

    assert_eq!(
        std::fs::read(fx.cache.layout().poster_path(fx.show.id)).expect("read"),
        folder
    );
    assert!(!fx.remote.retrieved().contains(&ArtifactKind::Poster));
}

#[tokio::test]
async fn local_fanart_and_banner_fill_their_own_kinds() {
    let fx = fixture(
        RecordingProvider::default(),
        vec![
            Arc::new(MetadataLayout::Kodi.source()),
            Arc::new(MetadataLayout::Wdtv.source()),
        ],
    );
    let location = fx.show.location().to_path_buf();
    std::fs::write(location.join("poster.jpg"), png(192, 108)).expect("fanart");
    std::fs::write(location.join("folder.jpg"), png(758, 140)).expect("banner");

    fx.cache.fill(&fx.show).await;

    assert_eq!(
        fx.remote.retrieved(),
        vec![
            ArtifactKind::Poster,
            ArtifactKind::PosterThumbnail,
            ArtifactKind::BannerThumbnail,
        ]
    );
}

#[tokio::test]
async fn unclassifiable_local_image_is_ignored() {
    let fx = fixture(
        RecordingProvider::default(),
        vec![Arc::new(MetadataLayout::Kodi.source())],
    );
    std::fs::write(fx.show.location().join("poster.jpg"), png(100, 100))
        .expect("square");

    fx.cache.fill(&fx.show).await;

    assert_eq!(fx.remote.retrieved(), ArtifactKind::FETCH_ORDER.to_vec());
}

#[tokio::test]
async fn provider_failures_leave_only_those_kinds_missing() {
    let fx = fixture(
        RecordingProvider::failing(&[ArtifactKind::Banner, ArtifactKind::BannerThumbnail]),
        Vec::new(),
    );

    fx.cache.fill(&fx.show).await;

    assert_eq!(fx.remote.retrieved().len(), 5);
    let needed = fx.cache.needed(fx.show.id).await;
    assert_eq!(
        needed.iter().collect::<Vec<_>>(),
        vec![ArtifactKind::Banner, ArtifactKind::BannerThumbnail]
    );

    // A later pass only asks for what is still missing.
    fx.cache.fill(&fx.show).await;
    assert_eq!(fx.remote.retrieved().len(), 7);
}

#[tokio::test]
async fn missing_show_dir_still_fetches_remotely() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let remote = Arc::new(RecordingProvider::default());
    let cache = ArtifactCache::new(CacheLayout::new(dir.path().join("images")), remote.clone())
        .with_local_sources(vec![Arc::new(MetadataLayout::Kodi.source())]);
    let show = ShowRef::new(ShowId::new(1), dir.path().join("gone"));

    cache.fill(&show).await;

    assert_eq!(remote.retrieved().len(), 5);
    assert!(cache.exists(ArtifactKind::Fanart, show.id).await);
}
