//! End-to-end tests of the load pipeline with stubbed providers,
//! registry, and store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lyrebird::{
    AlternateQuery, LoadOptions, LyricCandidate, LyricProvider, LyricsController, MemoryStore,
    QueryResolver, RecordingRegistry, Result, SearchAggregator, SongInformation,
};

struct NullRegistry;

#[async_trait]
impl RecordingRegistry for NullRegistry {
    async fn recordings_by_isrc(&self, _isrc: &str) -> Result<Vec<AlternateQuery>> {
        Ok(Vec::new())
    }
}

struct MockProvider {
    candidates: Vec<LyricCandidate>,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(candidates: Vec<LyricCandidate>) -> Arc<Self> {
        Arc::new(Self {
            candidates,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LyricProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        _song: &SongInformation,
        _limit: usize,
    ) -> Result<Vec<LyricCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

fn candidate(id: &str, title: &str) -> LyricCandidate {
    LyricCandidate {
        id: id.to_string(),
        source: "mock".to_string(),
        lyric_text: format!("[00:01.00]{title}"),
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        ..Default::default()
    }
}

fn song() -> SongInformation {
    SongInformation {
        title: "Test Song".to_string(),
        artists: vec!["Test Artist".to_string()],
        ..Default::default()
    }
}

fn controller_with(provider: Arc<MockProvider>) -> LyricsController {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });

    let resolver = Arc::new(QueryResolver::new(Arc::new(NullRegistry)));
    let aggregator = Arc::new(SearchAggregator::new(resolver, vec![provider]));
    LyricsController::new(aggregator, Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn live_search_publishes_the_best_candidate_and_remembers_it() {
    let provider = MockProvider::new(vec![
        candidate("m-0", "Test Song"),
        candidate("m-1", "Other Thing"),
    ]);
    let controller = controller_with(Arc::clone(&provider));

    assert!(controller.load(&song(), LoadOptions::default()).await);

    let lyrics = controller.current_lyrics().expect("lyrics published");
    assert_eq!(lyrics.metadata.get("source").map(String::as_str), Some("mock"));
    assert_eq!(lyrics.metadata.get("score").map(String::as_str), Some("70"));
    assert_eq!(lyrics.lines[0].text, "Test Song");

    let results = controller.last_search_results();
    assert_eq!(results[0].id, "m-0");
    assert_eq!(results.len(), 2);

    let remembered = controller.cached_selection(&song()).expect("remembered");
    assert_eq!(remembered.id, "m-0");
}

#[tokio::test]
async fn sidecar_file_outranks_everything() {
    let provider = MockProvider::new(vec![candidate("m-0", "Test Song")]);
    let controller = controller_with(Arc::clone(&provider));

    let options = LoadOptions {
        local_lrc: Some("[00:02.00]from disk".to_string()),
        ..Default::default()
    };
    assert!(controller.load(&song(), options).await);

    let lyrics = controller.current_lyrics().unwrap();
    assert_eq!(
        lyrics.metadata.get("source").map(String::as_str),
        Some("Local File")
    );
    assert_eq!(lyrics.metadata.get("score").map(String::as_str), Some("101"));
    // The pipeline never reached the network.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embedded_lyrics_outrank_the_search() {
    let provider = MockProvider::new(vec![candidate("m-0", "Test Song")]);
    let controller = controller_with(Arc::clone(&provider));

    let mut tagged = song();
    tagged.embedded_lyrics = Some("[00:03.00]from tags".to_string());
    assert!(controller.load(&tagged, LoadOptions::default()).await);

    let lyrics = controller.current_lyrics().unwrap();
    assert_eq!(
        lyrics.metadata.get("source").map(String::as_str),
        Some("Embedded (ID3)")
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn user_selection_round_trips_across_loads() {
    let provider = MockProvider::new(vec![
        candidate("m-0", "Test Song"),
        candidate("m-1", "Other Thing"),
    ]);
    let controller = controller_with(Arc::clone(&provider));

    assert!(controller.load(&song(), LoadOptions::default()).await);
    let index = controller
        .last_search_results()
        .iter()
        .position(|c| c.id == "m-1")
        .unwrap();
    assert!(controller.select(index, true));

    assert!(controller.load(&song(), LoadOptions::default()).await);

    let remembered = controller.cached_selection(&song()).unwrap();
    assert_eq!(remembered.id, "m-1");
    let lyrics = controller.current_lyrics().unwrap();
    assert_eq!(lyrics.lines[0].text, "Other Thing");
    // The second load was served from the store.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remembered_selection_beats_embedded_lyrics() {
    let provider = MockProvider::new(vec![
        candidate("m-0", "Test Song"),
        candidate("m-1", "Other Thing"),
    ]);
    let controller = controller_with(Arc::clone(&provider));

    assert!(controller.load(&song(), LoadOptions::default()).await);
    let index = controller
        .last_search_results()
        .iter()
        .position(|c| c.id == "m-1")
        .unwrap();
    assert!(controller.select(index, true));

    let mut tagged = song();
    tagged.embedded_lyrics = Some("[00:03.00]from tags".to_string());
    assert!(controller.load(&tagged, LoadOptions::default()).await);

    let lyrics = controller.current_lyrics().unwrap();
    assert_eq!(lyrics.metadata.get("source").map(String::as_str), Some("mock"));
    // The embedded candidate still joins the result list for manual picks.
    assert!(
        controller
            .last_search_results()
            .iter()
            .any(|c| c.source == "Embedded (ID3)")
    );
}

#[tokio::test]
async fn repeat_queries_are_served_from_the_search_cache() {
    let provider = MockProvider::new(vec![candidate("m-0", "Test Song")]);
    let controller = controller_with(Arc::clone(&provider));

    let mut first = song();
    first.persistence_id = Some("file-1".to_string());
    assert!(controller.load(&first, LoadOptions::default()).await);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    // Different file, same track metadata: the query-level cache hits.
    let mut second = song();
    second.persistence_id = Some("file-2".to_string());
    assert!(controller.load(&second, LoadOptions::default()).await);

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    let lyrics = controller.current_lyrics().unwrap();
    assert_eq!(lyrics.metadata.get("source").map(String::as_str), Some("mock"));
}

#[tokio::test]
async fn empty_search_fails_the_load() {
    let provider = MockProvider::new(Vec::new());
    let controller = controller_with(provider);

    assert!(!controller.load(&song(), LoadOptions::default()).await);
    assert!(controller.current_lyrics().is_none());
    assert!(controller.last_search_results().is_empty());
}
