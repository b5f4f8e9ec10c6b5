//! Finds, scores, and synchronizes time-coded lyrics for audio tracks.
//!
//! Given a track's metadata, the [`LyricsController`] consults sidecar
//! files, embedded tag text, remembered selections, and several remote
//! providers concurrently; fuses the results with a fuzzy relevance
//! score; publishes the best candidate incrementally as batches arrive;
//! and remembers explicit user choices across sessions. Parsed lyrics
//! answer time-to-line and time-to-progress queries in logarithmic time
//! through the [`sync`] module.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lyrebird::{
//!     LoadOptions, LrclibProvider, LyricProvider, LyricsController, MemoryStore,
//!     MusicBrainzRegistry, NeteaseProvider, QqProvider, QueryResolver, SearchAggregator,
//!     SongInformation,
//! };
//!
//! # async fn run() -> lyrebird::Result<()> {
//! let resolver = Arc::new(QueryResolver::new(Arc::new(MusicBrainzRegistry::new()?)));
//! let providers: Vec<Arc<dyn LyricProvider>> = vec![
//!     Arc::new(NeteaseProvider::new()),
//!     Arc::new(QqProvider::new()),
//!     Arc::new(LrclibProvider::new()),
//! ];
//! let aggregator = Arc::new(SearchAggregator::new(resolver, providers));
//! let controller = LyricsController::new(aggregator, Arc::new(MemoryStore::new()));
//!
//! let song = SongInformation {
//!     title: "Test Song".to_string(),
//!     artists: vec!["Test Artist".to_string()],
//!     duration_ms: 200_000,
//!     ..Default::default()
//! };
//! if controller.load(&song, LoadOptions::default()).await {
//!     let lyrics = controller.current_lyrics().unwrap();
//!     println!("{} lines", lyrics.lines.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod controller;
pub mod error;
pub mod model;
pub mod parser;
pub mod providers;
pub mod resolver;
pub mod search;
pub mod sync;

pub use aggregator::{PartialCallback, SearchAggregator};
pub use controller::{
    FileStore, LoadOptions, LyricsController, LyricsListener, LyricsStore, MemoryStore,
    PersistenceRecord,
};
pub use error::{LyricsError, Result};
pub use model::{LyricCandidate, LyricLine, LyricsData, SearchAliases, SongInformation, Syllable};
pub use parser::{parse_enhanced_lrc, parse_lrc};
pub use providers::{LrclibProvider, LyricProvider, NeteaseProvider, QqProvider};
pub use resolver::{AlternateQuery, MusicBrainzRegistry, QueryResolver, RecordingRegistry};
pub use search::{score_candidate, similarity};
pub use sync::{find_line_index, line_progress};
