//! Orchestrates the full load pipeline: local and embedded sources,
//! remembered selections, cached searches, and finally the live
//! multi-provider search with incremental auto-promotion.

pub mod persistence;

pub use persistence::{FileStore, LyricsStore, MemoryStore, PersistenceRecord};

use std::cmp::Reverse;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::aggregator::SearchAggregator;
use crate::model::{LyricCandidate, LyricsData, SongInformation};
use crate::parser::parse_enhanced_lrc;

/// Scores at or below this never auto-select.
const SELECT_MIN_SCORE: i32 = 45;
/// Reaching this locks the selection against further auto-promotion.
const LOCK_SCORE: i32 = 70;

const LOCAL_FILE_SOURCE: &str = "Local File";
const LOCAL_FILE_SCORE: i32 = 101;
const EMBEDDED_SOURCE: &str = "Embedded (ID3)";
const EMBEDDED_SCORE: i32 = 100;

const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Per-load options.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Maximum results requested from each provider.
    pub limit: usize,
    /// Contents of a sidecar `.lrc` file, when one exists next to the
    /// track. Outranks every other source.
    pub local_lrc: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            local_lrc: None,
        }
    }
}

/// Called with an immutable snapshot on every published lyrics change.
pub type LyricsListener = Box<dyn Fn(&LyricsData) + Send + Sync>;

#[derive(Default)]
struct ControllerState {
    current_lyrics: Option<LyricsData>,
    last_results: Vec<LyricCandidate>,
    current_song_key: String,
    selected_id: Option<String>,
    selected_score: i32,
    locked: bool,
}

/// Owns the active lyrics and the per-track selection memory.
///
/// All state mutation happens on the caller's context; provider results
/// rejoin it through the aggregator's partial-batch callback. A new
/// `load` advances a monotonic request token, and callbacks carrying a
/// stale token are dropped on arrival.
pub struct LyricsController {
    aggregator: Arc<SearchAggregator>,
    store: Arc<dyn LyricsStore>,
    state: Mutex<ControllerState>,
    request_token: AtomicU64,
    listeners: Mutex<Vec<LyricsListener>>,
}

impl LyricsController {
    #[must_use]
    pub fn new(aggregator: Arc<SearchAggregator>, store: Arc<dyn LyricsStore>) -> Self {
        Self {
            aggregator,
            store,
            state: Mutex::new(ControllerState::default()),
            request_token: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Loads lyrics for a song, trying sources in priority order:
    /// sidecar file, embedded tag text, remembered selection, cached
    /// search, live search. Returns whether anything was published.
    pub async fn load(&self, song: &SongInformation, options: LoadOptions) -> bool {
        let persistence_key = song.persistence_key();
        let search_key = format!(
            "SEARCH:{}|{}|LIMIT:{}",
            song.title,
            song.primary_artist(),
            options.limit
        );
        let token = self.request_token.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.current_song_key = persistence_key.clone();
            state.current_lyrics = None;
            state.last_results.clear();
            state.selected_id = None;
            state.selected_score = 0;
            state.locked = false;
        }

        let local_candidate = options
            .local_lrc
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| {
                synthetic_candidate(song, &persistence_key, "local", LOCAL_FILE_SOURCE, LOCAL_FILE_SCORE, text)
            });
        let embedded_candidate = song
            .embedded_lyrics
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| {
                synthetic_candidate(song, &persistence_key, "embedded", EMBEDDED_SOURCE, EMBEDDED_SCORE, text)
            });

        let remembered = self.read_record(&persistence_key);
        let user_selection = remembered
            .as_ref()
            .and_then(|record| record.selected_id.clone());

        // A sidecar file or embedded text wins immediately unless the
        // user has explicitly picked something for this track before.
        if user_selection.is_none() {
            if let Some(local) = &local_candidate {
                let mut results = vec![local.clone()];
                results.extend(embedded_candidate.clone());
                self.state.lock().last_results = results;
                return self.publish_index(0);
            }
            if let Some(embedded) = &embedded_candidate {
                self.state.lock().last_results = vec![embedded.clone()];
                return self.publish_index(0);
            }
        }

        if let (Some(record), Some(selected_id)) = (&remembered, &user_selection) {
            let mut results = record.results.clone();
            for synthetic in [embedded_candidate.clone(), local_candidate.clone()]
                .into_iter()
                .flatten()
            {
                if !results.iter().any(|c| c.id == synthetic.id) {
                    results.insert(0, synthetic);
                }
            }
            let index = results
                .iter()
                .position(|c| &c.id == selected_id)
                .unwrap_or_else(|| {
                    tracing::warn!(key = %persistence_key, "remembered selection id is gone, using the top result");
                    0
                });
            self.state.lock().last_results = results;
            return self.publish_index(index);
        }

        if let Some(record) = self.read_record(&search_key)
            && !record.results.is_empty()
        {
            tracing::debug!(key = %search_key, "serving results from the search cache");
            self.state.lock().last_results = record.results;
            return self.publish_index(0);
        }

        let mut search_song = song.clone();
        let mut on_partial =
            |batch: &[LyricCandidate]| self.apply_partial_batch(token, batch);
        let mut results = self
            .aggregator
            .search(&mut search_song, options.limit, Some(&mut on_partial))
            .await;

        if self.request_token.load(Ordering::SeqCst) != token {
            // A newer load owns the published state now.
            return false;
        }

        for synthetic in [embedded_candidate, local_candidate].into_iter().flatten() {
            if !results.iter().any(|c| c.id == synthetic.id) {
                results.insert(0, synthetic);
            }
        }
        if results.is_empty() {
            tracing::warn!(key = %persistence_key, "search produced no candidates");
            return false;
        }

        let (selected_id, locked) = {
            let mut state = self.state.lock();
            state.last_results = results.clone();
            (state.selected_id.clone(), state.locked)
        };

        self.write_record(
            &search_key,
            &PersistenceRecord {
                results: results.clone(),
                selected_id: None,
            },
        );
        let remembered_id = if locked {
            selected_id.unwrap_or_else(|| results[0].id.clone())
        } else {
            results[0].id.clone()
        };
        self.write_record(
            &persistence_key,
            &PersistenceRecord {
                results,
                selected_id: Some(remembered_id),
            },
        );

        if locked {
            // The locked pick stays published; higher-scoring stragglers
            // do not displace it.
            return true;
        }
        self.publish_index(0)
    }

    /// Publishes the candidate at `index` in the last search results and
    /// optionally remembers the choice. A user selection is final for
    /// the current request: auto-promotion never displaces it.
    pub fn select(&self, index: usize, save: bool) -> bool {
        let (candidate, key) = {
            let state = self.state.lock();
            (
                state.last_results.get(index).cloned(),
                state.current_song_key.clone(),
            )
        };
        let Some(candidate) = candidate else {
            tracing::warn!(index, "selection index out of range");
            return false;
        };
        if !self.publish_candidate(&candidate) {
            return false;
        }

        let results = {
            let mut state = self.state.lock();
            state.selected_id = Some(candidate.id.clone());
            state.selected_score = candidate.score;
            state.locked = true;
            state.last_results.clone()
        };

        if save && !key.is_empty() && !candidate.id.is_empty() {
            self.write_record(
                &key,
                &PersistenceRecord {
                    results,
                    selected_id: Some(candidate.id),
                },
            );
        }
        true
    }

    /// Snapshot of the currently published lyrics.
    #[must_use]
    pub fn current_lyrics(&self) -> Option<LyricsData> {
        self.state.lock().current_lyrics.clone()
    }

    /// The candidate list from the most recent load, best first.
    #[must_use]
    pub fn last_search_results(&self) -> Vec<LyricCandidate> {
        self.state.lock().last_results.clone()
    }

    /// The remembered selection for a song, if any, without loading.
    #[must_use]
    pub fn cached_selection(&self, song: &SongInformation) -> Option<LyricCandidate> {
        let record = self.read_record(&song.persistence_key())?;
        let selected_id = record.selected_id?;
        record.results.into_iter().find(|c| c.id == selected_id)
    }

    /// Registers a listener invoked on every published lyrics change.
    pub fn subscribe(&self, listener: LyricsListener) {
        self.listeners.lock().push(listener);
    }

    /// Merges a provider batch into the result list and promotes the new
    /// top candidate when it beats the current selection. Batches from a
    /// superseded load are dropped.
    fn apply_partial_batch(&self, token: u64, batch: &[LyricCandidate]) {
        if self.request_token.load(Ordering::SeqCst) != token {
            tracing::debug!("dropping stale partial batch");
            return;
        }

        let promoted = {
            let mut state = self.state.lock();
            for candidate in batch {
                if !state.last_results.iter().any(|c| c.id == candidate.id) {
                    state.last_results.push(candidate.clone());
                }
            }
            state.last_results.sort_by_key(|c| Reverse(c.score));

            if state.locked {
                None
            } else {
                state.last_results.first().cloned().filter(|top| {
                    top.score > SELECT_MIN_SCORE && top.score > state.selected_score
                })
            }
        };

        if let Some(top) = promoted
            && self.publish_candidate(&top)
        {
            let mut state = self.state.lock();
            state.selected_id = Some(top.id.clone());
            state.selected_score = top.score;
            if top.score >= LOCK_SCORE {
                state.locked = true;
            }
        }
    }

    /// Publishes the candidate at `index` of the current results and
    /// records it as the selection.
    fn publish_index(&self, index: usize) -> bool {
        let candidate = self.state.lock().last_results.get(index).cloned();
        let Some(candidate) = candidate else {
            return false;
        };
        if !self.publish_candidate(&candidate) {
            return false;
        }
        let mut state = self.state.lock();
        state.selected_id = Some(candidate.id.clone());
        state.selected_score = candidate.score;
        if candidate.score >= LOCK_SCORE {
            state.locked = true;
        }
        true
    }

    /// Parses a candidate and commits it as the current lyrics, fanning
    /// the snapshot out to subscribers. Publishing either fully succeeds
    /// or leaves the previous state untouched.
    fn publish_candidate(&self, candidate: &LyricCandidate) -> bool {
        if candidate.lyric_text.trim().is_empty() {
            return false;
        }
        let mut data = parse_enhanced_lrc(&candidate.lyric_text);
        data.metadata
            .insert("source".to_string(), candidate.source.clone());
        data.metadata
            .insert("score".to_string(), candidate.score.to_string());
        if !candidate.title.is_empty() {
            data.metadata
                .entry("title".to_string())
                .or_insert_with(|| candidate.title.clone());
        }
        if !candidate.artist.is_empty() {
            data.metadata
                .entry("artist".to_string())
                .or_insert_with(|| candidate.artist.clone());
        }

        self.state.lock().current_lyrics = Some(data.clone());
        for listener in self.listeners.lock().iter() {
            listener(&data);
        }
        true
    }

    fn read_record(&self, key: &str) -> Option<PersistenceRecord> {
        match self.store.get(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key, error = %e, "ignoring corrupt persistence record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "persistence read failed");
                None
            }
        }
    }

    fn write_record(&self, key: &str, record: &PersistenceRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize persistence record");
                return;
            }
        };
        if let Err(e) = self.store.put(key, &json) {
            tracing::warn!(key, error = %e, "persistence write failed");
        }
    }
}

fn synthetic_candidate(
    song: &SongInformation,
    key: &str,
    id_prefix: &str,
    source: &str,
    score: i32,
    lyric_text: &str,
) -> LyricCandidate {
    LyricCandidate {
        // Deterministic id so remembered selections survive restarts.
        id: format!("{id_prefix}:{key}"),
        source: source.to_string(),
        lyric_text: lyric_text.to_string(),
        title: song.title.clone(),
        artist: song.primary_artist().to_string(),
        album: song.album.clone(),
        duration_ms: song.duration_ms,
        score,
    }
}
