//! Expands a track into prioritized alternate search queries.
//!
//! When a song carries an ISRC, an external recording registry supplies
//! the titles and artist names the recording is published under; those
//! become alternate queries, ordered by script so that Chinese entries
//! outrank Japanese entries outrank everything else. Concurrent lookups
//! of the same ISRC are coalesced into a single registry call whose
//! result is cached for the life of the resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Deserialize;
use tokio::time::Instant;

use crate::error::{LyricsError, Result};
use crate::model::SongInformation;
use crate::search::similarity;

/// One alternate `{title, artist}` query form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateQuery {
    pub title: String,
    pub artist: String,
}

impl AlternateQuery {
    fn dedup_key(&self) -> String {
        format!("{}|{}", self.title, self.artist)
    }
}

/// Read-only source of the recordings registered under an ISRC.
#[async_trait]
pub trait RecordingRegistry: Send + Sync {
    async fn recordings_by_isrc(&self, isrc: &str) -> Result<Vec<AlternateQuery>>;
}

/// Below this best-similarity the registry titles are considered a
/// manual override of the tags, and the tag pair is searched first.
const OVERRIDE_SIMILARITY_THRESHOLD: f64 = 0.8;

type SharedLookup = Shared<BoxFuture<'static, Arc<Vec<AlternateQuery>>>>;

/// Resolves a song into an ordered list of search queries.
pub struct QueryResolver {
    registry: Arc<dyn RecordingRegistry>,
    in_flight: DashMap<String, SharedLookup>,
}

impl QueryResolver {
    #[must_use]
    pub fn new(registry: Arc<dyn RecordingRegistry>) -> Self {
        Self {
            registry,
            in_flight: DashMap::new(),
        }
    }

    /// Returns prioritized `{title, artist}` query pairs for a song.
    /// Always yields at least one pair; registry failures degrade to the
    /// tag fallback.
    pub async fn resolve_queries(&self, song: &SongInformation) -> Vec<AlternateQuery> {
        let fallback = AlternateQuery {
            title: song.title.clone(),
            artist: song.primary_artist().to_string(),
        };

        let Some(isrc) = song.isrc.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return vec![fallback];
        };

        let registered = self.lookup_isrc(isrc).await;

        let mut queries = dedup(registered.as_ref());
        queries.sort_by_key(|q| std::cmp::Reverse(language_priority(q)));

        let best_title_similarity = queries
            .iter()
            .map(|q| similarity(&song.title, &q.title))
            .fold(0.0_f64, f64::max);

        if queries.is_empty() || best_title_similarity < OVERRIDE_SIMILARITY_THRESHOLD {
            let already_present = queries
                .iter()
                .any(|q| q.dedup_key() == fallback.dedup_key());
            if !already_present {
                queries.insert(0, fallback);
            }
        }

        queries
    }

    /// Coalesced registry lookup: the first caller for an ISRC creates
    /// the shared future, everyone else awaits the same one. Completed
    /// lookups stay cached for the life of the resolver.
    fn lookup_isrc(&self, isrc: &str) -> SharedLookup {
        self.in_flight
            .entry(isrc.to_string())
            .or_insert_with(|| {
                let registry = Arc::clone(&self.registry);
                let isrc = isrc.to_string();
                async move {
                    match registry.recordings_by_isrc(&isrc).await {
                        Ok(recordings) => Arc::new(recordings),
                        Err(e) => {
                            tracing::warn!(isrc = %isrc, error = %e, "ISRC registry lookup failed");
                            Arc::new(Vec::new())
                        }
                    }
                }
                .boxed()
                .shared()
            })
            .clone()
    }
}

fn dedup(queries: &[AlternateQuery]) -> Vec<AlternateQuery> {
    let mut seen = std::collections::HashSet::new();
    queries
        .iter()
        .filter(|q| seen.insert(q.dedup_key()))
        .cloned()
        .collect()
}

/// 3 = Chinese-dominant, 2 = Japanese-dominant, 1 = everything else.
fn language_priority(query: &AlternateQuery) -> u8 {
    let text = format!("{} {}", query.title, query.artist);
    let has_kana = text
        .chars()
        .any(|c| ('\u{3040}'..='\u{30FF}').contains(&c));
    if has_kana {
        return 2;
    }
    let has_cjk = text
        .chars()
        .any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c) || ('\u{3400}'..='\u{4DBF}').contains(&c));
    if has_cjk { 3 } else { 1 }
}

const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org/ws/2";
const MUSICBRAINZ_USER_AGENT: &str = "lyrebird/0.1.0 (https://github.com/lyrebird-rs/lyrebird)";
/// MusicBrainz etiquette: at most one request per second.
const RATE_LIMIT_MS: u64 = 1000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<RecordingEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordingEntry {
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct ArtistCredit {
    name: String,
}

struct RateLimiter {
    last_request: tokio::sync::Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: tokio::sync::Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Recording registry backed by the public MusicBrainz search API.
pub struct MusicBrainzRegistry {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl MusicBrainzRegistry {
    pub fn new() -> Result<Self> {
        Self::with_base_url(MUSICBRAINZ_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(MUSICBRAINZ_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LyricsError::Registry(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
        })
    }
}

#[async_trait]
impl RecordingRegistry for MusicBrainzRegistry {
    async fn recordings_by_isrc(&self, isrc: &str) -> Result<Vec<AlternateQuery>> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}/recording?query=isrc:{}&fmt=json",
            self.base_url,
            urlencoding::encode(isrc)
        );
        tracing::debug!(isrc = %isrc, "querying recording registry");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LyricsError::Registry(e.to_string()))?;
        if !response.status().is_success() {
            return Err(LyricsError::Registry(format!(
                "registry returned HTTP {}",
                response.status()
            )));
        }

        let parsed: RecordingSearchResponse = response
            .json()
            .await
            .map_err(|e| LyricsError::Registry(e.to_string()))?;

        Ok(parsed
            .recordings
            .into_iter()
            .map(|entry| AlternateQuery {
                title: entry.title,
                artist: entry
                    .artist_credit
                    .first()
                    .map(|credit| credit.name.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }
}
