mod models;

use async_trait::async_trait;
use reqwest::Client;

use self::models::SearchItem;
use super::{LyricProvider, keyword_queries};
use crate::error::Result;
use crate::model::{LyricCandidate, SongInformation};

const DEFAULT_BASE_URL: &str = "https://lrclib.net/api";
// LRCLIB asks clients to identify themselves.
const USER_AGENT: &str = "lyrebird/0.1.0 (https://github.com/lyrebird-rs/lyrebird)";
const PROVIDER_NAME: &str = "lrclib";

/// LRCLIB adapter. A single search call returns the lyric bodies
/// inline, so no per-song fetch is needed.
pub struct LrclibProvider {
    client: Client,
    base_url: String,
}

impl LrclibProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder().user_agent(USER_AGENT).build().unwrap(),
            base_url: base_url.into(),
        }
    }

    async fn search_records(&self, keyword: &str) -> Result<Vec<SearchItem>> {
        let url = format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(keyword)
        );
        Ok(self.client.get(&url).send().await?.json().await?)
    }
}

impl Default for LrclibProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Synced lyrics win over plain; records with neither are dropped.
fn candidate_from(item: SearchItem) -> Option<LyricCandidate> {
    let non_empty = |text: Option<String>| text.filter(|t| !t.trim().is_empty());
    let lyric_text = non_empty(item.synced_lyrics).or_else(|| non_empty(item.plain_lyrics))?;

    Some(LyricCandidate {
        id: item.id.to_string(),
        source: PROVIDER_NAME.to_string(),
        lyric_text,
        title: item.track_name,
        artist: item.artist_name,
        album: item.album_name,
        duration_ms: (item.duration * 1000.0) as u64,
        score: 0,
    })
}

#[async_trait]
impl LyricProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, song: &SongInformation, limit: usize) -> Result<Vec<LyricCandidate>> {
        for keyword in keyword_queries(song) {
            let records = self.search_records(&keyword).await?;
            if records.is_empty() {
                continue;
            }
            return Ok(records
                .into_iter()
                .filter_map(candidate_from)
                .take(limit)
                .collect());
        }
        Ok(Vec::new())
    }
}
