mod models;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures::future::join_all;
use reqwest::Client;

use self::models::{LyricResponse, SearchResponse, SongItem};
use super::{LyricProvider, default_client, keyword_queries};
use crate::error::{LyricsError, Result};
use crate::model::{LyricCandidate, SongInformation};

const DEFAULT_BASE_URL: &str = "https://c.y.qq.com";
const PROVIDER_NAME: &str = "qq";

/// QQ Music adapter.
pub struct QqProvider {
    client: Client,
    base_url: String,
}

impl QqProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: default_client(),
            base_url: base_url.into(),
        }
    }

    async fn search_songs(&self, keyword: &str, limit: usize) -> Result<Vec<SongItem>> {
        let url = format!(
            "{}/soso/fcgi-bin/client_search_cp?w={}&n={}&format=json",
            self.base_url,
            urlencoding::encode(keyword),
            limit
        );
        let body = self.client.get(&url).send().await?.text().await?;
        let response: SearchResponse = serde_json::from_str(strip_jsonp(&body))?;
        Ok(response
            .data
            .and_then(|d| d.song)
            .map(|s| s.list)
            .unwrap_or_default())
    }

    async fn fetch_candidate(&self, item: SongItem) -> Option<LyricCandidate> {
        let url = format!(
            "{}/lyric/fcgi-bin/fcg_query_lyric_new.fcg?songmid={}&format=json&nobase64=0&g_tk=5381",
            self.base_url, item.songmid
        );
        let lyric = match self.client.get(&url).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => decode_lyric_body(&body)
                    .map_err(|e| {
                        tracing::warn!(songmid = %item.songmid, error = %e, "qq lyric decode failed");
                    })
                    .ok(),
                Err(e) => {
                    tracing::warn!(songmid = %item.songmid, error = %e, "qq lyric read failed");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(songmid = %item.songmid, error = %e, "qq lyric fetch failed");
                None
            }
        };
        let lyric = lyric.filter(|text| !text.trim().is_empty())?;
        Some(candidate_from(item, lyric))
    }
}

impl Default for QqProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwraps a `callback({...})` / `MusicJsonCallback({...})` JSONP body.
/// Plain JSON passes through untouched.
fn strip_jsonp(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    if let (Some(open), Some(close)) = (trimmed.find('('), trimmed.rfind(')'))
        && open < close
    {
        return trimmed[open + 1..close].trim();
    }
    trimmed
}

fn decode_lyric_body(body: &str) -> Result<String> {
    let response: LyricResponse = serde_json::from_str(strip_jsonp(body))?;
    let encoded = response
        .lyric
        .ok_or_else(|| LyricsError::Provider("lyric missing from qq response".to_string()))?;
    let bytes = BASE64_STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| LyricsError::Provider(format!("invalid base64 lyric: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| LyricsError::Provider(format!("lyric is not valid UTF-8: {e}")))
}

fn candidate_from(item: SongItem, lyric_text: String) -> LyricCandidate {
    LyricCandidate {
        id: item.songmid.clone(),
        source: PROVIDER_NAME.to_string(),
        lyric_text,
        title: item.songname,
        artist: item
            .singer
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        album: item.albumname,
        // interval is in seconds; everything downstream uses ms.
        duration_ms: item.interval * 1000,
        score: 0,
    }
}

#[async_trait]
impl LyricProvider for QqProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, song: &SongInformation, limit: usize) -> Result<Vec<LyricCandidate>> {
        for keyword in keyword_queries(song) {
            let songs = self.search_songs(&keyword, limit).await?;
            if songs.is_empty() {
                continue;
            }
            let fetches = songs.into_iter().take(limit).map(|s| self.fetch_candidate(s));
            return Ok(join_all(fetches).await.into_iter().flatten().collect());
        }
        Ok(Vec::new())
    }
}
