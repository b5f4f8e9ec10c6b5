mod models;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;

use self::models::{LyricResponse, SearchResponse, SongItem};
use super::{LyricProvider, default_client, keyword_queries};
use crate::error::{LyricsError, Result};
use crate::model::{LyricCandidate, SongInformation};

const DEFAULT_BASE_URL: &str = "https://music.163.com/api";
const PROVIDER_NAME: &str = "netease";

/// Netease Cloud Music adapter.
pub struct NeteaseProvider {
    client: Client,
    base_url: String,
}

impl NeteaseProvider {
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
            "{}/cloudsearch/pc?s={}&type=1&offset=0&limit={}",
            self.base_url,
            urlencoding::encode(keyword),
            limit
        );
        let response: SearchResponse = self.client.get(&url).send().await?.json().await?;
        if response.code != 200 {
            return Err(LyricsError::Provider(format!(
                "netease search returned code {}",
                response.code
            )));
        }
        Ok(response.result.map(|r| r.songs).unwrap_or_default())
    }

    async fn fetch_candidate(&self, item: SongItem) -> Option<LyricCandidate> {
        let url = format!(
            "{}/song/lyric?id={}&lv=-1&kv=-1&tv=-1",
            self.base_url, item.id
        );
        let lyric = match self.client.get(&url).send().await {
            Ok(response) => match response.json::<LyricResponse>().await {
                Ok(body) if body.code == 200 => body.lrc.and_then(|l| l.lyric),
                Ok(body) => {
                    tracing::warn!(song_id = item.id, code = body.code, "netease lyric error");
                    None
                }
                Err(e) => {
                    tracing::warn!(song_id = item.id, error = %e, "netease lyric parse failed");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(song_id = item.id, error = %e, "netease lyric fetch failed");
                None
            }
        };
        let lyric = lyric.filter(|text| !text.trim().is_empty())?;
        Some(candidate_from(item, lyric))
    }
}

impl Default for NeteaseProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn candidate_from(item: SongItem, lyric_text: String) -> LyricCandidate {
    LyricCandidate {
        id: item.id.to_string(),
        source: PROVIDER_NAME.to_string(),
        lyric_text,
        title: item.name,
        artist: item
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        album: item.album.map(|a| a.name).unwrap_or_default(),
        duration_ms: item.duration_ms,
        score: 0,
    }
}

#[async_trait]
impl LyricProvider for NeteaseProvider {
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
