//! Remote lyric providers.
//!
//! Every provider is a typed adapter: raw provider JSON is projected
//! into [`LyricCandidate`] at the adapter boundary, and only candidates
//! with non-empty lyric text are emitted.

pub mod lrclib;
pub mod netease;
pub mod qq;

pub use lrclib::LrclibProvider;
pub use netease::NeteaseProvider;
pub use qq::QqProvider;

use async_trait::async_trait;
use reqwest::{Client, header};

use crate::error::Result;
use crate::model::{LyricCandidate, SongInformation};

/// A remote source of lyric candidates.
#[async_trait]
pub trait LyricProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Searches the provider for the given song. Returned candidates
    /// carry a non-empty `lyric_text` and a score of 0; scoring happens
    /// in the aggregator.
    async fn search(&self, song: &SongInformation, limit: usize) -> Result<Vec<LyricCandidate>>;
}

pub(crate) fn default_client() -> Client {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36"
            .parse()
            .unwrap(),
    );
    headers.insert(header::REFERER, "https://y.qq.com/".parse().unwrap());

    Client::builder().default_headers(headers).build().unwrap()
}

/// Search keywords in resolver priority order: one per alias pair when
/// the resolver has run, else the song's own title and primary artist.
/// Providers try these in order and stop at the first one that yields
/// results.
pub(crate) fn keyword_queries(song: &SongInformation) -> Vec<String> {
    let join = |title: &str, artist: &str| {
        let keyword = format!("{title} {artist}");
        keyword.trim().to_string()
    };

    if let Some(aliases) = &song.search_aliases
        && !aliases.titles.is_empty()
    {
        return aliases
            .titles
            .iter()
            .zip(&aliases.artists)
            .map(|(title, artist)| join(title, artist))
            .collect();
    }
    vec![join(&song.title, song.primary_artist())]
}
