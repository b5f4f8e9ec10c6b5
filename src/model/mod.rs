//! Plain data shared across the crate: track descriptors, search
//! candidates, and the parsed lyric model.

mod lyrics;

pub use lyrics::{LyricLine, LyricsData, Syllable};

use serde::{Deserialize, Serialize};

/// Alternate titles and artist names attached to a song by the query
/// resolver. The two vectors are parallel: `titles[i]` pairs with
/// `artists[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchAliases {
    pub titles: Vec<String>,
    pub artists: Vec<String>,
}

/// Everything known about the track whose lyrics are being looked up.
///
/// Constructed by the caller; the aggregator attaches `search_aliases`
/// during a search.
#[derive(Debug, Clone, Default)]
pub struct SongInformation {
    /// Track title. Required, non-empty.
    pub title: String,
    /// Ordered artist names; the first entry is the primary artist.
    pub artists: Vec<String>,
    /// Album name, possibly empty.
    pub album: String,
    /// Track duration in milliseconds; 0 means unknown.
    pub duration_ms: u64,
    /// Opaque identifier of where the track came from.
    pub source_id: String,
    /// Stable per-file key used for remembering selections.
    pub persistence_id: Option<String>,
    /// 12-character International Standard Recording Code.
    pub isrc: Option<String>,
    /// Raw lyric text already embedded in the file's tags.
    pub embedded_lyrics: Option<String>,
    /// Alternate query forms, filled in by the resolver.
    pub search_aliases: Option<SearchAliases>,
}

impl SongInformation {
    #[must_use]
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn artists_joined(&self) -> String {
        self.artists.join(",")
    }

    /// Key under which per-track selections are remembered: the caller's
    /// stable id when present, else `title|artists`.
    #[must_use]
    pub fn persistence_key(&self) -> String {
        self.persistence_id.clone().filter(|id| !id.is_empty()).unwrap_or_else(|| {
            format!("{}|{}", self.title, self.artists_joined())
        })
    }
}

/// One scored lyric result for one track from one provider.
///
/// Providers must never emit a candidate with empty `lyric_text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricCandidate {
    /// Provider-stable identifier; synthetic for embedded/local sources.
    pub id: String,
    /// Provider name, e.g. `"netease"` or `"Local File"`.
    pub source: String,
    /// Raw lyric body as returned by the provider.
    pub lyric_text: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: u64,
    /// Composite relevance score, filled in by the aggregator.
    #[serde(default)]
    pub score: i32,
}
