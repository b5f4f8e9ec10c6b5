use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A fully parsed lyric document: timed lines plus the `[key:value]`
/// metadata tags found in the source text.
///
/// Lines are always ordered by non-decreasing `start_ms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsData {
    pub lines: Vec<LyricLine>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// One timed lyric line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Absolute start time from the beginning of the track, in ms.
    pub start_ms: u64,
    /// Line text with all timing tags removed.
    pub text: String,
    /// Per-syllable timing when the source carried inline markers.
    /// Empty for plain line-timed lyrics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syllables: Vec<Syllable>,
    /// 0 for the primary text; lines sharing a timestamp stack up as
    /// layers 1, 2, … (translation, romanization, …).
    #[serde(default)]
    pub layer: u32,
}

/// A syllable within a line. `start_ms` is relative to the owning line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Syllable {
    pub start_ms: u64,
    pub duration_ms: u64,
    pub text: String,
}
