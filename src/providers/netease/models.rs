use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub code: i64,
    pub result: Option<SearchResultData>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResultData {
    #[serde(default)]
    pub songs: Vec<SongItem>,
}

#[derive(Debug, Deserialize)]
pub struct SongItem {
    pub id: u64,
    pub name: String,
    #[serde(rename = "ar", default)]
    pub artists: Vec<ArtistItem>,
    #[serde(rename = "al")]
    pub album: Option<AlbumItem>,
    /// Track duration in milliseconds.
    #[serde(rename = "dt", default)]
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ArtistItem {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumItem {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LyricResponse {
    pub code: i64,
    pub lrc: Option<LyricBody>,
}

#[derive(Debug, Deserialize)]
pub struct LyricBody {
    pub lyric: Option<String>,
}
