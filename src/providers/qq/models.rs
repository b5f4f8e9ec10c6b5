use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub song: Option<SongList>,
}

#[derive(Debug, Deserialize)]
pub struct SongList {
    #[serde(default)]
    pub list: Vec<SongItem>,
}

#[derive(Debug, Deserialize)]
pub struct SongItem {
    pub songmid: String,
    pub songname: String,
    #[serde(default)]
    pub singer: Vec<Singer>,
    #[serde(default)]
    pub albumname: String,
    /// Track duration in seconds.
    #[serde(default)]
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct Singer {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LyricResponse {
    /// Base64-encoded LRC body.
    pub lyric: Option<String>,
}
