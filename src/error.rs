use std::num::ParseIntError;
use thiserror::Error;

/// Errors produced while searching for, fetching, parsing, or persisting
/// lyrics.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider API returned an error: {0}")]
    Provider(String),

    #[error("recording registry lookup failed: {0}")]
    Registry(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid time format: {0}")]
    InvalidTime(String),

    #[error("lyric parsing failed: {0}")]
    Parse(String),

    #[error("persistence store failed: {0}")]
    Store(String),
}

impl From<reqwest::Error> for LyricsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<ParseIntError> for LyricsError {
    fn from(err: ParseIntError) -> Self {
        Self::InvalidTime(format!(
            "failed to parse integer from time component: {err}"
        ))
    }
}

pub type Result<T> = std::result::Result<T, LyricsError>;
