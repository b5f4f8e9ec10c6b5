//! Key-value persistence for remembered selections and cached search
//! results.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{LyricsError, Result};
use crate::model::LyricCandidate;

/// The JSON value stored per key: the candidate list last seen for a
/// track, plus the id of the selected candidate (null for query-level
/// search caches).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceRecord {
    #[serde(default)]
    pub results: Vec<LyricCandidate>,
    #[serde(default)]
    pub selected_id: Option<String>,
}

/// Opaque UTF-8 key-value store. Implementations may impose a size
/// ceiling; no iteration or eviction is required.
pub trait LyricsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store; state dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LyricsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file, loaded once and rewritten
/// on every write.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens (or creates) the store at `path`. A missing file is an
    /// empty store; an unreadable one is an error.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| LyricsError::Store(format!("corrupt store file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(LyricsError::Store(e.to_string())),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Opens the store at its default location under the user's config
    /// directory, creating the directory as needed.
    pub fn at_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir()
            .ok_or_else(|| LyricsError::Store("no user config directory".to_string()))?;
        dir.push("lyrebird");
        fs::create_dir_all(&dir).map_err(|e| LyricsError::Store(e.to_string()))?;
        dir.push("selections.json");
        Self::new(dir)
    }
}

impl LyricsStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&*entries)?;
        fs::write(&self.path, content).map_err(|e| LyricsError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());

        store.put("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selections.json");

        {
            let store = FileStore::new(&path).unwrap();
            store.put("Song|Artist", "{\"results\":[]}").unwrap();
        }
        let reopened = FileStore::new(&path).unwrap();
        assert_eq!(
            reopened.get("Song|Artist").unwrap().as_deref(),
            Some("{\"results\":[]}")
        );
    }

    #[test]
    fn record_json_uses_the_documented_shape() {
        let record = PersistenceRecord {
            results: vec![LyricCandidate {
                id: "1".to_string(),
                source: "netease".to_string(),
                lyric_text: "[00:01.00]A".to_string(),
                title: "T".to_string(),
                artist: "A".to_string(),
                ..Default::default()
            }],
            selected_id: Some("1".to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"selectedId\":\"1\""));
        assert!(json.contains("\"results\""));

        let parsed: PersistenceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
