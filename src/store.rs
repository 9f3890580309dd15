//! High-score persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::StoreError;

/// Key the high score is stored under.
pub const HIGH_SCORE_KEY: &str = "HALLI_GALLI_HIGH_SCORE";

/// Storage for the single persisted high score.
pub trait HighScoreStore: Send {
    /// Stored value, or 0 when nothing usable is stored.
    fn load(&self) -> u64;
    fn save(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Process-local store, mainly for tests and the simulator.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    value: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(score: u64) -> Self {
        Self { value: Some(score) }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u64 {
        self.value.unwrap_or(0)
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        self.value = Some(score);
        Ok(())
    }
}

/// Keeps `{ "HALLI_GALLI_HIGH_SCORE": <n> }` in a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> u64 {
        match self.read_entries() {
            Ok(entries) => entries
                .get(HIGH_SCORE_KEY)
                .and_then(Value::as_u64)
                .unwrap_or(0),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable high score");
                0
            }
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        // Other keys survive; a file that is not a JSON object is replaced.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(HIGH_SCORE_KEY.to_string(), Value::from(score));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}
