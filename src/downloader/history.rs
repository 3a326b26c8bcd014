// Download history stores
//
// Two implementations of the duplicate-suppression seam: an in-memory set
// for tests and one-off batches, and an append-only JSON-lines file for
// persistent archives. Keys are item ids when the engine reports them,
// otherwise the URL itself.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::downloader::errors::EngineError;
use crate::downloader::traits::HistoryStore;

/// Volatile history, lives for one batch.
#[derive(Default)]
pub struct MemoryHistory {
    seen: Mutex<HashSet<String>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn is_known(&self, key: &str) -> bool {
        match self.seen.lock() {
            Ok(seen) => seen.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }

    fn record(&self, key: &str) -> Result<(), EngineError> {
        match self.seen.lock() {
            Ok(mut seen) => {
                seen.insert(key.to_string());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key.to_string());
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct HistoryLine {
    key: String,
    recorded_at: String,
}

/// Persistent history backed by a JSON-lines file. The full key set is kept
/// in memory; writes append a line per new key. Unreadable lines are skipped
/// with a warning so a single corrupt entry never poisons the archive.
pub struct FileHistory {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl FileHistory {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let mut seen = HashSet::new();

        if path.exists() {
            let file = File::open(&path)
                .map_err(|e| EngineError::Unknown(format!("Cannot open history file: {}", e)))?;
            for (index, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| {
                    EngineError::Unknown(format!("Cannot read history file: {}", e))
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<HistoryLine>(&line) {
                    Ok(entry) => {
                        seen.insert(entry.key);
                    }
                    Err(e) => warn!(line = index + 1, error = %e, "skipping bad history line"),
                }
            }
        }

        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, key: &str) -> Result<(), EngineError> {
        let entry = HistoryLine {
            key: key.to_string(),
            recorded_at: now_rfc3339(),
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| EngineError::Unknown(format!("Cannot serialize history entry: {}", e)))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EngineError::Unknown(format!("Cannot open history file: {}", e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| EngineError::Unknown(format!("Cannot write history file: {}", e)))
    }
}

impl HistoryStore for FileHistory {
    fn is_known(&self, key: &str) -> bool {
        match self.seen.lock() {
            Ok(seen) => seen.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }

    fn record(&self, key: &str) -> Result<(), EngineError> {
        {
            let mut seen = match self.seen.lock() {
                Ok(seen) => seen,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !seen.insert(key.to_string()) {
                return Ok(());
            }
        }
        self.append(key)
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::new())
}
