//! JSONL file store for council turns.
//!
//! One file per conversation (`<data_dir>/<conversation_id>.jsonl`), one
//! [`TurnRecord`] per line, appended after each successful turn.

use council_application::{ConversationStore, StoreError, TurnRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Append-only JSONL conversation store.
///
/// Writes are serialized through a `Mutex` so concurrent turns never
/// interleave lines within a file.
pub struct JsonlConversationStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlConversationStore {
    /// Store rooted at `data_dir`; the directory is created on first write
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File holding one conversation
    pub fn path_for(&self, conversation_id: &str) -> Result<PathBuf, StoreError> {
        validate_id(conversation_id)?;
        Ok(self.data_dir.join(format!("{}.jsonl", conversation_id)))
    }
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is accepted
fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

impl ConversationStore for JsonlConversationStore {
    fn append(&self, record: &TurnRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.conversation_id)?;
        let line = serde_json::to_string(record)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::create_dir_all(&self.data_dir)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;

        debug!("Stored turn in {}", path.display());
        Ok(())
    }

    fn load(&self, conversation_id: &str) -> Result<Vec<TurnRecord>, StoreError> {
        let path = self.path_for(conversation_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TurnRecord>(&line) {
                Ok(record) => records.push(record),
                // A torn last line from an interrupted write is skipped
                Err(e) => warn!(
                    "Skipping unreadable line {} of {}: {}",
                    n + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(records)
    }
}
