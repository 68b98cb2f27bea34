use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::models::{GameRecord, ParentMatchInfo, PersistedRecord};

/// Records buffered between file rewrites
pub const FLUSH_EVERY: usize = 10;

/// Entry layout of the JSON array file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonEntry {
    pub timestamp: String,
    pub game_data: GameRecord,
    pub parent_match_info: ParentMatchInfo,
}

impl From<&PersistedRecord> for JsonEntry {
    fn from(record: &PersistedRecord) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            game_data: record.game.clone(),
            parent_match_info: record.parent.clone(),
        }
    }
}

/// In-memory history rewritten to one JSON array file.
///
/// The file is rewritten every [`FLUSH_EVERY`] records and on [`flush`](Self::flush),
/// so an unclean exit loses at most `FLUSH_EVERY - 1` records.
pub struct JsonSink {
    path: PathBuf,
    history: Vec<JsonEntry>,
    saved: usize,
}

impl JsonSink {
    /// Create an empty sink; nothing touches disk until the first write
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            history: Vec::new(),
            saved: 0,
        }
    }

    /// Path of the JSON file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records held in memory
    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    /// Records present in the file as of the last successful write
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Buffer a record. A failed periodic write keeps the record buffered for
    /// the next flush.
    pub async fn append(&mut self, record: &PersistedRecord) -> Result<(), StorageError> {
        self.history.push(JsonEntry::from(record));

        if self.history.len() % FLUSH_EVERY == 0 {
            self.write_file().await?;
        }
        Ok(())
    }

    /// Rewrite the file with everything buffered so far
    pub async fn flush(&mut self) -> Result<(), StorageError> {
        self.write_file().await
    }

    /// Replace the file with the whole history via a temp file + rename
    async fn write_file(&mut self) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(&self.history)?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &body).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        self.saved = self.history.len();
        debug!(
            "Wrote {} records to {}",
            self.saved,
            self.path.display()
        );
        Ok(())
    }
}
