pub mod csv;
pub mod json;
pub mod sqlite;

use std::fmt;
use std::str::FromStr;
use std::path::Path;

use chrono::Local;
use tracing::{info, warn};

pub use self::csv::CsvSink;
pub use self::json::{JsonEntry, JsonSink};
pub use self::sqlite::SqliteSink;
use crate::error::StorageError;
use crate::models::PersistedRecord;

/// Persistence backend, chosen once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    Json,
    Csv,
    Sqlite,
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageFormat::Json => "json",
            StorageFormat::Csv => "csv",
            StorageFormat::Sqlite => "sqlite",
        })
    }
}

impl FromStr for StorageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageFormat::Json),
            "csv" => Ok(StorageFormat::Csv),
            "sqlite" => Ok(StorageFormat::Sqlite),
            _ => Err(format!("Unknown storage format: {}. Use json, csv, or sqlite.", s)),
        }
    }
}

/// Where odds samples go. Callers log and continue on append errors.
pub enum StorageSink {
    Json(JsonSink),
    Csv(CsvSink),
    Sqlite(SqliteSink),
}

impl StorageSink {
    /// Create the storage directory and open the backend for a new session
    pub async fn open(format: StorageFormat, dir: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(dir).await?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let sink = match format {
            StorageFormat::Json => {
                StorageSink::Json(JsonSink::new(&dir.join(format!("live_odds_{}.json", stamp))))
            }
            StorageFormat::Csv => StorageSink::Csv(
                CsvSink::create(&dir.join(format!("live_odds_{}.csv", stamp))).await?,
            ),
            StorageFormat::Sqlite => {
                StorageSink::Sqlite(SqliteSink::open(&dir.join("live_odds.db")).await?)
            }
        };

        Ok(sink)
    }

    /// Backend this sink was opened with
    pub fn format(&self) -> StorageFormat {
        match self {
            StorageSink::Json(_) => StorageFormat::Json,
            StorageSink::Csv(_) => StorageFormat::Csv,
            StorageSink::Sqlite(_) => StorageFormat::Sqlite,
        }
    }

    /// File or database the sink writes to
    pub fn path(&self) -> &Path {
        match self {
            StorageSink::Json(sink) => sink.path(),
            StorageSink::Csv(sink) => sink.path(),
            StorageSink::Sqlite(sink) => sink.path(),
        }
    }

    /// Store one record with the backend's durability rules
    pub async fn append_record(&mut self, record: &PersistedRecord) -> Result<(), StorageError> {
        match self {
            StorageSink::Json(sink) => sink.append(record).await,
            StorageSink::Csv(sink) => sink.append(record).await,
            StorageSink::Sqlite(sink) => sink.append(record).await,
        }
    }

    /// Push buffered records to disk. Idempotent; CSV and SQLite hold no buffer.
    pub async fn flush(&mut self) -> Result<(), StorageError> {
        match self {
            StorageSink::Json(sink) => {
                sink.flush().await?;
                info!("Final data saved to {}", sink.path().display());
                Ok(())
            }
            StorageSink::Csv(_) | StorageSink::Sqlite(_) => Ok(()),
        }
    }

    /// Records durably stored during this session
    pub fn stored(&self) -> usize {
        match self {
            StorageSink::Json(sink) => sink.saved(),
            StorageSink::Csv(sink) => sink.stored(),
            StorageSink::Sqlite(sink) => sink.stored(),
        }
    }

    /// One-line human-readable storage summary
    pub async fn summary(&self) -> String {
        match self {
            StorageSink::Json(sink) => format!(
                "JSON: {} records saved to {}",
                sink.saved(),
                sink.path().display()
            ),
            StorageSink::Csv(sink) => format!(
                "CSV: {} records stored in {}",
                sink.stored(),
                sink.path().display()
            ),
            StorageSink::Sqlite(sink) => match sink.total_count().await {
                Ok(total) => format!(
                    "SQLite: {} records stored this session ({} total) in {}",
                    sink.stored(),
                    total,
                    sink.path().display()
                ),
                Err(e) => {
                    warn!("Failed to count stored records: {}", e);
                    format!(
                        "SQLite: {} records stored this session in {}",
                        sink.stored(),
                        sink.path().display()
                    )
                }
            },
        }
    }

    /// Release the database pool; a no-op for file backends
    pub async fn close(&self) {
        if let StorageSink::Sqlite(sink) = self {
            sink.close().await;
        }
    }
}
