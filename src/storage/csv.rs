use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::StorageError;
use crate::models::PersistedRecord;

pub const CSV_HEADER: [&str; 11] = [
    "timestamp",
    "match_id",
    "match_name",
    "game_number",
    "team1",
    "team2",
    "team1_odds",
    "team2_odds",
    "status",
    "league",
    "series_score",
];

/// Append-only CSV file, opened and closed for every row
pub struct CsvSink {
    path: PathBuf,
    stored: usize,
}

impl CsvSink {
    /// Create the file and write the header row
    pub async fn create(path: &Path) -> Result<Self, StorageError> {
        tokio::fs::write(path, encode_row(&CSV_HEADER)).await?;
        info!("CSV storage initialized at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            stored: 0,
        })
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written this session
    pub fn stored(&self) -> usize {
        self.stored
    }

    /// Append one row, opening and closing the file
    pub async fn append(&mut self, record: &PersistedRecord) -> Result<(), StorageError> {
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(encode_row(&record_fields(record)).as_bytes())
            .await?;
        file.flush().await?;

        self.stored += 1;
        Ok(())
    }
}

fn record_fields(record: &PersistedRecord) -> [String; 11] {
    let game = &record.game;
    [
        record.timestamp.clone(),
        game.match_id.to_string(),
        game.match_name.clone(),
        game.game_number.map(|n| n.to_string()).unwrap_or_default(),
        game.team1.clone(),
        game.team2.clone(),
        record.team1_odds().to_string(),
        record.team2_odds().to_string(),
        game.status.clone(),
        record.parent.league.clone(),
        record.parent.series_score.clone(),
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// One CRLF-terminated row, quoting fields that need it
fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let field = field.as_ref();
        if needs_quotes(field) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push_str("\r\n");
    line
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{GameRecord, MatchKey, ParentMatchInfo};

    fn record(game_number: Option<u32>, name: &str) -> PersistedRecord {
        PersistedRecord::new(
            "2026-10-19T12:00:00.000000",
            GameRecord {
                match_id: MatchKey::Id(100),
                game_number,
                match_name: name.to_string(),
                team1: "A".to_string(),
                team2: "B".to_string(),
                status: "Live".to_string(),
                odds: BTreeMap::from([("A".to_string(), 1.5), ("B".to_string(), 2.5)]),
            },
            ParentMatchInfo {
                league: "LCK".to_string(),
                series_score: "1-0".to_string(),
                match_type: "BO3".to_string(),
            },
        )
    }

    #[test]
    fn test_encode_row_quotes_special_fields() {
        let row = encode_row(&["plain", "a,b", "say \"hi\""]);
        assert_eq!(row, "plain,\"a,b\",\"say \"\"hi\"\"\"\r\n");
    }

    #[tokio::test]
    async fn test_header_then_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odds.csv");

        let mut sink = CsvSink::create(&path).await.unwrap();
        sink.append(&record(Some(1), "Game 1")).await.unwrap();
        sink.append(&record(None, "Winner, Series")).await.unwrap();
        assert_eq!(sink.stored(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,match_id,match_name,game_number,team1,team2,team1_odds,team2_odds,status,league,series_score"
        );
        assert_eq!(
            lines[1],
            "2026-10-19T12:00:00.000000,100,Game 1,1,A,B,1.5,2.5,Live,LCK,1-0"
        );
        assert_eq!(
            lines[2],
            "2026-10-19T12:00:00.000000,100,\"Winner, Series\",,A,B,1.5,2.5,Live,LCK,1-0"
        );
    }

    #[tokio::test]
    async fn test_append_to_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odds.csv");
        let mut sink = CsvSink::create(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(sink.append(&record(Some(1), "Game 1")).await.is_err());
        assert_eq!(sink.stored(), 0);
    }
}
