use std::path::{Path, PathBuf};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

use crate::error::StorageError;
use crate::models::PersistedRecord;

/// SQLite table of odds samples, one auto-committed insert per record
pub struct SqliteSink {
    pool: Pool<Sqlite>,
    path: PathBuf,
    stored: usize,
}

impl SqliteSink {
    /// Open (or create) the database and initialize the schema
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let sink = Self {
            pool,
            path: path.to_path_buf(),
            stored: 0,
        };
        sink.init_schema().await?;

        info!("SQLite storage initialized at {}", path.display());
        Ok(sink)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS live_odds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                match_id INTEGER NOT NULL,
                match_name TEXT,
                game_number INTEGER,
                team1 TEXT,
                team2 TEXT,
                team1_odds REAL,
                team2_odds REAL,
                status TEXT,
                league TEXT,
                series_score TEXT,
                raw_data TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_timestamp ON live_odds (timestamp)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_match_id ON live_odds (match_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows inserted this session
    pub fn stored(&self) -> usize {
        self.stored
    }

    /// Insert one record. `match_id` is bound as text so integer affinity
    /// stores real ids as integers and keeps the `unknown` sentinel.
    pub async fn append(&mut self, record: &PersistedRecord) -> Result<(), StorageError> {
        let game = &record.game;
        let raw_data = serde_json::to_string(game)?;

        sqlx::query(
            r#"
            INSERT INTO live_odds (
                timestamp,
                match_id,
                match_name,
                game_number,
                team1,
                team2,
                team1_odds,
                team2_odds,
                status,
                league,
                series_score,
                raw_data
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.timestamp)
        .bind(game.match_id.to_string())
        .bind(&game.match_name)
        .bind(game.game_number.map(i64::from))
        .bind(&game.team1)
        .bind(&game.team2)
        .bind(record.team1_odds())
        .bind(record.team2_odds())
        .bind(&game.status)
        .bind(&record.parent.league)
        .bind(&record.parent.series_score)
        .bind(raw_data)
        .execute(&self.pool)
        .await?;

        self.stored += 1;
        Ok(())
    }

    /// Rows in the table across all sessions
    pub async fn total_count(&self) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM live_odds")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{GameRecord, MatchKey, ParentMatchInfo};

    fn record(match_id: MatchKey, game_number: Option<u32>) -> PersistedRecord {
        PersistedRecord::new(
            "2026-10-19T12:00:00.000000",
            GameRecord {
                match_id,
                game_number,
                match_name: "Game 1".to_string(),
                team1: "A".to_string(),
                team2: "B".to_string(),
                status: "Live".to_string(),
                odds: BTreeMap::from([("A".to_string(), 1.5), ("Over".to_string(), 1.9)]),
            },
            ParentMatchInfo {
                league: "LPL".to_string(),
                series_score: "2-1".to_string(),
                match_type: "BO5".to_string(),
            },
        )
    }

    #[derive(sqlx::FromRow)]
    struct Row {
        match_id: i64,
        game_number: Option<i64>,
        team1_odds: f64,
        team2_odds: f64,
        series_score: String,
        raw_data: String,
    }

    #[tokio::test]
    async fn test_insert_normalized_and_raw_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SqliteSink::open(&dir.path().join("live_odds.db"))
            .await
            .unwrap();

        sink.append(&record(MatchKey::Id(42), Some(1))).await.unwrap();
        assert_eq!(sink.stored(), 1);

        let row: Row = sqlx::query_as(
            "SELECT match_id, game_number, team1_odds, team2_odds, series_score, raw_data FROM live_odds",
        )
        .fetch_one(&sink.pool)
        .await
        .unwrap();

        assert_eq!(row.match_id, 42);
        assert_eq!(row.game_number, Some(1));
        assert_eq!(row.team1_odds, 1.5);
        assert_eq!(row.team2_odds, 0.0);
        assert_eq!(row.series_score, "2-1");

        let raw: GameRecord = serde_json::from_str(&row.raw_data).unwrap();
        assert_eq!(raw.odds.get("Over"), Some(&1.9));
        sink.close().await;
    }

    #[tokio::test]
    async fn test_unknown_match_and_missing_game_number() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SqliteSink::open(&dir.path().join("live_odds.db"))
            .await
            .unwrap();

        sink.append(&record(MatchKey::Unknown, None)).await.unwrap();

        let (match_id, game_number): (String, Option<i64>) =
            sqlx::query_as("SELECT CAST(match_id AS TEXT), game_number FROM live_odds")
                .fetch_one(&sink.pool)
                .await
                .unwrap();
        assert_eq!(match_id, "unknown");
        assert_eq!(game_number, None);
        sink.close().await;
    }

    #[tokio::test]
    async fn test_total_count_spans_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live_odds.db");

        let mut first = SqliteSink::open(&path).await.unwrap();
        first.append(&record(MatchKey::Id(1), Some(1))).await.unwrap();
        first.append(&record(MatchKey::Id(1), Some(2))).await.unwrap();
        first.close().await;

        let mut second = SqliteSink::open(&path).await.unwrap();
        second.append(&record(MatchKey::Id(2), Some(1))).await.unwrap();
        assert_eq!(second.stored(), 1);
        assert_eq!(second.total_count().await.unwrap(), 3);
        second.close().await;
    }
}
