use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Match identifier of a game record. `Unknown` when the feed omits every id;
/// persisted as the literal string `"unknown"`, never as null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKey {
    Id(i64),
    Unknown,
}

impl From<Option<i64>> for MatchKey {
    fn from(id: Option<i64>) -> Self {
        id.map(MatchKey::Id).unwrap_or(MatchKey::Unknown)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::Id(id) => write!(f, "{}", id),
            MatchKey::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for MatchKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MatchKey::Id(id) => serializer.serialize_i64(*id),
            MatchKey::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for MatchKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => n.as_i64().into(),
            serde_json::Value::String(s) => s.parse().ok().into(),
            _ => MatchKey::Unknown,
        })
    }
}

/// Normalized odds for one in-progress game of a series at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game-level match id
    pub match_id: MatchKey,

    /// Game number parsed from the market name, absent if not stated
    pub game_number: Option<u32>,

    /// Market/game title as the feed names it
    pub match_name: String,

    pub team1: String,

    pub team2: String,

    /// Free-text game status
    pub status: String,

    /// Team display name -> decimal price
    pub odds: BTreeMap<String, f64>,
}

impl GameRecord {
    /// Price for a team, 0 if the team has no odds
    pub fn odds_for(&self, team: &str) -> f64 {
        self.odds.get(team).copied().unwrap_or(0.0)
    }
}

/// Series context copied onto every persisted record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentMatchInfo {
    pub league: String,
    pub series_score: String,
    pub match_type: String,
}

/// One stored odds sample
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    /// Local wall clock of the poll, ISO-8601
    pub timestamp: String,

    pub game: GameRecord,

    pub parent: ParentMatchInfo,
}

impl PersistedRecord {
    pub fn new(timestamp: &str, game: GameRecord, parent: ParentMatchInfo) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            game,
            parent,
        }
    }

    pub fn team1_odds(&self) -> f64 {
        self.game.odds_for(&self.game.team1)
    }

    pub fn team2_odds(&self) -> f64 {
        self.game.odds_for(&self.game.team2)
    }
}
