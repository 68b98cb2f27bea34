use std::collections::BTreeMap;
use std::fmt;

use crate::models::{GameRecord, MatchKey};

/// Unit of change detection: one game of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotKey {
    pub match_id: MatchKey,
    pub game_number: Option<u32>,
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.game_number {
            Some(n) => write!(f, "{}_{}", self.match_id, n),
            None => write!(f, "{}_unknown", self.match_id),
        }
    }
}

/// Odds of every observed game at one tick
pub type OddsSnapshot = BTreeMap<SnapshotKey, BTreeMap<String, f64>>;

/// A team's price moved between two consecutive ticks
#[derive(Debug, Clone, PartialEq)]
pub struct OddsChange {
    pub key: SnapshotKey,
    pub team: String,
    pub old_value: f64,
    pub new_value: f64,
}

impl fmt::Display for OddsChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: {} -> {}",
            self.key, self.team, self.old_value, self.new_value
        )
    }
}

/// Build the snapshot of one tick. Records sharing a key keep the last odds seen.
pub fn snapshot<'a>(records: impl IntoIterator<Item = &'a GameRecord>) -> OddsSnapshot {
    records
        .into_iter()
        .map(|r| {
            (
                SnapshotKey {
                    match_id: r.match_id,
                    game_number: r.game_number,
                },
                r.odds.clone(),
            )
        })
        .collect()
}

/// Price changes between the previous and current tick.
///
/// Only teams priced on both sides of the same key are compared, with exact
/// equality. Teams that appear or disappear produce nothing.
pub fn diff(previous: &OddsSnapshot, current: &OddsSnapshot) -> Vec<OddsChange> {
    let mut changes = Vec::new();

    for (key, odds) in current {
        let Some(prev_odds) = previous.get(key) else {
            continue;
        };

        for (team, &new_value) in odds {
            if let Some(&old_value) = prev_odds.get(team) {
                if old_value != new_value {
                    changes.push(OddsChange {
                        key: *key,
                        team: team.clone(),
                        old_value,
                        new_value,
                    });
                }
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: i64, game: Option<u32>) -> SnapshotKey {
        SnapshotKey {
            match_id: MatchKey::Id(id),
            game_number: game,
        }
    }

    fn odds(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    #[test]
    fn test_reports_each_changed_team() {
        let previous = OddsSnapshot::from([(key(100, Some(1)), odds(&[("A", 1.50), ("B", 2.50)]))]);
        let current = OddsSnapshot::from([(key(100, Some(1)), odds(&[("A", 1.60), ("B", 2.30)]))]);

        let changes = diff(&previous, &current);
        assert_eq!(
            changes,
            vec![
                OddsChange {
                    key: key(100, Some(1)),
                    team: "A".to_string(),
                    old_value: 1.50,
                    new_value: 1.60,
                },
                OddsChange {
                    key: key(100, Some(1)),
                    team: "B".to_string(),
                    old_value: 2.50,
                    new_value: 2.30,
                },
            ]
        );
        assert_eq!(changes[0].to_string(), "100_1 - A: 1.5 -> 1.6");
    }

    #[test]
    fn test_unchanged_odds_emit_nothing() {
        let snap = OddsSnapshot::from([(key(1, Some(1)), odds(&[("A", 1.5)]))]);
        assert!(diff(&snap, &snap.clone()).is_empty());
    }

    #[test]
    fn test_appearing_and_disappearing_teams_are_ignored() {
        let previous = OddsSnapshot::from([(key(1, Some(1)), odds(&[("A", 1.5), ("Gone", 3.0)]))]);
        let current = OddsSnapshot::from([(key(1, Some(1)), odds(&[("A", 1.5), ("New", 4.0)]))]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn test_new_keys_and_empty_previous_are_ignored() {
        let current = OddsSnapshot::from([(key(2, None), odds(&[("A", 1.5)]))]);
        assert!(diff(&OddsSnapshot::new(), &current).is_empty());

        let previous = OddsSnapshot::from([(key(1, None), odds(&[("A", 1.4)]))]);
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn test_no_epsilon_tolerance() {
        let previous = OddsSnapshot::from([(key(1, Some(2)), odds(&[("A", 1.5)]))]);
        let current = OddsSnapshot::from([(key(1, Some(2)), odds(&[("A", 1.5000001)]))]);
        assert_eq!(diff(&previous, &current).len(), 1);
    }

    #[test]
    fn test_snapshot_key_display() {
        assert_eq!(key(5, None).to_string(), "5_unknown");
        let unknown = SnapshotKey {
            match_id: MatchKey::Unknown,
            game_number: Some(3),
        };
        assert_eq!(unknown.to_string(), "unknown_3");
    }

    #[test]
    fn test_snapshot_keeps_last_record_per_key() {
        let mut first = GameRecord {
            match_id: MatchKey::Id(1),
            game_number: Some(1),
            match_name: String::new(),
            team1: "A".to_string(),
            team2: "B".to_string(),
            status: String::new(),
            odds: odds(&[("A", 1.5)]),
        };
        let mut second = first.clone();
        second.odds = odds(&[("A", 1.7)]);
        first.status = "first".to_string();

        let snap = snapshot([&first, &second]);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[&key(1, Some(1))]["A"], 1.7);
    }
}
