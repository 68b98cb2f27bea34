//! Console rendering of odds and tracking status

use crate::models::{LiveMatchSummary, PersistedRecord};

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

fn league_or_unknown(league: &str) -> &str {
    if league.is_empty() {
        "Unknown League"
    } else {
        league
    }
}

/// Odds table for one tick
pub fn format_odds(records: &[PersistedRecord], now: &str) -> String {
    if records.is_empty() {
        return "No live games found".to_string();
    }

    let mut out = String::new();
    let rule = "=".repeat(80);
    push_line(&mut out, &rule);
    push_line(&mut out, format!("LIVE LOL ODDS - {}", now));
    push_line(&mut out, &rule);

    for record in records {
        let game = &record.game;
        let game_number = game
            .game_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        push_line(
            &mut out,
            format!("\nGame {}: {} vs {}", game_number, game.team1, game.team2),
        );
        push_line(&mut out, format!("Status: {}", game.status));
        push_line(
            &mut out,
            format!("League: {}", league_or_unknown(&record.parent.league)),
        );

        if game.odds.is_empty() {
            push_line(&mut out, "No odds available");
        } else {
            push_line(&mut out, "Odds:");
            for (team, price) in &game.odds {
                push_line(&mut out, format!("  {}: {}", team, price));
            }
        }
        push_line(&mut out, "-".repeat(60));
    }

    out
}

/// Status block for a tick where no tracked game produced odds
pub fn format_status(tracked: &[LiveMatchSummary], now: &str) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    push_line(&mut out, &rule);
    push_line(&mut out, format!("Monitoring Status - {}", now));
    push_line(&mut out, &rule);

    if tracked.is_empty() {
        push_line(&mut out, "Waiting for tracked matches to resume or end...");
    } else {
        push_line(&mut out, "Tracked matches still live but no games in progress:");
        for m in tracked {
            push_line(
                &mut out,
                format!(
                    "  {} vs {} ({}) | League: {}",
                    m.team1_name,
                    m.team2_name,
                    m.series_score(),
                    league_or_unknown(&m.league_name)
                ),
            );
        }
    }
    push_line(&mut out, "-".repeat(60));

    out
}

/// Listing printed by list-only mode
pub fn format_live_listing(matches: &[LiveMatchSummary]) -> String {
    if matches.is_empty() {
        return "No live matches found".to_string();
    }

    let mut out = String::new();
    push_line(&mut out, "Currently Live LoL Matches:");
    push_line(&mut out, "=".repeat(60));

    for m in matches {
        push_line(&mut out, format!("Match ID: {}", m.match_id));
        push_line(&mut out, format!("Match: {} vs {}", m.team1_name, m.team2_name));
        push_line(&mut out, format!("League: {}", league_or_unknown(&m.league_name)));
        push_line(&mut out, format!("Score: {} - {}", m.score1, m.score2));

        for game in m.games.iter().filter(|g| g.is_live.unwrap_or(false)) {
            let name = game
                .gt_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or("Unknown Game");
            push_line(&mut out, format!("  Live Game: {}", name));
        }
        push_line(&mut out, "-".repeat(40));
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::api::payload::GameNode;
    use crate::models::{GameRecord, MatchKey, ParentMatchInfo};

    fn summary() -> LiveMatchSummary {
        LiveMatchSummary {
            match_id: 100,
            team1_name: "T1".to_string(),
            team2_name: "GEN".to_string(),
            league_name: String::new(),
            score1: 1,
            score2: 1,
            has_live_games: true,
            raw_live_game_count: 1,
            match_type: String::new(),
            games: vec![
                GameNode {
                    gt_name: Some("Game 3".to_string()),
                    is_live: Some(true),
                    ..Default::default()
                },
                GameNode {
                    gt_name: Some("Game 2".to_string()),
                    is_live: Some(false),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_format_odds_lists_each_game() {
        let record = PersistedRecord::new(
            "t",
            GameRecord {
                match_id: MatchKey::Id(100),
                game_number: None,
                match_name: String::new(),
                team1: "T1".to_string(),
                team2: "GEN".to_string(),
                status: "Running".to_string(),
                odds: BTreeMap::from([("T1".to_string(), 1.62)]),
            },
            ParentMatchInfo::default(),
        );

        let out = format_odds(&[record], "2026-10-19 12:00:00");
        assert!(out.contains("LIVE LOL ODDS - 2026-10-19 12:00:00"));
        assert!(out.contains("Game Unknown: T1 vs GEN"));
        assert!(out.contains("League: Unknown League"));
        assert!(out.contains("  T1: 1.62"));
        assert_eq!(format_odds(&[], "now"), "No live games found");
    }

    #[test]
    fn test_format_status() {
        let out = format_status(&[summary()], "now");
        assert!(out.contains("T1 vs GEN (1-1) | League: Unknown League"));

        let waiting = format_status(&[], "now");
        assert!(waiting.contains("Waiting for tracked matches"));
    }

    #[test]
    fn test_listing_shows_only_live_games() {
        let out = format_live_listing(&[summary()]);
        assert!(out.contains("Match ID: 100"));
        assert!(out.contains("Live Game: Game 3"));
        assert!(!out.contains("Game 2"));
    }

    #[test]
    fn test_status_block_is_newline_terminated_lines() {
        let out = format_status(&[], "2026-10-19 12:00:00");
        let lines: Vec<&str> = out.lines().collect();

        assert!(out.ends_with('\n'));
        assert_eq!(
            lines,
            vec![
                "=".repeat(60).as_str(),
                "Monitoring Status - 2026-10-19 12:00:00",
                "=".repeat(60).as_str(),
                "Waiting for tracked matches to resume or end...",
                "-".repeat(60).as_str(),
            ]
        );
    }
}
