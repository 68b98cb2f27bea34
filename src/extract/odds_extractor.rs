use std::collections::BTreeMap;

use crate::api::payload::{non_empty_or, GameNode};
use crate::models::{GameRecord, LiveMatchSummary, MatchDetail, MatchKey};

/// Either shape the feed delivers games in
#[derive(Debug, Clone, Copy)]
pub enum MatchPayload<'a> {
    /// Listing entry with its embedded sub-games; team names come from the series
    Summary(&'a LiveMatchSummary),
    /// Detail lookup; team names come from each game
    Detail(&'a MatchDetail),
}

/// Normalize a payload into one record per identifiable game.
///
/// With `target_game` set, only records whose parsed game number equals it are
/// kept (records without a game number are dropped too). A game with neither a
/// game number nor any priced selection is skipped.
pub fn extract(payload: MatchPayload<'_>, target_game: Option<u32>) -> Vec<GameRecord> {
    let (games, parent) = match payload {
        MatchPayload::Summary(summary) => (&summary.games, Some(summary)),
        MatchPayload::Detail(detail) => (&detail.games, None),
    };

    games
        .iter()
        .filter_map(|game| extract_game(game, parent, target_game))
        .collect()
}

fn extract_game(
    game: &GameNode,
    parent: Option<&LiveMatchSummary>,
    target_game: Option<u32>,
) -> Option<GameRecord> {
    let (team1, team2) = match parent {
        Some(p) => (p.team1_name.clone(), p.team2_name.clone()),
        None => (
            non_empty_or(game.team1.clone(), "Team A"),
            non_empty_or(game.team2.clone(), "Team B"),
        ),
    };

    let match_id: MatchKey = game
        .match_no
        .or(game.m_id)
        .or(parent.map(|p| p.match_id))
        .into();

    let title = [&game.gt_name, &game.m_name]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .map(String::as_str)
        .unwrap_or("");
    let game_number = parse_game_number(title);

    if let Some(target) = target_game {
        if game_number != Some(target) {
            return None;
        }
    }

    let mut odds = BTreeMap::new();
    for selection in game.odds.iter().flat_map(|group| &group.selections) {
        let label = match selection.code {
            Some(1) => team1.as_str(),
            Some(2) => team2.as_str(),
            _ => selection.name.as_deref().unwrap_or(""),
        };
        if label.trim().is_empty() {
            continue;
        }

        match selection.price {
            Some(price) if price != 0.0 && price.is_finite() => {
                odds.insert(label.to_string(), price);
            }
            _ => {}
        }
    }

    if game_number.is_none() && odds.is_empty() {
        return None;
    }

    Some(GameRecord {
        match_id,
        game_number,
        match_name: game.gt_name.clone().unwrap_or_default(),
        team1,
        team2,
        status: game.status.clone().unwrap_or_default(),
        odds,
    })
}

/// Game number from a market title: the first token after the literal `Game`.
///
/// `"Game 2 Winner"` -> `Some(2)`; `"Match Winner"` or `"Game two"` -> `None`.
pub fn parse_game_number(title: &str) -> Option<u32> {
    let (_, rest) = title.split_once("Game")?;
    rest.split_whitespace().next()?.parse().ok()
}
