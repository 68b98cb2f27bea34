//! Wire shapes of the esportsmatrix responses.
//!
//! Every field is optional and decoded leniently; fallbacks are applied once,
//! when a payload is converted into [`LiveMatchSummary`] or extracted into
//! [`GameRecord`](crate::models::GameRecord)s.

use serde::Deserialize;

use super::lenient;
use crate::error::FeedError;
use crate::models::{LiveMatchSummary, MatchDetail};

/// Response of `GetIndexMatchV2`
#[derive(Debug, Default, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "StatusCode", default, deserialize_with = "lenient::int")]
    pub status_code: Option<i64>,

    #[serde(rename = "StatusDesc", default, deserialize_with = "lenient::text")]
    pub status_desc: Option<String>,

    #[serde(rename = "Sport", default, deserialize_with = "lenient::list")]
    pub sports: Vec<SportNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SportNode {
    #[serde(rename = "LG", default, deserialize_with = "lenient::list")]
    pub leagues: Vec<LeagueNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeagueNode {
    #[serde(rename = "BaseLGName", default, deserialize_with = "lenient::text")]
    pub base_lg_name: Option<String>,

    #[serde(rename = "LGName", default, deserialize_with = "lenient::text")]
    pub lg_name: Option<String>,

    #[serde(rename = "LName", default, deserialize_with = "lenient::text")]
    pub l_name: Option<String>,

    #[serde(rename = "Name", default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(rename = "ParentMatch", default, deserialize_with = "lenient::list")]
    pub parent_matches: Vec<ParentMatchNode>,
}

impl LeagueNode {
    /// First non-empty league label, or empty
    pub fn display_name(&self) -> String {
        [&self.base_lg_name, &self.lg_name, &self.l_name, &self.name]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// A series (parent match) in the live listing
#[derive(Debug, Default, Deserialize)]
pub struct ParentMatchNode {
    #[serde(rename = "PMatchNo", default, deserialize_with = "lenient::int")]
    pub p_match_no: Option<i64>,

    #[serde(rename = "PHTName", default, deserialize_with = "lenient::text")]
    pub home_team: Option<String>,

    #[serde(rename = "PATName", default, deserialize_with = "lenient::text")]
    pub away_team: Option<String>,

    #[serde(rename = "PHTScore", default, deserialize_with = "lenient::int")]
    pub home_score: Option<i64>,

    #[serde(rename = "PATScore", default, deserialize_with = "lenient::int")]
    pub away_score: Option<i64>,

    #[serde(rename = "HasLive", default, deserialize_with = "lenient::flag")]
    pub has_live: Option<bool>,

    #[serde(rename = "LiveCnt", default, deserialize_with = "lenient::int")]
    pub live_count: Option<i64>,

    #[serde(rename = "MatchType", default, deserialize_with = "lenient::text")]
    pub match_type: Option<String>,

    #[serde(rename = "Match", default, deserialize_with = "lenient::list")]
    pub games: Vec<GameNode>,
}

/// A single game/market inside a series, shared by listing and detail payloads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameNode {
    #[serde(rename = "MatchNo", default, deserialize_with = "lenient::int")]
    pub match_no: Option<i64>,

    #[serde(rename = "MId", default, deserialize_with = "lenient::int")]
    pub m_id: Option<i64>,

    #[serde(rename = "GTName", default, deserialize_with = "lenient::text")]
    pub gt_name: Option<String>,

    #[serde(rename = "MName", default, deserialize_with = "lenient::text")]
    pub m_name: Option<String>,

    #[serde(rename = "Status", default, deserialize_with = "lenient::text")]
    pub status: Option<String>,

    #[serde(rename = "IsLive", default, deserialize_with = "lenient::flag")]
    pub is_live: Option<bool>,

    /// Team names, only present on detail payloads
    #[serde(rename = "TName1", default, deserialize_with = "lenient::text")]
    pub team1: Option<String>,

    #[serde(rename = "TName2", default, deserialize_with = "lenient::text")]
    pub team2: Option<String>,

    #[serde(rename = "Odds", default, deserialize_with = "lenient::list")]
    pub odds: Vec<OddsGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OddsGroup {
    #[serde(rename = "SEL", default, deserialize_with = "lenient::list")]
    pub selections: Vec<Selection>,
}

/// One priced outcome. `SCode` 1/2 refer to the series' home/away team.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Selection {
    #[serde(rename = "SCode", default, deserialize_with = "lenient::int")]
    pub code: Option<i64>,

    #[serde(rename = "SName", default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(rename = "Odds", default, deserialize_with = "lenient::float")]
    pub price: Option<f64>,
}

/// Response of `GetMatchDetailsByParentV2`
#[derive(Debug, Default, Deserialize)]
pub struct DetailResponse {
    #[serde(rename = "IsSuccess", default, deserialize_with = "lenient::flag")]
    pub is_success: Option<bool>,

    #[serde(rename = "Message", default, deserialize_with = "lenient::text")]
    pub message: Option<String>,

    #[serde(rename = "MatchData", default, deserialize_with = "lenient::list")]
    pub match_data: Vec<GameNode>,
}

impl IndexResponse {
    /// Live series, or the feed's own error when `StatusCode` is not 0
    pub fn into_live_result(self) -> Result<Vec<LiveMatchSummary>, FeedError> {
        if self.status_code != Some(0) {
            return Err(FeedError::Api(
                self.status_desc
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        Ok(self.into_live_matches())
    }

    /// Flatten `Sport[].LG[].ParentMatch[]` into the series that currently
    /// have live games. Series without a usable id are dropped.
    pub fn into_live_matches(self) -> Vec<LiveMatchSummary> {
        let mut live = Vec::new();

        for sport in self.sports {
            for league in sport.leagues {
                let league_name = league.display_name();

                for parent in league.parent_matches {
                    let has_live = parent.has_live.unwrap_or(false);
                    let live_count = parent.live_count.unwrap_or(0);
                    if !has_live || live_count <= 0 {
                        continue;
                    }

                    let Some(match_id) = parent.p_match_no else {
                        tracing::warn!(
                            "Skipping live series without PMatchNo in league '{}'",
                            league_name
                        );
                        continue;
                    };

                    live.push(LiveMatchSummary {
                        match_id,
                        team1_name: non_empty_or(parent.home_team, "Team A"),
                        team2_name: non_empty_or(parent.away_team, "Team B"),
                        league_name: league_name.clone(),
                        score1: parent.home_score.unwrap_or(0),
                        score2: parent.away_score.unwrap_or(0),
                        has_live_games: has_live,
                        raw_live_game_count: live_count,
                        match_type: parent.match_type.unwrap_or_default(),
                        games: parent.games,
                    });
                }
            }
        }

        live
    }
}

impl DetailResponse {
    /// Series detail, or the feed's own error when `IsSuccess` is not true
    pub fn into_detail_result(self) -> Result<MatchDetail, FeedError> {
        if self.is_success != Some(true) {
            return Err(FeedError::Api(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        Ok(MatchDetail {
            games: self.match_data,
        })
    }
}

pub(crate) fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "StatusCode": 0,
        "Sport": [{
            "LG": [{
                "BaseLGName": "",
                "LGName": "LCK",
                "ParentMatch": [
                    {"PMatchNo": 100, "PHTName": "T1", "PATName": "GEN", "PHTScore": 1,
                     "PATScore": "0", "HasLive": true, "LiveCnt": 1, "MatchType": "BO3",
                     "Match": [{"MatchNo": 1001, "GTName": "Game 2 Winner", "Odds": null}]},
                    {"PMatchNo": 101, "HasLive": true, "LiveCnt": 0},
                    {"PMatchNo": 102, "HasLive": false, "LiveCnt": 2},
                    {"PHTName": "No Id", "HasLive": true, "LiveCnt": 1}
                ]
            }, {
                "ParentMatch": [{"PMatchNo": "200", "HasLive": 1, "LiveCnt": 2}]
            }]
        }]
    }"#;

    #[test]
    fn test_listing_flattens_only_live_series() {
        let response: IndexResponse = serde_json::from_str(LISTING).unwrap();
        assert_eq!(response.status_code, Some(0));

        let live = response.into_live_matches();
        let ids: Vec<i64> = live.iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![100, 200]);

        let first = &live[0];
        assert_eq!(first.league_name, "LCK");
        assert_eq!(first.team1_name, "T1");
        assert_eq!(first.score2, 0);
        assert_eq!(first.match_type, "BO3");
        assert_eq!(first.games.len(), 1);
        assert!(first.games[0].odds.is_empty());

        let second = &live[1];
        assert_eq!(second.team1_name, "Team A");
        assert_eq!(second.team2_name, "Team B");
        assert_eq!(second.league_name, "");
        assert_eq!(second.raw_live_game_count, 2);
    }

    #[test]
    fn test_detail_response_decodes() {
        let json = r#"{"IsSuccess": true, "MatchData": [
            {"MId": "77", "MName": "Game 3", "TName1": "FNC", "TName2": "G2",
             "Odds": [{"SEL": [{"SCode": 1, "Odds": "1.90"}]}]}
        ]}"#;
        let detail: DetailResponse = serde_json::from_str(json).unwrap();
        assert_eq!(detail.is_success, Some(true));
        assert_eq!(detail.match_data[0].m_id, Some(77));
        assert_eq!(detail.match_data[0].odds[0].selections[0].price, Some(1.90));
    }

    fn api_message(err: FeedError) -> String {
        match err {
            FeedError::Api(msg) => msg,
            other => panic!("expected feed-reported error, got {:?}", other),
        }
    }

    #[test]
    fn test_listing_rejected_on_nonzero_status() {
        let response: IndexResponse =
            serde_json::from_str(r#"{"StatusCode": 1, "StatusDesc": "Invalid token", "Sport": []}"#)
                .unwrap();
        assert_eq!(api_message(response.into_live_result().unwrap_err()), "Invalid token");

        let missing: IndexResponse = serde_json::from_str(r#"{"Sport": []}"#).unwrap();
        assert_eq!(api_message(missing.into_live_result().unwrap_err()), "Unknown error");

        let ok: IndexResponse = serde_json::from_str(LISTING).unwrap();
        assert_eq!(ok.into_live_result().unwrap().len(), 2);
    }

    #[test]
    fn test_detail_rejected_unless_success() {
        let failed: DetailResponse = serde_json::from_str(
            r#"{"IsSuccess": false, "Message": "Match not found", "MatchData": []}"#,
        )
        .unwrap();
        assert_eq!(api_message(failed.into_detail_result().unwrap_err()), "Match not found");

        let missing: DetailResponse = serde_json::from_str(r#"{"MatchData": []}"#).unwrap();
        assert_eq!(api_message(missing.into_detail_result().unwrap_err()), "Unknown error");

        let ok: DetailResponse =
            serde_json::from_str(r#"{"IsSuccess": true, "MatchData": [{"MId": 5}]}"#).unwrap();
        assert_eq!(ok.into_detail_result().unwrap().games.len(), 1);
    }
}
