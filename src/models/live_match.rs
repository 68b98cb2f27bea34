use crate::api::payload::GameNode;

/// A series currently live on the feed, as listed for one poll
#[derive(Debug, Clone)]
pub struct LiveMatchSummary {
    /// Parent match id (`PMatchNo`)
    pub match_id: i64,

    /// Home team name ("Team A" when the feed omits it)
    pub team1_name: String,

    /// Away team name ("Team B" when the feed omits it)
    pub team2_name: String,

    /// League/tournament name, empty if unknown
    pub league_name: String,

    /// Series score of team 1
    pub score1: i64,

    /// Series score of team 2
    pub score2: i64,

    pub has_live_games: bool,

    /// Number of live games the feed reports for the series
    pub raw_live_game_count: i64,

    /// Series format label (e.g. "BO3"), empty if unknown
    pub match_type: String,

    /// Sub-games embedded in the listing entry
    pub games: Vec<GameNode>,
}

impl LiveMatchSummary {
    /// Series score as "s1-s2"
    pub fn series_score(&self) -> String {
        format!("{}-{}", self.score1, self.score2)
    }
}

/// Sub-games of one series from the detail lookup
#[derive(Debug, Clone, Default)]
pub struct MatchDetail {
    pub games: Vec<GameNode>,
}
