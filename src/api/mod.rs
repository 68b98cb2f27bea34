pub mod esportsmatrix;
pub mod lenient;
pub mod payload;

use async_trait::async_trait;

pub use esportsmatrix::EsportsMatrixClient;

use crate::models::{LiveMatchSummary, MatchDetail};

/// Read-only source of live series and their odds.
///
/// Implementations swallow transport and feed-reported failures: a failed
/// listing is an empty one, a failed detail lookup is `None`.
#[async_trait]
pub trait OddsFeed: Send + Sync {
    /// Series currently live, flattened out of the sport/league hierarchy
    async fn list_live_matches(&self) -> Vec<LiveMatchSummary>;

    /// Richer per-series payload
    async fn get_match_detail(&self, match_id: i64) -> Option<MatchDetail>;
}
