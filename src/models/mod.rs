pub mod game_record;
pub mod live_match;

pub use game_record::{GameRecord, MatchKey, ParentMatchInfo, PersistedRecord};
pub use live_match::{LiveMatchSummary, MatchDetail};
