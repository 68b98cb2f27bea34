pub mod odds_extractor;

pub use odds_extractor::{extract, parse_game_number, MatchPayload};
