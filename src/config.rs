use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Feed settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// esportsmatrix API base URL
    pub api_url: String,

    /// Game category (1 = League of Legends)
    pub game_cat: i64,

    /// Sport id used in the listing filter
    pub sport_id: i64,

    /// Response language code
    pub language: String,

    /// Timezone offset the feed formats kickoff times in
    pub timezone: String,

    pub betting_channel: i64,

    /// Maximum parent matches requested per listing call
    pub match_count: i64,

    /// HTTP request timeout in seconds
    pub request_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://w2e-api.esportsmatrix.io/api/esbull/api".to_string(),
            game_cat: 1,
            sport_id: 45,
            language: "eng".to_string(),
            timezone: "07:00:00".to_string(),
            betting_channel: 1,
            match_count: 50,
            request_timeout: 15,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            api_url: env::var("ODDS_API_URL").unwrap_or(defaults.api_url),
            game_cat: parse_var("ODDS_GAME_CAT", defaults.game_cat)?,
            sport_id: parse_var("ODDS_SPORT_ID", defaults.sport_id)?,
            language: env::var("ODDS_LANGUAGE").unwrap_or(defaults.language),
            timezone: env::var("ODDS_TIMEZONE").unwrap_or(defaults.timezone),
            betting_channel: parse_var("ODDS_BETTING_CHANNEL", defaults.betting_channel)?,
            match_count: parse_var("ODDS_MATCH_COUNT", defaults.match_count)?,
            request_timeout: parse_var("ODDS_REQUEST_TIMEOUT", defaults.request_timeout)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
