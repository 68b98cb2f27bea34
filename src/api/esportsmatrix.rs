use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error, info};

use super::payload::{DetailResponse, IndexResponse};
use super::OddsFeed;
use crate::config::Config;
use crate::error::FeedError;
use crate::models::{LiveMatchSummary, MatchDetail};

/// Client for the esportsmatrix betting API
pub struct EsportsMatrixClient {
    client: Client,
    config: Config,
}

impl EsportsMatrixClient {
    /// Create a new client
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch the live listing and flatten it to live series
    pub async fn fetch_live_matches(&self) -> Result<Vec<LiveMatchSummary>, FeedError> {
        let payload = json!({
            "GameCat": self.config.game_cat,
            "SportBLFilter": [{
                "SportId": self.config.sport_id,
                "BaseLGIDs": [-99]
            }],
            "MatchCnt": self.config.match_count,
            "SortType": 1,
            "HasLive": true,
            "Token": null,
            "Language": self.config.language,
            "BettingChannel": self.config.betting_channel,
            "MatchFilter": -99,
            "Timezone": self.config.timezone,
            "Event": "",
            "TriggeredBy": 2,
            "TimeStamp": Utc::now().timestamp()
        });

        let response: IndexResponse = self.post("GetIndexMatchV2", &payload).await?;

        let live = response.into_live_result()?;
        info!("Found {} live matches", live.len());
        Ok(live)
    }

    /// Fetch the detail payload of one series
    pub async fn fetch_match_detail(&self, match_id: i64) -> Result<MatchDetail, FeedError> {
        let payload = json!({
            "GameCat": self.config.game_cat,
            "PMatchNo": match_id,
            "Token": null,
            "Language": self.config.language,
            "BettingChannel": self.config.betting_channel,
            "Grp": -99,
            "GTGrpCnt": 20,
            "Timezone": self.config.timezone,
            "TimeStamp": Utc::now().timestamp()
        });

        let response: DetailResponse = self.post("GetMatchDetailsByParentV2", &payload).await?;
        response.into_detail_result()
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<T, FeedError> {
        let url = format!("{}/{}", self.config.api_url, endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FeedError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl OddsFeed for EsportsMatrixClient {
    async fn list_live_matches(&self) -> Vec<LiveMatchSummary> {
        match self.fetch_live_matches().await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Failed to fetch live matches: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_match_detail(&self, match_id: i64) -> Option<MatchDetail> {
        match self.fetch_match_detail(match_id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                error!("Failed to fetch details for match {}: {}", match_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> EsportsMatrixClient {
        let config = Config {
            api_url: "http://127.0.0.1:1".to_string(),
            request_timeout: 1,
            ..Config::default()
        };
        EsportsMatrixClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_transport_failure_yields_nothing() {
        let client = unreachable_client();

        assert!(client.fetch_live_matches().await.is_err());
        assert!(client.list_live_matches().await.is_empty());
        assert!(client.get_match_detail(1).await.is_none());
    }
}
