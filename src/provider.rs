//! Upstream feed seam. The engines only ever see [`StatsFeed`]; the
//! real implementation speaks the api-sports wire format over blocking
//! HTTP, tests substitute canned bodies.

use anyhow::Result;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::http_client::http_client;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed for {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("FOOTBALL_API_KEY is not configured")]
    MissingCredentials,
}

/// One method per upstream resource, each returning the raw JSON body.
/// A `season` of 0 on the player endpoint means "no season filter".
pub trait StatsFeed: Send + Sync {
    fn standings(&self, league: u32, season: u32) -> Result<String, FeedError>;
    fn team_statistics(&self, league: u32, season: u32, team: u32) -> Result<String, FeedError>;
    fn head_to_head(&self, team_a: u32, team_b: u32, last: u32) -> Result<String, FeedError>;
    fn player_statistics(&self, player: u32, season: u32) -> Result<String, FeedError>;
}

pub struct ApiFootballFeed {
    client: &'static Client,
    api_key: String,
    api_host: String,
}

impl ApiFootballFeed {
    pub fn new(config: FeedConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: config.api_key,
            api_host: config.api_host,
        })
    }

    pub fn from_env() -> Result<Self> {
        let config = FeedConfig::from_env().ok_or(FeedError::MissingCredentials)?;
        Self::new(config)
    }

    fn get(&self, url: String) -> Result<String, FeedError> {
        debug!(%url, "fetching upstream resource");
        let resp = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .map_err(|source| FeedError::Http {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "upstream refused the request");
            return Err(FeedError::Status { url, status });
        }
        resp.text().map_err(|source| FeedError::Http { url, source })
    }
}

impl StatsFeed for ApiFootballFeed {
    fn standings(&self, league: u32, season: u32) -> Result<String, FeedError> {
        self.get(standings_url(&self.api_host, league, season))
    }

    fn team_statistics(&self, league: u32, season: u32, team: u32) -> Result<String, FeedError> {
        self.get(team_statistics_url(&self.api_host, league, season, team))
    }

    fn head_to_head(&self, team_a: u32, team_b: u32, last: u32) -> Result<String, FeedError> {
        self.get(head_to_head_url(&self.api_host, team_a, team_b, last))
    }

    fn player_statistics(&self, player: u32, season: u32) -> Result<String, FeedError> {
        self.get(player_statistics_url(&self.api_host, player, season))
    }
}

fn standings_url(host: &str, league: u32, season: u32) -> String {
    format!("https://{host}/standings?season={season}&league={league}")
}

fn team_statistics_url(host: &str, league: u32, season: u32, team: u32) -> String {
    format!("https://{host}/teams/statistics?league={league}&season={season}&team={team}")
}

fn head_to_head_url(host: &str, team_a: u32, team_b: u32, last: u32) -> String {
    format!("https://{host}/fixtures/headtohead?h2h={team_a}-{team_b}&last={last}")
}

fn player_statistics_url(host: &str, player: u32, season: u32) -> String {
    if season > 0 {
        format!("https://{host}/players?id={player}&season={season}")
    } else {
        format!("https://{host}/players?id={player}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "v3.football.api-sports.io";

    #[test]
    fn builds_standings_url() {
        assert_eq!(
            standings_url(HOST, 39, 2024),
            "https://v3.football.api-sports.io/standings?season=2024&league=39"
        );
    }

    #[test]
    fn builds_team_statistics_url() {
        assert_eq!(
            team_statistics_url(HOST, 39, 2024, 50),
            "https://v3.football.api-sports.io/teams/statistics?league=39&season=2024&team=50"
        );
    }

    #[test]
    fn builds_head_to_head_url() {
        assert_eq!(
            head_to_head_url(HOST, 33, 50, 5),
            "https://v3.football.api-sports.io/fixtures/headtohead?h2h=33-50&last=5"
        );
    }

    #[test]
    fn player_url_drops_zero_season() {
        assert_eq!(
            player_statistics_url(HOST, 874, 2024),
            "https://v3.football.api-sports.io/players?id=874&season=2024"
        );
        assert_eq!(
            player_statistics_url(HOST, 874, 0),
            "https://v3.football.api-sports.io/players?id=874"
        );
    }
}
