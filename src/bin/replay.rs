use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use serde_json::Value;

use versus_engine::player_compare::{PlayerComparator, PlayerDuelArgs};
use versus_engine::player_score::SeasonScorer;
use versus_engine::provider::{FeedError, StatsFeed};
use versus_engine::role::Role;
use versus_engine::team_compare::{TeamComparator, TeamDuelArgs};

/// One duel replayed from canned upstream bodies. `duel` selects the
/// engine; the `*_statistics` maps are keyed by id.
#[derive(Debug, serde::Deserialize)]
struct ReplayCase {
    duel: String,
    #[serde(default)]
    league: u32,
    #[serde(default)]
    season: u32,
    #[serde(default)]
    team_a: u32,
    #[serde(default)]
    team_b: u32,
    #[serde(default)]
    player_a: u32,
    #[serde(default)]
    player_b: u32,
    #[serde(default)]
    group_stage: bool,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    standings: Option<Value>,
    #[serde(default)]
    team_statistics: HashMap<String, Value>,
    #[serde(default)]
    head_to_head: Option<Value>,
    #[serde(default)]
    player_statistics: HashMap<String, Value>,
}

struct CannedFeed {
    standings: Option<String>,
    team_statistics: HashMap<u32, String>,
    head_to_head: Option<String>,
    player_statistics: HashMap<u32, String>,
}

impl CannedFeed {
    fn from_case(case: &ReplayCase) -> Self {
        Self {
            standings: case.standings.as_ref().map(Value::to_string),
            team_statistics: canned_map(&case.team_statistics),
            head_to_head: case.head_to_head.as_ref().map(Value::to_string),
            player_statistics: canned_map(&case.player_statistics),
        }
    }
}

fn canned_map(raw: &HashMap<String, Value>) -> HashMap<u32, String> {
    raw.iter()
        .filter_map(|(id, body)| id.parse::<u32>().ok().map(|id| (id, body.to_string())))
        .collect()
}

fn absent(resource: &str) -> FeedError {
    FeedError::Status {
        url: format!("replay:{resource}"),
        status: StatusCode::NOT_FOUND,
    }
}

impl StatsFeed for CannedFeed {
    fn standings(&self, _league: u32, _season: u32) -> Result<String, FeedError> {
        self.standings.clone().ok_or_else(|| absent("standings"))
    }

    fn team_statistics(&self, _league: u32, _season: u32, team: u32) -> Result<String, FeedError> {
        self.team_statistics
            .get(&team)
            .cloned()
            .ok_or_else(|| absent("team_statistics"))
    }

    fn head_to_head(&self, _team_a: u32, _team_b: u32, _last: u32) -> Result<String, FeedError> {
        self.head_to_head.clone().ok_or_else(|| absent("head_to_head"))
    }

    fn player_statistics(&self, player: u32, _season: u32) -> Result<String, FeedError> {
        self.player_statistics
            .get(&player)
            .cloned()
            .ok_or_else(|| absent("player_statistics"))
    }
}

// Replays one saved duel without touching the network, for inspecting
// scoring changes against known payloads.
fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/replay_team_case.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read replay case {}", path.display()))?;
    let case: ReplayCase = serde_json::from_str(&raw)?;
    let feed: Arc<dyn StatsFeed> = Arc::new(CannedFeed::from_case(&case));

    match case.duel.as_str() {
        "team" => {
            let args = TeamDuelArgs {
                league: case.league,
                season: case.season,
                team_a: case.team_a,
                team_b: case.team_b,
                group_stage: case.group_stage,
            };
            let verdict = TeamComparator::new(feed).compare(&args);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        "player" => {
            let role = case
                .role
                .as_deref()
                .map(|code| {
                    Role::from_group_code(code).ok_or_else(|| anyhow!("unknown role: {code}"))
                })
                .transpose()?;
            let args = PlayerDuelArgs {
                league: case.league,
                season: case.season,
                team_a: case.team_a,
                player_a: case.player_a,
                team_b: case.team_b,
                player_b: case.player_b,
                role,
            };
            let verdict = PlayerComparator::new(feed).compare(&args);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        "score" => {
            let duel = SeasonScorer::new(feed).duel(case.player_a, case.player_b, case.season);
            println!("{}", serde_json::to_string_pretty(&duel)?);
        }
        other => return Err(anyhow!("unknown duel kind: {other}")),
    }

    Ok(())
}
