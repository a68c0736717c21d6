use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing_subscriber::EnvFilter;

use versus_engine::config;
use versus_engine::player_compare::{PlayerComparator, PlayerDuelArgs};
use versus_engine::player_score::SeasonScorer;
use versus_engine::provider::{ApiFootballFeed, StatsFeed};
use versus_engine::role::Role;
use versus_engine::team_compare::{TeamComparator, TeamDuelArgs};

const USAGE: &str = "\
Usage:
  versus team <league> <season> <team_a> <team_b> [--group]
  versus player <league> <season> <team_a> <player_a> <team_b> <player_b> [role]
  versus score <player_a> <player_b> <season>

Role codes: GK, DEF, MID, FWD. Verdicts print as JSON on stdout.";

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        bail!("missing command");
    };

    let feed: Arc<dyn StatsFeed> = Arc::new(ApiFootballFeed::from_env()?);
    match command.as_str() {
        "team" => run_team(feed, &args[1..]),
        "player" => run_player(feed, &args[1..]),
        "score" => run_score(feed, &args[1..]),
        other => {
            eprintln!("{USAGE}");
            Err(anyhow!("unknown command: {other}"))
        }
    }
}

fn run_team(feed: Arc<dyn StatsFeed>, rest: &[String]) -> Result<()> {
    let group_stage = rest.iter().any(|arg| arg == "--group");
    let ids = positional(rest);
    if ids.len() != 4 {
        eprintln!("{USAGE}");
        bail!("team takes 4 ids, got {}", ids.len());
    }
    let args = TeamDuelArgs {
        league: parse_id(ids[0], "league")?,
        season: parse_id(ids[1], "season")?,
        team_a: parse_id(ids[2], "team_a")?,
        team_b: parse_id(ids[3], "team_b")?,
        group_stage,
    };
    let verdict = TeamComparator::new(feed).compare(&args);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn run_player(feed: Arc<dyn StatsFeed>, rest: &[String]) -> Result<()> {
    let ids = positional(rest);
    if !(6..=7).contains(&ids.len()) {
        eprintln!("{USAGE}");
        bail!("player takes 6 ids plus an optional role, got {}", ids.len());
    }
    let role = ids
        .get(6)
        .map(|code| Role::from_group_code(code).ok_or_else(|| anyhow!("unknown role: {code}")))
        .transpose()?;
    let args = PlayerDuelArgs {
        league: parse_id(ids[0], "league")?,
        season: parse_id(ids[1], "season")?,
        team_a: parse_id(ids[2], "team_a")?,
        player_a: parse_id(ids[3], "player_a")?,
        team_b: parse_id(ids[4], "team_b")?,
        player_b: parse_id(ids[5], "player_b")?,
        role,
    };
    let verdict = PlayerComparator::new(feed).compare(&args);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn run_score(feed: Arc<dyn StatsFeed>, rest: &[String]) -> Result<()> {
    let ids = positional(rest);
    if ids.len() != 3 {
        eprintln!("{USAGE}");
        bail!("score takes 3 ids, got {}", ids.len());
    }
    let duel = SeasonScorer::new(feed).duel(
        parse_id(ids[0], "player_a")?,
        parse_id(ids[1], "player_b")?,
        parse_id(ids[2], "season")?,
    );
    println!("{}", serde_json::to_string_pretty(&duel)?);
    Ok(())
}

fn positional(rest: &[String]) -> Vec<&String> {
    rest.iter().filter(|arg| !arg.starts_with("--")).collect()
}

fn parse_id(raw: &str, name: &str) -> Result<u32> {
    raw.parse::<u32>()
        .with_context(|| format!("{name} must be a non-negative number, got {raw:?}"))
}
