//! Defensive parsing of upstream payloads into flat snapshots.
//!
//! The hosted API mixes numbers, numeric strings, nulls and nested
//! objects for the same logical field depending on league and season.
//! Every accessor here degrades to zero/empty instead of erroring; the
//! one exception is a player's match rating, where NaN means "no
//! rating" so downstream bonuses can tell silence from a real 0.0.

use serde_json::Value;

use crate::role::Role;

pub fn node_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Numbers pass through, plain numeric strings parse, anything else is
/// 0. Percent-suffixed strings fail the parse and degrade to 0 here.
pub fn int_value(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

pub fn float_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn rating_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

pub fn int_at(value: &Value, path: &[&str]) -> i64 {
    int_value(node_at(value, path))
}

pub fn float_at(value: &Value, path: &[&str]) -> f64 {
    float_value(node_at(value, path))
}

pub fn text_at(value: &Value, path: &[&str]) -> String {
    text_value(node_at(value, path))
}

pub fn uint_at(value: &Value, path: &[&str]) -> u32 {
    u32::try_from(int_at(value, path)).unwrap_or(0)
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// `fixtures.played` style nodes: a bare count, or an object with a
/// `total`.
fn int_or_total(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Object(map)) => int_value(map.get("total")),
        other => int_value(other),
    }
}

/// Card counts arrive bucketed by match minute; buckets hold either a
/// `{total, percentage}` object or a bare number.
fn sum_card_buckets(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Object(buckets)) => buckets
            .values()
            .map(|bucket| int_or_total(Some(bucket)))
            .sum(),
        other => int_value(other),
    }
}

/// The primary key wins whenever it exists, even when null.
fn int_either(value: &Value, primary: &[&str], fallback: &[&str]) -> i64 {
    match node_at(value, primary) {
        Some(node) => int_value(Some(node)),
        None => int_value(node_at(value, fallback)),
    }
}

/// `goals.for/against`: prefer `average.total`, fall back to the bare
/// `total` when the average is absent or unparseable.
fn average_per_match(node: Option<&Value>) -> f64 {
    let Some(node) = node else { return 0.0 };
    if let Some(avg_total) = node_at(node, &["average", "total"]) {
        match avg_total {
            Value::Number(n) => return n.as_f64().unwrap_or(0.0),
            Value::String(s) => {
                if let Ok(parsed) = s.trim().parse::<f64>() {
                    return parsed;
                }
            }
            _ => {}
        }
    }
    float_value(node.get("total"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub team_id: u32,
    pub team_name: String,
    pub points: i64,
    pub goal_diff: i64,
    pub form: String,
    /// `all.played`; None when the row has no overall record at all.
    pub played: Option<i64>,
    pub home_wins: i64,
    pub home_played: i64,
    pub away_wins: i64,
    pub away_played: i64,
}

/// Flattens the nested standings blocks (one inner array per group)
/// into a single table in document order. None when the payload has no
/// usable table.
pub fn parse_standings(raw: &str) -> Option<Vec<StandingRow>> {
    let root: Value = serde_json::from_str(raw).ok()?;
    let response = root.get("response")?.as_array()?;
    let league = response.first()?.get("league")?;
    let blocks = league.get("standings")?.as_array()?;
    if blocks.is_empty() {
        return None;
    }

    let mut table = Vec::new();
    for block in blocks {
        let Some(rows) = block.as_array() else {
            continue;
        };
        for row in rows {
            table.push(StandingRow {
                team_id: uint_at(row, &["team", "id"]),
                team_name: text_at(row, &["team", "name"]),
                points: int_at(row, &["points"]),
                goal_diff: int_at(row, &["goalsDiff"]),
                form: text_at(row, &["form"]),
                played: row
                    .get("all")
                    .filter(|all| all.is_object())
                    .map(|all| int_value(all.get("played"))),
                home_wins: int_at(row, &["home", "win"]),
                home_played: int_at(row, &["home", "played"]),
                away_wins: int_at(row, &["away", "win"]),
                away_played: int_at(row, &["away", "played"]),
            });
        }
    }
    Some(table)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamStats {
    pub goals_for_per_match: f64,
    pub goals_against_per_match: f64,
    pub clean_sheets: i64,
    pub failed_to_score: i64,
    pub yellow_per_game: f64,
    pub red_per_game: f64,
}

/// `/teams/statistics` carries `response` as an object; anything else
/// (error payloads use an array) is a hard stop.
pub fn parse_team_statistics(raw: &str) -> Option<TeamStats> {
    let root: Value = serde_json::from_str(raw).ok()?;
    let response = root.get("response")?;
    if !response.is_object() {
        return None;
    }

    let played = int_or_total(node_at(response, &["fixtures", "played"]));
    let yellow = sum_card_buckets(node_at(response, &["cards", "yellow"]));
    let red = sum_card_buckets(node_at(response, &["cards", "red"]));

    Some(TeamStats {
        goals_for_per_match: average_per_match(node_at(response, &["goals", "for"])),
        goals_against_per_match: average_per_match(node_at(response, &["goals", "against"])),
        clean_sheets: int_at(response, &["clean_sheet", "total"]),
        failed_to_score: int_at(response, &["failed_to_score", "total"]),
        yellow_per_game: safe_ratio(yellow as f64, played as f64),
        red_per_game: safe_ratio(red as f64, played as f64),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadToHead {
    pub wins_a: i64,
    pub wins_b: i64,
    pub draws: i64,
}

/// Counts the last-N meetings by full-time goals. Wins credited to a
/// side only when the winning team id matches a requested id.
pub fn parse_head_to_head(raw: &str, team_a: u32, team_b: u32) -> Option<HeadToHead> {
    let root: Value = serde_json::from_str(raw).ok()?;
    let fixtures = root.get("response")?.as_array()?;

    let mut record = HeadToHead::default();
    for fixture in fixtures {
        let Some(teams) = fixture.get("teams").filter(|t| t.is_object()) else {
            continue;
        };
        let goals_home = int_at(fixture, &["goals", "home"]);
        let goals_away = int_at(fixture, &["goals", "away"]);
        if goals_home == goals_away {
            record.draws += 1;
            continue;
        }
        let winner = if goals_home > goals_away {
            uint_at(teams, &["home", "id"])
        } else {
            uint_at(teams, &["away", "id"])
        };
        if winner == team_a {
            record.wins_a += 1;
        } else if winner == team_b {
            record.wins_b += 1;
        }
    }
    Some(record)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub player_id: u32,
    pub name: String,
    pub age: i64,
    pub nationality: String,
    pub team_id: u32,
    pub league_id: u32,
    pub season: u32,
    pub position: String,
    pub role: Option<Role>,

    pub appearances: i64,
    pub minutes: i64,
    pub clean_sheets: i64,
    /// -1 when the provider does not expose the figure.
    pub big_chances_missed: i64,

    pub goals_per90: f64,
    pub assists_per90: f64,
    pub shots_on_target_per_match: f64,
    pub key_passes_per_match: f64,
    pub xg_per90: f64,
    pub xa_per90: f64,
    pub xgxa_per90: f64,

    pub tackles_per_match: f64,
    pub interceptions_per_match: f64,
    pub blocks_per_match: f64,
    pub clearances_per_match: f64,
    pub goals_conceded_per_match: f64,
    pub aerial_actions_per_match: f64,

    pub gk_save_pct: f64,
    pub yellow_per_game: f64,
    pub red_per_game: f64,
}

/// Picks the statistics block matching team, league and season (a block
/// with no season matches anything), falling back to the first block of
/// the first entry. None when nothing usable exists.
pub fn parse_player_statistics(
    raw: &str,
    league: u32,
    season: u32,
    team: u32,
) -> Option<PlayerSnapshot> {
    let root: Value = serde_json::from_str(raw).ok()?;
    let response = root.get("response")?.as_array()?;
    if response.is_empty() {
        return None;
    }

    let mut chosen: Option<(&Value, &Value)> = None;
    'entries: for entry in response {
        let Some(stats) = entry.get("statistics").and_then(Value::as_array) else {
            continue;
        };
        for stat in stats {
            let stat_team = uint_at(stat, &["team", "id"]);
            let stat_league = uint_at(stat, &["league", "id"]);
            let stat_season = uint_at(stat, &["league", "season"]);
            if stat_team == team && stat_league == league && (stat_season == 0 || stat_season == season)
            {
                chosen = Some((entry, stat));
                break 'entries;
            }
        }
    }
    let (entry, stat) = match chosen {
        Some(pair) => pair,
        None => {
            let entry = response.first()?;
            let stat = entry.get("statistics")?.as_array()?.first()?;
            (entry, stat)
        }
    };

    let appearances = int_either(stat, &["games", "appearances"], &["games", "appearences"]);
    let minutes = int_at(stat, &["games", "minutes"]);
    let position = text_at(stat, &["games", "position"]);

    let goals = int_at(stat, &["goals", "total"]);
    let assists = int_at(stat, &["goals", "assists"]);
    let conceded = int_at(stat, &["goals", "conceded"]);
    let saves = int_at(stat, &["goals", "saves"]);
    let shots_on = int_at(stat, &["shots", "on"]);
    let key_passes = int_at(stat, &["passes", "key"]);
    let tackles = int_at(stat, &["tackles", "total"]);
    let interceptions = int_at(stat, &["tackles", "interceptions"]);
    let blocks = int_at(stat, &["tackles", "blocks"]);
    let yellow = int_at(stat, &["cards", "yellow"]);
    let red = int_at(stat, &["cards", "red"]);
    let clean_sheets = int_either(stat, &["games", "cleansheets"], &["games", "clean_sheets"]);

    let mut clearances = int_at(stat, &["defense", "clearances"]);
    if clearances == 0 {
        clearances = int_at(stat, &["tackles", "clearances"]);
    }

    let big_chances_missed = match node_at(stat, &["big_chances", "missed"]) {
        Some(node) => int_value(Some(node)),
        None => -1,
    };

    let xg = float_at(stat, &["expected", "goals"]);
    let xa = float_at(stat, &["expected", "assists"]);

    let apps_safe = if appearances > 0 {
        appearances as f64
    } else {
        1.0
    };
    let minutes_safe = if minutes > 0 {
        minutes as f64
    } else if appearances > 0 {
        appearances as f64 * 90.0
    } else {
        90.0
    };

    let xg_per90 = if xg > 0.0 { xg * 90.0 / minutes_safe } else { 0.0 };
    let xa_per90 = if xa > 0.0 { xa * 90.0 / minutes_safe } else { 0.0 };

    Some(PlayerSnapshot {
        player_id: uint_at(entry, &["player", "id"]),
        name: text_at(entry, &["player", "name"]),
        age: int_at(entry, &["player", "age"]),
        nationality: text_at(entry, &["player", "nationality"]),
        team_id: team,
        league_id: league,
        season,
        role: Role::from_position(&position),
        position,

        appearances,
        minutes,
        clean_sheets,
        big_chances_missed,

        goals_per90: goals as f64 * 90.0 / minutes_safe,
        assists_per90: assists as f64 * 90.0 / minutes_safe,
        shots_on_target_per_match: shots_on as f64 / apps_safe,
        key_passes_per_match: key_passes as f64 / apps_safe,
        xg_per90,
        xa_per90,
        xgxa_per90: xg_per90 + xa_per90,

        tackles_per_match: tackles as f64 / apps_safe,
        interceptions_per_match: interceptions as f64 / apps_safe,
        blocks_per_match: blocks as f64 / apps_safe,
        clearances_per_match: clearances as f64 / apps_safe,
        goals_conceded_per_match: conceded as f64 / apps_safe,
        // No aerial data on this provider; the metric still renders 0/0.
        aerial_actions_per_match: 0.0,

        gk_save_pct: safe_ratio(saves as f64 * 100.0, (saves + conceded) as f64),
        yellow_per_game: safe_ratio(yellow as f64, appearances as f64),
        red_per_game: safe_ratio(red as f64, appearances as f64),
    })
}
