//! Aggregate player scoring. Two related services live here: a pure
//! rules engine that scores one player's statistics array with league
//! importance multipliers and a duels bonus, and a season scorer that
//! fetches a player's season payload, credits every counting stat for
//! or against them, and settles score duels between two players.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::normalize::{self, node_at};
use crate::provider::StatsFeed;
use crate::role::Role;
use crate::ttl_cache::TtlCache;
use crate::verdict::Winner;

pub const DUELS_BONUS_THRESHOLD: i64 = 15;
pub const RATING_MINUTES_FLOOR: i64 = 500;

/// Verdict of the rules engine over one statistics array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub total: f64,
    pub duels_won: i64,
    pub duels_bonus: bool,
    pub leagues: Vec<LeagueLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueLine {
    pub league_id: Option<u32>,
    pub league_name: Option<String>,
    pub positive: f64,
    pub negative: f64,
    pub multiplier: i32,
    pub weighted: f64,
}

/// World Cup and its qualifiers triple, the top domestic leagues
/// double, everything else counts once.
pub fn league_multiplier(league: Option<u32>) -> i32 {
    match league {
        Some(1) | Some(3) => 3,
        Some(39) | Some(140) | Some(135) | Some(61) | Some(78) | Some(94) => 2,
        _ => 1,
    }
}

/// Scores one player's statistics array. Each competition entry is
/// summed on its own, weighted by league importance, and added to the
/// total; winning more than 15 duels across all entries earns a flat
/// +2 at the end. Nothing is averaged.
pub fn score_statistics(statistics: &[Value]) -> ScoreReport {
    let mut leagues = Vec::new();
    let mut total = 0.0;
    let mut duels_won: i64 = 0;

    for stat in statistics {
        if !stat.is_object() {
            continue;
        }
        let league_id = lenient_league_id(node_at(stat, &["league", "id"]));
        let league_name = non_empty(normalize::text_at(stat, &["league", "name"]));

        let minutes = lenient_int(node_at(stat, &["games", "minutes"]));
        let position = normalize::text_at(stat, &["games", "position"]);
        let rating = normalize::rating_value(node_at(stat, &["games", "rating"]));

        let mut positive = 0.0;
        positive += lenient_int(node_at(stat, &["goals", "total"])) as f64;
        positive += lenient_int(node_at(stat, &["goals", "assists"])) as f64;
        positive += lenient_int(node_at(stat, &["passes", "key"])) as f64;
        positive += lenient_int(node_at(stat, &["tackles", "interceptions"])) as f64;
        positive += lenient_int(node_at(stat, &["dribbles", "success"])) as f64;
        positive += lenient_int(node_at(stat, &["fouls", "drawn"])) as f64;

        let conceded = lenient_int(node_at(stat, &["goals", "conceded"]));
        if conceded == 0 {
            match Role::from_position(&position) {
                Some(Role::Goalkeeper | Role::Defender) => positive += 3.0,
                Some(Role::Midfielder | Role::Forward) => positive += 1.0,
                None => {}
            }
        }

        if minutes >= RATING_MINUTES_FLOOR && !rating.is_nan() {
            if (7.0..8.0).contains(&rating) {
                positive += 1.0;
            } else if (8.0..9.0).contains(&rating) {
                positive += 2.0;
            } else if (9.0..=10.0).contains(&rating) {
                positive += 3.0;
            }
        }

        let penalty = stat
            .get("penalty")
            .and_then(Value::as_object)
            .filter(|p| !p.is_empty());
        if let Some(penalty) = penalty {
            positive += lenient_int(penalty.get("won")) as f64;
            positive += lenient_int(penalty.get("saved")) as f64 * 2.0;
            positive += lenient_int(penalty.get("scored")) as f64;
        }

        let mut negative = 0.0;
        negative += lenient_int(node_at(stat, &["fouls", "committed"])) as f64;
        negative += lenient_int(node_at(stat, &["cards", "yellow"])) as f64;
        negative += lenient_int(node_at(stat, &["cards", "red"])) as f64 * 3.0;
        if conceded > 0 {
            negative += conceded as f64;
        }
        if let Some(penalty) = penalty {
            // the provider spells the field "commited"
            negative += lenient_int(penalty.get("commited")) as f64;
            negative += lenient_int(penalty.get("missed")) as f64;
        }

        duels_won += lenient_int(node_at(stat, &["duels", "won"]));

        let multiplier = league_multiplier(league_id);
        let weighted = (positive - negative) * f64::from(multiplier);
        leagues.push(LeagueLine {
            league_id,
            league_name,
            positive,
            negative,
            multiplier,
            weighted,
        });
        total += weighted;
    }

    let duels_bonus = duels_won > DUELS_BONUS_THRESHOLD;
    if duels_bonus {
        total += 2.0;
    }

    ScoreReport {
        total,
        duels_won,
        duels_bonus,
        leagues,
    }
}

/// One player's season-wide counting-stat balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonScore {
    pub player_id: u32,
    pub name: Option<String>,
    pub season: u32,
    pub positive: f64,
    pub negative: f64,
    pub total: f64,
    pub competitions: Vec<CompetitionLine>,
}

impl SeasonScore {
    fn zeroed(player_id: u32, season: u32) -> Self {
        Self {
            player_id,
            name: None,
            season,
            positive: 0.0,
            negative: 0.0,
            total: 0.0,
            competitions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionLine {
    pub league_id: Option<u32>,
    pub league_name: Option<String>,
    pub positive: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDuel {
    pub a: SeasonScore,
    pub b: SeasonScore,
    pub winner: Winner,
}

/// Computes season scores with one upstream call per player and
/// season inside the cache window.
pub struct SeasonScorer {
    feed: Arc<dyn StatsFeed>,
    scores: TtlCache<SeasonScore>,
}

impl SeasonScorer {
    pub fn new(feed: Arc<dyn StatsFeed>) -> Self {
        Self {
            feed,
            scores: TtlCache::standard(),
        }
    }

    pub fn with_ttl(feed: Arc<dyn StatsFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            scores: TtlCache::new(ttl),
        }
    }

    /// A failed fetch returns a zero score without caching it; an
    /// empty or unusable payload is cached like any other result.
    pub fn season_score(&self, player: u32, season: u32) -> SeasonScore {
        if player == 0 || season == 0 {
            warn!(player, season, "season score rejected, ids must be positive");
            return SeasonScore::zeroed(player, season);
        }
        let key = format!("{player}:{season}");
        if let Some(score) = self.scores.get(&key) {
            return score;
        }
        let body = match self.feed.player_statistics(player, season) {
            Ok(body) => body,
            Err(err) => {
                warn!(player, error = %err, "season score fetch failed, returning zero score");
                return SeasonScore::zeroed(player, season);
            }
        };
        let score = score_from_body(&body, player, season);
        self.scores.put(&key, score.clone());
        score
    }

    pub fn duel(&self, player_a: u32, player_b: u32, season: u32) -> ScoreDuel {
        let (a, b) = rayon::join(
            || self.season_score(player_a, season),
            || self.season_score(player_b, season),
        );
        let winner = if (a.total - b.total).abs() < 1e-9 {
            Winner::Draw
        } else if a.total > b.total {
            Winner::A
        } else {
            Winner::B
        };
        ScoreDuel { a, b, winner }
    }
}

/// Credits every counting stat for or against the player, one
/// competition line per statistics entry. Only the first response
/// entry is read.
fn score_from_body(body: &str, player: u32, season: u32) -> SeasonScore {
    let mut out = SeasonScore::zeroed(player, season);
    let Ok(root) = serde_json::from_str::<Value>(body) else {
        return out;
    };
    let Some(first) = root
        .get("response")
        .and_then(Value::as_array)
        .and_then(|response| response.first())
    else {
        return out;
    };
    out.name = non_empty(normalize::text_at(first, &["player", "name"]));
    let Some(stats) = first.get("statistics").and_then(Value::as_array) else {
        return out;
    };

    for stat in stats {
        if !stat.is_object() {
            continue;
        }
        let league_id = node_at(stat, &["league", "id"])
            .and_then(Value::as_i64)
            .and_then(|id| u32::try_from(id).ok());
        let league_name = non_empty(normalize::text_at(stat, &["league", "name"]));

        let mut positive = 0.0;
        let mut negative = 0.0;
        positive += lenient_num(node_at(stat, &["goals", "total"]));
        positive += lenient_num(node_at(stat, &["goals", "assists"]));
        positive += lenient_num(node_at(stat, &["goals", "saves"]));
        negative += lenient_num(node_at(stat, &["goals", "conceded"]));

        let duels_won = lenient_num(node_at(stat, &["duels", "won"]));
        let mut duels_lost = lenient_num(node_at(stat, &["duels", "lost"]));
        let duels_total = lenient_num(node_at(stat, &["duels", "total"]));
        // lost is often absent while total is present
        if duels_lost <= 0.0 && duels_total > 0.0 && duels_won >= 0.0 {
            let derived = duels_total - duels_won;
            if derived > 0.0 {
                duels_lost = derived;
            }
        }
        positive += duels_won;
        negative += duels_lost.max(0.0);

        positive += lenient_num(node_at(stat, &["dribbles", "success"]));
        positive += lenient_num(node_at(stat, &["passes", "key"]));
        positive += lenient_num(node_at(stat, &["penalty", "saved"]));
        negative += lenient_num(node_at(stat, &["penalty", "missed"]));
        positive += lenient_num(node_at(stat, &["fouls", "drawn"]));
        negative += lenient_num(node_at(stat, &["fouls", "committed"]));
        positive += lenient_num(node_at(stat, &["tackles", "interceptions"]));
        positive += lenient_num(node_at(stat, &["tackles", "blocks"]));
        negative += lenient_num(node_at(stat, &["cards", "yellow"]));
        negative += lenient_num(node_at(stat, &["cards", "red"]));

        out.competitions.push(CompetitionLine {
            league_id,
            league_name,
            positive,
            negative,
        });
        out.positive += positive;
        out.negative += negative;
    }

    out.total = out.positive - out.negative;
    out
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn lenient_int(value: Option<&Value>) -> i64 {
    lenient_parse(value).map_or(0, |v| v.floor() as i64)
}

fn lenient_num(value: Option<&Value>) -> f64 {
    lenient_parse(value).unwrap_or(0.0)
}

fn lenient_league_id(value: Option<&Value>) -> Option<u32> {
    lenient_parse(value).and_then(|v| u32::try_from(v.floor() as i64).ok())
}

/// Numbers and numeric strings count, tolerating a trailing percent
/// sign; anything else is no value.
fn lenient_parse(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.strip_suffix('%').unwrap_or(s).parse::<f64>().ok()
        }
        _ => None,
    }
}
