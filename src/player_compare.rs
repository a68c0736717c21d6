//! Player duel engine. Resolves both players' season snapshots, picks
//! a comparison profile from their on-pitch roles, and scores them
//! over that profile's metric set. Players whose roles disagree (and
//! no profile was requested) fall back to a position-neutral metric
//! set so any pairing still produces a verdict.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::normalize::{self, PlayerSnapshot};
use crate::points::{
    discipline_cost, fmt2, generic_points, graded_points, graded_points_capped, lead_point,
    note_delta,
};
use crate::provider::{FeedError, StatsFeed};
use crate::role::Role;
use crate::ttl_cache::TtlCache;
use crate::verdict::{BreakdownItem, EntityInfo, Provenance, Verdict, Winner};

pub const BIG_DELTA: f64 = 0.25;
pub const SAVE_PERCENT_BIG: f64 = 5.0;
pub const GOALS_CONCEDED_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const TACKLES_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const INTERCEPTIONS_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const KEY_PASSES_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const SHOTS_ON_TARGET_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const GOALS_PER90_DELTA_BIG: f64 = 0.3;
pub const ASSISTS_PER90_DELTA_BIG: f64 = 0.2;
pub const DEF_WORK_DELTA_BIG: f64 = 0.4;
pub const CLEAN_SHEETS_DELTA_BIG: f64 = 5.0;
pub const YELLOW_PER_GAME_DELTA_BIG: f64 = 0.05;
pub const RED_PER_GAME_DELTA_BIG: f64 = 0.02;
pub const BIG_CHANCES_MISSED_DELTA_BIG: f64 = 2.0;
const DISCIPLINE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct PlayerDuelArgs {
    pub league: u32,
    pub season: u32,
    pub team_a: u32,
    pub player_a: u32,
    pub team_b: u32,
    pub player_b: u32,
    /// Comparison profile to force when the players' own roles disagree.
    pub role: Option<Role>,
}

pub struct PlayerComparator {
    feed: Arc<dyn StatsFeed>,
    players_cache: TtlCache<String>,
}

impl PlayerComparator {
    pub fn new(feed: Arc<dyn StatsFeed>) -> Self {
        Self {
            feed,
            players_cache: TtlCache::standard(),
        }
    }

    /// Same engine with a caller-chosen cache lifetime.
    pub fn with_ttl(feed: Arc<dyn StatsFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            players_cache: TtlCache::new(ttl),
        }
    }

    pub fn compare(&self, args: &PlayerDuelArgs) -> Verdict {
        let mut sources = Provenance::default();
        sources.mark_used("players");

        if args.league == 0
            || args.season == 0
            || args.team_a == 0
            || args.team_b == 0
            || args.player_a == 0
            || args.player_b == 0
        {
            warn!(
                league = args.league,
                season = args.season,
                "player duel rejected, all ids must be positive"
            );
            return error_draw("Invalid args", sources);
        }

        let (fetched_a, fetched_b) = rayon::join(
            || self.player_statistics_raw(args.league, args.season, args.team_a, args.player_a),
            || self.player_statistics_raw(args.league, args.season, args.team_b, args.player_b),
        );
        let snap_a = self.resolve_snapshot(fetched_a, args, args.team_a, args.player_a, &mut sources);
        let snap_b = self.resolve_snapshot(fetched_b, args, args.team_b, args.player_b, &mut sources);
        let (Some(snap_a), Some(snap_b)) = (snap_a, snap_b) else {
            return error_draw("Missing player stats (rate limit or unavailable)", sources);
        };

        let profile = dispatch_role(snap_a.role, snap_b.role, args.role);
        let (breakdown, total_a, total_b) = match profile {
            Some(Role::Goalkeeper) => goalkeeper_breakdown(&snap_a, &snap_b),
            Some(Role::Defender) => defender_breakdown(&snap_a, &snap_b),
            Some(Role::Midfielder) => midfielder_breakdown(&snap_a, &snap_b),
            Some(Role::Forward) => forward_breakdown(&snap_a, &snap_b),
            None => generic_breakdown(&snap_a, &snap_b),
        };
        let group = profile.map_or("ANY", Role::group_code);

        debug!(group, score_a = total_a, score_b = total_b, "player duel scored");
        Verdict {
            winner: Winner::from_scores(total_a, total_b),
            score_a: total_a,
            score_b: total_b,
            breakdown,
            entity_a: entity_from(&snap_a),
            entity_b: entity_from(&snap_b),
            position_group: Some(group.to_string()),
            sources,
        }
    }

    /// Fetches a player's season payload, retrying without the season
    /// filter when the primary body carries no response block. The
    /// resolved body is cached either way.
    fn player_statistics_raw(
        &self,
        league: u32,
        season: u32,
        team: u32,
        player: u32,
    ) -> Result<(String, bool), FeedError> {
        let key = format!("players:{league}:{season}:{team}:{player}");
        if let Some(body) = self.players_cache.get(&key) {
            return Ok((body, true));
        }
        let mut body = self.feed.player_statistics(player, season)?;
        if !has_response(&body) {
            debug!(player, season, "player payload empty, retrying without season filter");
            body = self.feed.player_statistics(player, 0)?;
        }
        self.players_cache.put(&key, body.clone());
        Ok((body, false))
    }

    fn resolve_snapshot(
        &self,
        fetched: Result<(String, bool), FeedError>,
        args: &PlayerDuelArgs,
        team: u32,
        player: u32,
        sources: &mut Provenance,
    ) -> Option<PlayerSnapshot> {
        match fetched {
            Ok((body, hit)) => {
                sources.record_fetch(&format!("players:{player}"), hit);
                let snap =
                    normalize::parse_player_statistics(&body, args.league, args.season, team);
                if snap.is_none() {
                    warn!(player, "player statistics unusable, degrading to draw");
                }
                snap
            }
            Err(err) => {
                warn!(player, error = %err, "player statistics fetch failed, degrading to draw");
                None
            }
        }
    }
}

fn has_response(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|root| root.get("response").map(|v| !v.is_null()))
        .unwrap_or(false)
}

/// Matching roles pick the specialized profile regardless of the
/// request; otherwise the requested profile decides, and None selects
/// the position-neutral set.
fn dispatch_role(role_a: Option<Role>, role_b: Option<Role>, requested: Option<Role>) -> Option<Role> {
    match (role_a, role_b) {
        (Some(a), Some(b)) if a == b => Some(a),
        _ => requested,
    }
}

fn error_draw(note: &str, sources: Provenance) -> Verdict {
    let mut out = Verdict::draw();
    out.breakdown.push(BreakdownItem::new("error", 0, 0, note));
    out.sources = sources;
    out
}

fn entity_from(snap: &PlayerSnapshot) -> EntityInfo {
    EntityInfo {
        id: snap.player_id,
        name: snap.name.clone(),
        team_id: Some(snap.team_id),
        league_id: snap.league_id,
        season: snap.season,
        position: (!snap.position.is_empty()).then(|| snap.position.clone()),
        role: snap.role.map(|role| role.group_code().to_string()),
        age: (snap.age > 0).then_some(snap.age),
        nationality: (!snap.nationality.is_empty()).then(|| snap.nationality.clone()),
    }
}

/// Graded duel with an activity guard: when neither side has any
/// signal the metric stays scoreless instead of crediting a tie.
fn guarded_points(a: f64, b: f64, big: f64) -> (i32, i32) {
    if a <= 0.0 && b <= 0.0 {
        return (0, 0);
    }
    if (a - b).abs() >= big {
        return if a > b { (2, 0) } else { (0, 2) };
    }
    if a > b {
        (1, 0)
    } else if b > a {
        (0, 1)
    } else {
        (0, 0)
    }
}

/// Same guard, lower value wins.
fn guarded_points_lower(a: f64, b: f64, big: f64) -> (i32, i32) {
    if a <= 0.0 && b <= 0.0 {
        return (0, 0);
    }
    if (a - b).abs() >= big {
        return if a < b { (2, 0) } else { (0, 2) };
    }
    if a < b {
        (1, 0)
    } else if b < a {
        (0, 1)
    } else {
        (0, 0)
    }
}

fn guarded_lead(a: f64, b: f64) -> (i32, i32) {
    if a <= 0.0 && b <= 0.0 {
        return (0, 0);
    }
    if a > b {
        (1, 0)
    } else if b > a {
        (0, 1)
    } else {
        (0, 0)
    }
}

fn discipline_edge(a: &PlayerSnapshot, b: &PlayerSnapshot) -> i32 {
    let cost_a = discipline_cost(a.yellow_per_game, a.red_per_game);
    let cost_b = discipline_cost(b.yellow_per_game, b.red_per_game);
    if (cost_a - cost_b).abs() < DISCIPLINE_EPSILON {
        return 0;
    }
    i32::from(cost_a < cost_b)
}

fn push_discipline(
    breakdown: &mut Vec<BreakdownItem>,
    total_a: &mut i32,
    total_b: &mut i32,
    a: &PlayerSnapshot,
    b: &PlayerSnapshot,
) {
    let pts_a = discipline_edge(a, b);
    let pts_b = discipline_edge(b, a);
    breakdown.push(BreakdownItem::new(
        "discipline.cards",
        pts_a,
        pts_b,
        "lower is better",
    ));
    *total_a += pts_a;
    *total_b += pts_b;
}

fn note_pct(a: f64, b: f64) -> String {
    format!("a={}%, b={}%", fmt2(a), fmt2(b))
}

fn goalkeeper_breakdown(a: &PlayerSnapshot, b: &PlayerSnapshot) -> (Vec<BreakdownItem>, i32, i32) {
    let mut breakdown = Vec::new();
    let mut total_a = 0;
    let mut total_b = 0;

    let (pts_a, pts_b) = guarded_points(a.gk_save_pct, b.gk_save_pct, SAVE_PERCENT_BIG);
    breakdown.push(BreakdownItem::new(
        "gk.savePct",
        pts_a,
        pts_b,
        note_pct(a.gk_save_pct, b.gk_save_pct),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let (pts_a, pts_b) = guarded_points_lower(
        a.goals_conceded_per_match,
        b.goals_conceded_per_match,
        GOALS_CONCEDED_PER_MATCH_DELTA_BIG,
    );
    breakdown.push(BreakdownItem::new(
        "gk.goalsConcededPerMatch",
        pts_a,
        pts_b,
        note_delta(a.goals_conceded_per_match, b.goals_conceded_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.clean_sheets, b.clean_sheets);
    let pts_b = lead_point(b.clean_sheets, a.clean_sheets);
    breakdown.push(BreakdownItem::new(
        "gk.cleanSheets",
        pts_a,
        pts_b,
        format!("a={}, b={}", a.clean_sheets, b.clean_sheets),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let (pts_a, pts_b) = guarded_lead(a.aerial_actions_per_match, b.aerial_actions_per_match);
    breakdown.push(BreakdownItem::new(
        "gk.aerialActionsPerMatch",
        pts_a,
        pts_b,
        note_delta(a.aerial_actions_per_match, b.aerial_actions_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    push_discipline(&mut breakdown, &mut total_a, &mut total_b, a, b);
    (breakdown, total_a, total_b)
}

fn defender_breakdown(a: &PlayerSnapshot, b: &PlayerSnapshot) -> (Vec<BreakdownItem>, i32, i32) {
    let mut breakdown = Vec::new();
    let mut total_a = 0;
    let mut total_b = 0;

    let pts_a = graded_points(a.tackles_per_match, b.tackles_per_match, TACKLES_PER_MATCH_DELTA_BIG);
    let pts_b = graded_points(b.tackles_per_match, a.tackles_per_match, TACKLES_PER_MATCH_DELTA_BIG);
    breakdown.push(BreakdownItem::new(
        "def.tacklesPerMatch",
        pts_a,
        pts_b,
        note_delta(a.tackles_per_match, b.tackles_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = graded_points(
        a.interceptions_per_match,
        b.interceptions_per_match,
        INTERCEPTIONS_PER_MATCH_DELTA_BIG,
    );
    let pts_b = graded_points(
        b.interceptions_per_match,
        a.interceptions_per_match,
        INTERCEPTIONS_PER_MATCH_DELTA_BIG,
    );
    breakdown.push(BreakdownItem::new(
        "def.interceptionsPerMatch",
        pts_a,
        pts_b,
        note_delta(a.interceptions_per_match, b.interceptions_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.clearances_per_match, b.clearances_per_match);
    let pts_b = lead_point(b.clearances_per_match, a.clearances_per_match);
    breakdown.push(BreakdownItem::new(
        "def.clearancesPerMatch",
        pts_a,
        pts_b,
        note_delta(a.clearances_per_match, b.clearances_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.blocks_per_match, b.blocks_per_match);
    let pts_b = lead_point(b.blocks_per_match, a.blocks_per_match);
    breakdown.push(BreakdownItem::new(
        "def.blocksPerMatch",
        pts_a,
        pts_b,
        note_delta(a.blocks_per_match, b.blocks_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let (pts_a, pts_b) = guarded_points_lower(
        a.goals_conceded_per_match,
        b.goals_conceded_per_match,
        GOALS_CONCEDED_PER_MATCH_DELTA_BIG,
    );
    breakdown.push(BreakdownItem::new(
        "def.goalsConcededPerMatch",
        pts_a,
        pts_b,
        note_delta(a.goals_conceded_per_match, b.goals_conceded_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.key_passes_per_match, b.key_passes_per_match);
    let pts_b = lead_point(b.key_passes_per_match, a.key_passes_per_match);
    breakdown.push(BreakdownItem::new(
        "def.keyPassesPerMatch",
        pts_a,
        pts_b,
        note_delta(a.key_passes_per_match, b.key_passes_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    push_discipline(&mut breakdown, &mut total_a, &mut total_b, a, b);
    (breakdown, total_a, total_b)
}

fn midfielder_breakdown(a: &PlayerSnapshot, b: &PlayerSnapshot) -> (Vec<BreakdownItem>, i32, i32) {
    let mut breakdown = Vec::new();
    let mut total_a = 0;
    let mut total_b = 0;

    let pts_a = graded_points(
        a.key_passes_per_match,
        b.key_passes_per_match,
        KEY_PASSES_PER_MATCH_DELTA_BIG,
    );
    let pts_b = graded_points(
        b.key_passes_per_match,
        a.key_passes_per_match,
        KEY_PASSES_PER_MATCH_DELTA_BIG,
    );
    breakdown.push(BreakdownItem::new(
        "mid.keyPassesPerMatch",
        pts_a,
        pts_b,
        note_delta(a.key_passes_per_match, b.key_passes_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = graded_points(a.assists_per90, b.assists_per90, ASSISTS_PER90_DELTA_BIG);
    let pts_b = graded_points(b.assists_per90, a.assists_per90, ASSISTS_PER90_DELTA_BIG);
    breakdown.push(BreakdownItem::new(
        "mid.assistsPer90",
        pts_a,
        pts_b,
        note_delta(a.assists_per90, b.assists_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = graded_points(a.goals_per90, b.goals_per90, GOALS_PER90_DELTA_BIG);
    let pts_b = graded_points(b.goals_per90, a.goals_per90, GOALS_PER90_DELTA_BIG);
    breakdown.push(BreakdownItem::new(
        "mid.goalsPer90",
        pts_a,
        pts_b,
        note_delta(a.goals_per90, b.goals_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let work_a = a.tackles_per_match + a.interceptions_per_match;
    let work_b = b.tackles_per_match + b.interceptions_per_match;
    let mut pts_a = 0;
    let mut pts_b = 0;
    if (work_a - work_b).abs() >= DEF_WORK_DELTA_BIG {
        if work_a > work_b {
            pts_a = 1;
        } else {
            pts_b = 1;
        }
    }
    breakdown.push(BreakdownItem::new(
        "mid.defWork(tackles+interceptions)",
        pts_a,
        pts_b,
        note_delta(work_a, work_b),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.xgxa_per90, b.xgxa_per90);
    let pts_b = lead_point(b.xgxa_per90, a.xgxa_per90);
    breakdown.push(BreakdownItem::new(
        "mid.xGxAper90",
        pts_a,
        pts_b,
        note_delta(a.xgxa_per90, b.xgxa_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    push_discipline(&mut breakdown, &mut total_a, &mut total_b, a, b);
    (breakdown, total_a, total_b)
}

fn forward_breakdown(a: &PlayerSnapshot, b: &PlayerSnapshot) -> (Vec<BreakdownItem>, i32, i32) {
    let mut breakdown = Vec::new();
    let mut total_a = 0;
    let mut total_b = 0;

    let pts_a = graded_points_capped(a.goals_per90, b.goals_per90, GOALS_PER90_DELTA_BIG, 2);
    let pts_b = graded_points_capped(b.goals_per90, a.goals_per90, GOALS_PER90_DELTA_BIG, 2);
    breakdown.push(BreakdownItem::new(
        "fwd.goalsPer90",
        pts_a,
        pts_b,
        note_delta(a.goals_per90, b.goals_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = graded_points(
        a.shots_on_target_per_match,
        b.shots_on_target_per_match,
        SHOTS_ON_TARGET_PER_MATCH_DELTA_BIG,
    );
    let pts_b = graded_points(
        b.shots_on_target_per_match,
        a.shots_on_target_per_match,
        SHOTS_ON_TARGET_PER_MATCH_DELTA_BIG,
    );
    breakdown.push(BreakdownItem::new(
        "fwd.shotsOnTargetPerMatch",
        pts_a,
        pts_b,
        note_delta(a.shots_on_target_per_match, b.shots_on_target_per_match),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.xg_per90, b.xg_per90);
    let pts_b = lead_point(b.xg_per90, a.xg_per90);
    breakdown.push(BreakdownItem::new(
        "fwd.xGper90",
        pts_a,
        pts_b,
        note_delta(a.xg_per90, b.xg_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    let pts_a = lead_point(a.assists_per90, b.assists_per90);
    let pts_b = lead_point(b.assists_per90, a.assists_per90);
    breakdown.push(BreakdownItem::new(
        "fwd.assistsPer90",
        pts_a,
        pts_b,
        note_delta(a.assists_per90, b.assists_per90),
    ));
    total_a += pts_a;
    total_b += pts_b;

    // Only scored when both sides actually report the figure.
    let mut pts_a = 0;
    let mut pts_b = 0;
    if a.big_chances_missed >= 0 && b.big_chances_missed >= 0 {
        if a.big_chances_missed < b.big_chances_missed {
            pts_a = 1;
        } else if b.big_chances_missed < a.big_chances_missed {
            pts_b = 1;
        }
    }
    breakdown.push(BreakdownItem::new(
        "fwd.bigChancesMissed(lowerBetter)",
        pts_a,
        pts_b,
        format!("a={}, b={}", a.big_chances_missed, b.big_chances_missed),
    ));
    total_a += pts_a;
    total_b += pts_b;

    push_discipline(&mut breakdown, &mut total_a, &mut total_b, a, b);
    (breakdown, total_a, total_b)
}

fn generic_breakdown(a: &PlayerSnapshot, b: &PlayerSnapshot) -> (Vec<BreakdownItem>, i32, i32) {
    let mut breakdown = Vec::new();
    let mut total_a = 0;
    let mut total_b = 0;

    let bcm_a = a.big_chances_missed.max(0) as f64;
    let bcm_b = b.big_chances_missed.max(0) as f64;

    let rows: [(&str, f64, f64, f64, bool); 17] = [
        ("gen.goalsPer90", a.goals_per90, b.goals_per90, GOALS_PER90_DELTA_BIG, false),
        ("gen.assistsPer90", a.assists_per90, b.assists_per90, ASSISTS_PER90_DELTA_BIG, false),
        (
            "gen.shotsOnTargetPerMatch",
            a.shots_on_target_per_match,
            b.shots_on_target_per_match,
            SHOTS_ON_TARGET_PER_MATCH_DELTA_BIG,
            false,
        ),
        (
            "gen.keyPassesPerMatch",
            a.key_passes_per_match,
            b.key_passes_per_match,
            KEY_PASSES_PER_MATCH_DELTA_BIG,
            false,
        ),
        ("gen.xGper90", a.xg_per90, b.xg_per90, GOALS_PER90_DELTA_BIG, false),
        ("gen.xAper90", a.xa_per90, b.xa_per90, ASSISTS_PER90_DELTA_BIG, false),
        ("gen.xGxAper90", a.xgxa_per90, b.xgxa_per90, GOALS_PER90_DELTA_BIG, false),
        (
            "gen.tacklesPerMatch",
            a.tackles_per_match,
            b.tackles_per_match,
            TACKLES_PER_MATCH_DELTA_BIG,
            false,
        ),
        (
            "gen.interceptionsPerMatch",
            a.interceptions_per_match,
            b.interceptions_per_match,
            INTERCEPTIONS_PER_MATCH_DELTA_BIG,
            false,
        ),
        ("gen.blocksPerMatch", a.blocks_per_match, b.blocks_per_match, BIG_DELTA, false),
        (
            "gen.clearancesPerMatch",
            a.clearances_per_match,
            b.clearances_per_match,
            BIG_DELTA,
            false,
        ),
        (
            "gen.goalsConcededPerMatch(lowerBetter)",
            a.goals_conceded_per_match,
            b.goals_conceded_per_match,
            GOALS_CONCEDED_PER_MATCH_DELTA_BIG,
            true,
        ),
        ("gen.gk.savePct", a.gk_save_pct, b.gk_save_pct, SAVE_PERCENT_BIG, false),
        (
            "gen.cleanSheets",
            a.clean_sheets as f64,
            b.clean_sheets as f64,
            CLEAN_SHEETS_DELTA_BIG,
            false,
        ),
        (
            "gen.yellowPerGame(lowerBetter)",
            a.yellow_per_game,
            b.yellow_per_game,
            YELLOW_PER_GAME_DELTA_BIG,
            true,
        ),
        (
            "gen.redPerGame(lowerBetter)",
            a.red_per_game,
            b.red_per_game,
            RED_PER_GAME_DELTA_BIG,
            true,
        ),
        (
            "gen.bigChancesMissed(lowerBetter)",
            bcm_a,
            bcm_b,
            BIG_CHANCES_MISSED_DELTA_BIG,
            true,
        ),
    ];

    for (metric, val_a, val_b, big, lower_better) in rows {
        let (pts_a, pts_b) = generic_points(val_a, val_b, big, lower_better);
        breakdown.push(BreakdownItem::new(metric, pts_a, pts_b, note_delta(val_a, val_b)));
        total_a += pts_a;
        total_b += pts_b;
    }

    (breakdown, total_a, total_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_snapshot() -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: 1,
            name: "Blank".to_string(),
            age: 0,
            nationality: String::new(),
            team_id: 10,
            league_id: 39,
            season: 2024,
            position: String::new(),
            role: None,
            appearances: 0,
            minutes: 0,
            clean_sheets: 0,
            big_chances_missed: -1,
            goals_per90: 0.0,
            assists_per90: 0.0,
            shots_on_target_per_match: 0.0,
            key_passes_per_match: 0.0,
            xg_per90: 0.0,
            xa_per90: 0.0,
            xgxa_per90: 0.0,
            tackles_per_match: 0.0,
            interceptions_per_match: 0.0,
            blocks_per_match: 0.0,
            clearances_per_match: 0.0,
            goals_conceded_per_match: 0.0,
            aerial_actions_per_match: 0.0,
            gk_save_pct: 0.0,
            yellow_per_game: 0.0,
            red_per_game: 0.0,
        }
    }

    #[test]
    fn guarded_points_needs_signal() {
        assert_eq!(guarded_points(0.0, 0.0, 5.0), (0, 0));
        assert_eq!(guarded_points(72.0, 65.0, 5.0), (2, 0));
        assert_eq!(guarded_points(70.0, 68.0, 5.0), (1, 0));
        assert_eq!(guarded_points(68.0, 70.0, 5.0), (0, 1));
        assert_eq!(guarded_points(70.0, 70.0, 5.0), (0, 0));
    }

    #[test]
    fn guarded_points_lower_prefers_smaller() {
        assert_eq!(guarded_points_lower(0.0, 0.0, 0.3), (0, 0));
        assert_eq!(guarded_points_lower(0.8, 1.2, 0.3), (2, 0));
        assert_eq!(guarded_points_lower(1.0, 1.1, 0.3), (1, 0));
        assert_eq!(guarded_points_lower(1.1, 1.0, 0.3), (0, 1));
    }

    #[test]
    fn guarded_lead_needs_signal() {
        assert_eq!(guarded_lead(0.0, 0.0), (0, 0));
        assert_eq!(guarded_lead(1.5, 1.0), (1, 0));
        assert_eq!(guarded_lead(1.0, 1.5), (0, 1));
    }

    #[test]
    fn discipline_edge_prefers_cleaner_record() {
        let mut clean = blank_snapshot();
        clean.yellow_per_game = 0.1;
        let mut dirty = blank_snapshot();
        dirty.yellow_per_game = 0.4;
        dirty.red_per_game = 0.1;
        assert_eq!(discipline_edge(&clean, &dirty), 1);
        assert_eq!(discipline_edge(&dirty, &clean), 0);
        assert_eq!(discipline_edge(&clean, &clean), 0);
    }

    #[test]
    fn dispatch_prefers_matching_roles() {
        assert_eq!(
            dispatch_role(Some(Role::Forward), Some(Role::Forward), Some(Role::Midfielder)),
            Some(Role::Forward)
        );
        assert_eq!(
            dispatch_role(Some(Role::Forward), Some(Role::Defender), Some(Role::Midfielder)),
            Some(Role::Midfielder)
        );
        assert_eq!(dispatch_role(Some(Role::Forward), Some(Role::Defender), None), None);
        assert_eq!(dispatch_role(None, Some(Role::Defender), None), None);
    }

    #[test]
    fn entity_from_drops_empty_fields() {
        let mut snap = blank_snapshot();
        snap.position = "Attacker".to_string();
        snap.role = Some(Role::Forward);
        let entity = entity_from(&snap);
        assert_eq!(entity.position.as_deref(), Some("Attacker"));
        assert_eq!(entity.role.as_deref(), Some("FWD"));
        assert_eq!(entity.age, None);
        assert_eq!(entity.nationality, None);
        assert_eq!(entity.team_id, Some(10));
    }

    #[test]
    fn generic_breakdown_covers_every_metric_once() {
        let a = blank_snapshot();
        let b = blank_snapshot();
        let (breakdown, total_a, total_b) = generic_breakdown(&a, &b);
        assert_eq!(breakdown.len(), 17);
        // all-blank snapshots tie every metric at 1 point apiece
        assert_eq!(total_a, 17);
        assert_eq!(total_b, 17);
        assert!(breakdown.iter().all(|item| item.metric.starts_with("gen.")));
    }
}
