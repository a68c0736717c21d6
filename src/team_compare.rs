//! Team duel engine. Scores two sides of the same league season over
//! an ordered set of metrics drawn from the standings table, each
//! team's season statistics, and (for group-stage duels) the last five
//! head-to-head fixtures. Missing or unusable upstream data degrades
//! the duel to a neutral draw instead of an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::normalize::{self, HeadToHead, StandingRow, TeamStats};
use crate::points::{cmp_delta, discipline_cost, fmt2, form_score, lead_point, note_delta_int, percent};
use crate::provider::{FeedError, StatsFeed};
use crate::ttl_cache::TtlCache;
use crate::verdict::{BreakdownItem, EntityInfo, Provenance, Verdict, Winner};

pub const GOALS_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const GA_PER_MATCH_DELTA_BIG: f64 = 0.3;
pub const HOME_AWAY_WINPCT_DELTA_BIG: i64 = 10;
pub const POWER_INDEX_BIG_GAP: f64 = 0.15;
pub const H2H_LAST: u32 = 5;
pub const H2H_DOMINANCE_GAP: i64 = 3;
const DISCIPLINE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct TeamDuelArgs {
    pub league: u32,
    pub season: u32,
    pub team_a: u32,
    pub team_b: u32,
    pub group_stage: bool,
}

pub struct TeamComparator {
    feed: Arc<dyn StatsFeed>,
    standings_cache: TtlCache<String>,
    stats_cache: TtlCache<String>,
    h2h_cache: TtlCache<String>,
}

impl TeamComparator {
    pub fn new(feed: Arc<dyn StatsFeed>) -> Self {
        Self {
            feed,
            standings_cache: TtlCache::standard(),
            stats_cache: TtlCache::standard(),
            h2h_cache: TtlCache::standard(),
        }
    }

    /// Same engine with a caller-chosen cache lifetime.
    pub fn with_ttl(feed: Arc<dyn StatsFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            standings_cache: TtlCache::new(ttl),
            stats_cache: TtlCache::new(ttl),
            h2h_cache: TtlCache::new(ttl),
        }
    }

    pub fn compare(&self, args: &TeamDuelArgs) -> Verdict {
        let (mut entity_a, mut entity_b) = seed_entities(args);
        if args.league == 0 || args.season == 0 || args.team_a == 0 || args.team_b == 0 {
            warn!(
                league = args.league,
                season = args.season,
                team_a = args.team_a,
                team_b = args.team_b,
                "team duel rejected, all ids must be positive"
            );
            return draw_with(entity_a, entity_b, Provenance::default());
        }

        let mut sources = Provenance::default();
        sources.mark_used("standings");
        sources.mark_used("teams.statistics");

        let raw_standings = match self.standings_raw(args.league, args.season) {
            Ok((body, hit)) => {
                sources.record_fetch("standings", hit);
                body
            }
            Err(err) => {
                warn!(error = %err, "standings fetch failed, degrading to draw");
                return draw_with(entity_a, entity_b, sources);
            }
        };
        let Some(rows) = normalize::parse_standings(&raw_standings) else {
            warn!(
                league = args.league,
                season = args.season,
                "standings payload had no table, degrading to draw"
            );
            return draw_with(entity_a, entity_b, sources);
        };
        let Some(row_a) = rows.iter().find(|row| row.team_id == args.team_a) else {
            warn!(team = args.team_a, "team missing from standings, degrading to draw");
            return draw_with(entity_a, entity_b, sources);
        };
        let Some(row_b) = rows.iter().find(|row| row.team_id == args.team_b) else {
            warn!(team = args.team_b, "team missing from standings, degrading to draw");
            return draw_with(entity_a, entity_b, sources);
        };
        let (Some(played_a), Some(played_b)) = (row_a.played, row_b.played) else {
            warn!("standings rows carry no overall record, degrading to draw");
            return draw_with(entity_a, entity_b, sources);
        };
        entity_a.name = row_a.team_name.clone();
        entity_b.name = row_b.team_name.clone();

        let (fetched_a, fetched_b) = rayon::join(
            || self.team_statistics_raw(args.league, args.season, args.team_a),
            || self.team_statistics_raw(args.league, args.season, args.team_b),
        );
        let stats_a = self.resolve_stats(fetched_a, args.team_a, &mut sources);
        let stats_b = self.resolve_stats(fetched_b, args.team_b, &mut sources);
        let (Some(stats_a), Some(stats_b)) = (stats_a, stats_b) else {
            return draw_with(entity_a, entity_b, sources);
        };

        // Head-to-head costs an extra call, so only group duels pay it.
        let h2h = if args.group_stage {
            self.head_to_head_counts(args.team_a, args.team_b, &mut sources)
        } else {
            None
        };

        let mut total_a = 0;
        let mut total_b = 0;
        let mut breakdown: Vec<BreakdownItem> = Vec::new();

        let mut gd_pts_a = lead_point(row_a.goal_diff, row_b.goal_diff);
        let mut gd_pts_b = lead_point(row_b.goal_diff, row_a.goal_diff);
        breakdown.push(BreakdownItem::new(
            "standings.goalDiff",
            gd_pts_a,
            gd_pts_b,
            note_delta_int(row_a.goal_diff, row_b.goal_diff),
        ));
        if args.group_stage {
            if gd_pts_a > gd_pts_b {
                gd_pts_a += 1;
            } else if gd_pts_b > gd_pts_a {
                gd_pts_b += 1;
            }
            breakdown.push(BreakdownItem::new(
                "groupstage.weight.gd",
                i32::from(gd_pts_a > gd_pts_b),
                i32::from(gd_pts_b > gd_pts_a),
                "GD weighted for groups",
            ));
        }
        total_a += gd_pts_a;
        total_b += gd_pts_b;

        let form_a = form_score(&row_a.form);
        let form_b = form_score(&row_b.form);
        let form_pts_a = lead_point(form_a, form_b);
        let form_pts_b = lead_point(form_b, form_a);
        breakdown.push(BreakdownItem::new(
            "standings.form",
            form_pts_a,
            form_pts_b,
            format!("a={form_a}, b={form_b}"),
        ));
        total_a += form_pts_a;
        total_b += form_pts_b;

        let mix_a = win_mix(row_a);
        let mix_b = win_mix(row_b);
        let mut ha_pts_a = 0;
        let mut ha_pts_b = 0;
        if (mix_a - mix_b).abs() >= HOME_AWAY_WINPCT_DELTA_BIG {
            if mix_a > mix_b {
                ha_pts_a = 1;
            } else {
                ha_pts_b = 1;
            }
        }
        breakdown.push(BreakdownItem::new(
            "standings.homeAwayWinPct",
            ha_pts_a,
            ha_pts_b,
            format!("a={mix_a}, b={mix_b}"),
        ));
        total_a += ha_pts_a;
        total_b += ha_pts_b;

        let gf_a = cmp_delta(
            stats_a.goals_for_per_match,
            stats_b.goals_for_per_match,
            GOALS_PER_MATCH_DELTA_BIG,
        );
        breakdown.push(BreakdownItem::new(
            "stats.goalsForPerMatch",
            gf_a,
            1 - gf_a,
            format!(
                "a={}, b={}",
                fmt2(stats_a.goals_for_per_match),
                fmt2(stats_b.goals_for_per_match)
            ),
        ));
        total_a += gf_a;
        total_b += 1 - gf_a;

        let ga_a = cmp_delta(
            stats_b.goals_against_per_match,
            stats_a.goals_against_per_match,
            GA_PER_MATCH_DELTA_BIG,
        );
        breakdown.push(BreakdownItem::new(
            "stats.goalsAgainstPerMatch",
            ga_a,
            1 - ga_a,
            format!(
                "a={}, b={}",
                fmt2(stats_a.goals_against_per_match),
                fmt2(stats_b.goals_against_per_match)
            ),
        ));
        total_a += ga_a;
        total_b += 1 - ga_a;
        if args.group_stage {
            let mut bonus_a = 0;
            let mut bonus_b = 0;
            if stats_a.goals_against_per_match < stats_b.goals_against_per_match {
                bonus_a = 1;
            } else if stats_b.goals_against_per_match < stats_a.goals_against_per_match {
                bonus_b = 1;
            }
            breakdown.push(BreakdownItem::new(
                "groupstage.weight.ga",
                bonus_a,
                bonus_b,
                "GA weighted for groups",
            ));
            total_a += bonus_a;
            total_b += bonus_b;
        }

        let cs_a = lead_point(stats_a.clean_sheets, stats_b.clean_sheets);
        breakdown.push(BreakdownItem::new(
            "stats.cleanSheets",
            cs_a,
            1 - cs_a,
            format!("a={}, b={}", stats_a.clean_sheets, stats_b.clean_sheets),
        ));
        total_a += cs_a;
        total_b += 1 - cs_a;

        let fts_a = lead_point(stats_b.failed_to_score, stats_a.failed_to_score);
        breakdown.push(BreakdownItem::new(
            "stats.failedToScore",
            fts_a,
            1 - fts_a,
            format!("a={}, b={}", stats_a.failed_to_score, stats_b.failed_to_score),
        ));
        total_a += fts_a;
        total_b += 1 - fts_a;

        let cost_a = discipline_cost(stats_a.yellow_per_game, stats_a.red_per_game);
        let cost_b = discipline_cost(stats_b.yellow_per_game, stats_b.red_per_game);
        let disc_a = if (cost_a - cost_b).abs() < DISCIPLINE_EPSILON {
            0
        } else {
            i32::from(cost_a < cost_b)
        };
        breakdown.push(BreakdownItem::new(
            "stats.discipline",
            disc_a,
            1 - disc_a,
            "lower cards per game is better",
        ));
        total_a += disc_a;
        total_b += 1 - disc_a;

        let pi_a = power_index(row_a.points, row_a.goal_diff, played_a);
        let pi_b = power_index(row_b.points, row_b.goal_diff, played_b);
        let mut tier_a = 0;
        let mut tier_b = 0;
        if (pi_a - pi_b).abs() >= POWER_INDEX_BIG_GAP {
            if pi_a > pi_b {
                tier_a = 1;
            } else {
                tier_b = 1;
            }
        }
        breakdown.push(BreakdownItem::new(
            "tier.powerIndex",
            tier_a,
            tier_b,
            format!("a={}, b={}", fmt2(pi_a), fmt2(pi_b)),
        ));
        total_a += tier_a;
        total_b += tier_b;

        if let Some(h2h) = h2h {
            let h2h_pts_a = lead_point(h2h.wins_a, h2h.wins_b);
            let h2h_pts_b = lead_point(h2h.wins_b, h2h.wins_a);
            breakdown.push(BreakdownItem::new(
                "headtohead.last5",
                h2h_pts_a,
                h2h_pts_b,
                format!("aW={}, bW={}, D={}", h2h.wins_a, h2h.wins_b, h2h.draws),
            ));
            total_a += h2h_pts_a;
            total_b += h2h_pts_b;

            if args.group_stage {
                let mut bonus_a = 0;
                let mut bonus_b = 0;
                if (h2h.wins_a - h2h.wins_b).abs() >= H2H_DOMINANCE_GAP {
                    if h2h.wins_a > h2h.wins_b {
                        bonus_a = 2;
                    } else {
                        bonus_b = 2;
                    }
                }
                breakdown.push(BreakdownItem::new(
                    "groupstage.bonus.h2hDominance",
                    bonus_a,
                    bonus_b,
                    "UEFA head-to-head dominance",
                ));
                total_a += bonus_a;
                total_b += bonus_b;
            }
        }

        if total_a == total_b && args.group_stage {
            if form_a > form_b {
                breakdown.push(BreakdownItem::new(
                    "groupstage.tiebreak.form",
                    1,
                    0,
                    "Form tie-breaker",
                ));
                total_a += 1;
            } else if form_b > form_a {
                breakdown.push(BreakdownItem::new(
                    "groupstage.tiebreak.form",
                    0,
                    1,
                    "Form tie-breaker",
                ));
                total_b += 1;
            }
        }

        debug!(score_a = total_a, score_b = total_b, "team duel scored");
        Verdict {
            winner: Winner::from_scores(total_a, total_b),
            score_a: total_a,
            score_b: total_b,
            breakdown,
            entity_a,
            entity_b,
            position_group: None,
            sources,
        }
    }

    fn standings_raw(&self, league: u32, season: u32) -> Result<(String, bool), FeedError> {
        let key = format!("standings:{league}:{season}");
        if let Some(body) = self.standings_cache.get(&key) {
            return Ok((body, true));
        }
        let body = self.feed.standings(league, season)?;
        self.standings_cache.put(&key, body.clone());
        Ok((body, false))
    }

    fn team_statistics_raw(
        &self,
        league: u32,
        season: u32,
        team: u32,
    ) -> Result<(String, bool), FeedError> {
        let key = format!("stats:{league}:{season}:{team}");
        if let Some(body) = self.stats_cache.get(&key) {
            return Ok((body, true));
        }
        let body = self.feed.team_statistics(league, season, team)?;
        self.stats_cache.put(&key, body.clone());
        Ok((body, false))
    }

    fn resolve_stats(
        &self,
        fetched: Result<(String, bool), FeedError>,
        team: u32,
        sources: &mut Provenance,
    ) -> Option<TeamStats> {
        match fetched {
            Ok((body, hit)) => {
                sources.record_fetch(&format!("teams.statistics:{team}"), hit);
                let parsed = normalize::parse_team_statistics(&body);
                if parsed.is_none() {
                    warn!(team, "team statistics unusable, degrading to draw");
                }
                parsed
            }
            Err(err) => {
                warn!(team, error = %err, "team statistics fetch failed, degrading to draw");
                None
            }
        }
    }

    /// Head-to-head is keyed on the unordered pair so either duel
    /// direction shares the cached body; win counts still follow the
    /// caller's A/B order.
    fn head_to_head_counts(
        &self,
        team_a: u32,
        team_b: u32,
        sources: &mut Provenance,
    ) -> Option<HeadToHead> {
        let key = format!("h2h:{}:{}", team_a.min(team_b), team_a.max(team_b));
        let (body, hit) = if let Some(body) = self.h2h_cache.get(&key) {
            (body, true)
        } else {
            match self.feed.head_to_head(team_a, team_b, H2H_LAST) {
                Ok(body) => {
                    self.h2h_cache.put(&key, body.clone());
                    (body, false)
                }
                Err(err) => {
                    warn!(error = %err, "head-to-head fetch failed, skipping the metric");
                    return None;
                }
            }
        };
        sources.mark_used("headtohead");
        sources.record_fetch("headtohead", hit);
        normalize::parse_head_to_head(&body, team_a, team_b)
    }
}

fn seed_entities(args: &TeamDuelArgs) -> (EntityInfo, EntityInfo) {
    let seed = |id: u32| EntityInfo {
        id,
        league_id: args.league,
        season: args.season,
        ..EntityInfo::default()
    };
    (seed(args.team_a), seed(args.team_b))
}

fn draw_with(entity_a: EntityInfo, entity_b: EntityInfo, sources: Provenance) -> Verdict {
    Verdict {
        entity_a,
        entity_b,
        sources,
        ..Verdict::draw()
    }
}

fn win_mix(row: &StandingRow) -> i64 {
    (percent(row.home_wins, row.home_played) + percent(row.away_wins, row.away_played)) / 2
}

fn power_index(points: i64, goal_diff: i64, played: i64) -> f64 {
    if played <= 0 {
        return 0.0;
    }
    0.6 * (points as f64 / played as f64) + 0.4 * (goal_diff as f64 / played as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(home: (i64, i64), away: (i64, i64)) -> StandingRow {
        StandingRow {
            team_id: 1,
            team_name: "Test".to_string(),
            points: 0,
            goal_diff: 0,
            form: String::new(),
            played: Some(0),
            home_wins: home.0,
            home_played: home.1,
            away_wins: away.0,
            away_played: away.1,
        }
    }

    #[test]
    fn win_mix_averages_with_integer_division() {
        // home 67%, away 33% -> (67+33)/2 = 50
        assert_eq!(win_mix(&row((2, 3), (1, 3))), 50);
        // home 33%, away 0% -> 16 after truncation
        assert_eq!(win_mix(&row((1, 3), (0, 3))), 16);
        assert_eq!(win_mix(&row((0, 0), (0, 0))), 0);
    }

    #[test]
    fn power_index_blends_ppg_and_gd() {
        let pi = power_index(30, 10, 10);
        assert!((pi - (0.6 * 3.0 + 0.4 * 1.0)).abs() < 1e-12);
        assert_eq!(power_index(30, 10, 0), 0.0);
    }
}
