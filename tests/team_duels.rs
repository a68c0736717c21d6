use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use versus_engine::provider::{FeedError, StatsFeed};
use versus_engine::team_compare::{TeamComparator, TeamDuelArgs};
use versus_engine::verdict::{Verdict, Winner};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

struct MockFeed {
    standings: String,
    stats: HashMap<u32, String>,
    h2h: String,
    fail_stats: bool,
    standings_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    h2h_calls: AtomicUsize,
}

impl MockFeed {
    fn laliga() -> Self {
        let mut stats = HashMap::new();
        stats.insert(529, read_fixture("team_stats_barcelona.json"));
        stats.insert(541, read_fixture("team_stats_real_madrid.json"));
        Self {
            standings: read_fixture("standings_laliga_2024.json"),
            stats,
            h2h: read_fixture("h2h_barcelona_real_madrid.json"),
            fail_stats: false,
            standings_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
            h2h_calls: AtomicUsize::new(0),
        }
    }

    /// Two sides with byte-identical standings rows and statistics.
    fn mirror() -> Self {
        let row = |id: u32, name: &str| {
            json!({
                "team": {"id": id, "name": name},
                "points": 82,
                "goalsDiff": 55,
                "form": "WWWDW",
                "all": {"played": 36},
                "home": {"win": 15, "played": 18},
                "away": {"win": 10, "played": 18}
            })
        };
        let standings = json!({
            "response": [{
                "league": {
                    "id": 140,
                    "season": 2024,
                    "standings": [[row(529, "Barcelona"), row(541, "Real Madrid")]]
                }
            }]
        });
        let body = read_fixture("team_stats_barcelona.json");
        let mut stats = HashMap::new();
        stats.insert(529, body.clone());
        stats.insert(541, body);
        Self {
            standings: standings.to_string(),
            stats,
            h2h: String::new(),
            fail_stats: false,
            standings_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
            h2h_calls: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> FeedError {
        FeedError::Status {
            url: "mock".to_string(),
            status: StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl StatsFeed for MockFeed {
    fn standings(&self, _league: u32, _season: u32) -> Result<String, FeedError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.standings.clone())
    }

    fn team_statistics(&self, _league: u32, _season: u32, team: u32) -> Result<String, FeedError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats {
            return Err(Self::unavailable());
        }
        self.stats.get(&team).cloned().ok_or_else(Self::unavailable)
    }

    fn head_to_head(&self, _team_a: u32, _team_b: u32, _last: u32) -> Result<String, FeedError> {
        self.h2h_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.h2h.clone())
    }

    fn player_statistics(&self, _player: u32, _season: u32) -> Result<String, FeedError> {
        Err(Self::unavailable())
    }
}

fn el_clasico(group_stage: bool) -> TeamDuelArgs {
    TeamDuelArgs {
        league: 140,
        season: 2024,
        team_a: 529,
        team_b: 541,
        group_stage,
    }
}

fn line<'a>(verdict: &'a Verdict, metric: &str) -> &'a versus_engine::verdict::BreakdownItem {
    verdict
        .breakdown
        .iter()
        .find(|item| item.metric == metric)
        .unwrap_or_else(|| panic!("metric {metric} should be in the breakdown"))
}

#[test]
fn league_duel_scores_every_metric() {
    let feed = Arc::new(MockFeed::laliga());
    let verdict = TeamComparator::new(feed.clone()).compare(&el_clasico(false));

    assert_eq!(verdict.winner, Winner::A);
    assert_eq!(verdict.score_a, 8);
    assert_eq!(verdict.score_b, 0);
    assert_eq!(verdict.breakdown_total_a(), verdict.score_a);
    assert_eq!(verdict.breakdown_total_b(), verdict.score_b);
    assert_eq!(verdict.entity_a.name, "Barcelona");
    assert_eq!(verdict.entity_b.name, "Real Madrid");
    assert_eq!(verdict.position_group, None);

    let metrics: Vec<&str> = verdict
        .breakdown
        .iter()
        .map(|item| item.metric.as_str())
        .collect();
    assert_eq!(
        metrics,
        [
            "standings.goalDiff",
            "standings.form",
            "standings.homeAwayWinPct",
            "stats.goalsForPerMatch",
            "stats.goalsAgainstPerMatch",
            "stats.cleanSheets",
            "stats.failedToScore",
            "stats.discipline",
            "tier.powerIndex",
        ]
    );

    // head-to-head stays out of league duels
    assert_eq!(feed.h2h_calls.load(Ordering::SeqCst), 0);
    assert!(verdict.sources.used.contains("standings"));
    assert!(verdict.sources.used.contains("teams.statistics"));
    assert!(!verdict.sources.used.contains("headtohead"));
}

#[test]
fn metric_notes_show_both_sides() {
    let feed = Arc::new(MockFeed::laliga());
    let verdict = TeamComparator::new(feed).compare(&el_clasico(false));

    assert_eq!(line(&verdict, "standings.goalDiff").note, "+13");
    assert_eq!(line(&verdict, "standings.form").note, "a=13, b=10");
    assert_eq!(line(&verdict, "standings.homeAwayWinPct").note, "a=69, b=66");
    assert_eq!(line(&verdict, "stats.goalsForPerMatch").note, "a=2.40, b=2.00");
    assert_eq!(line(&verdict, "stats.goalsAgainstPerMatch").note, "a=0.80, b=1.30");
    assert_eq!(line(&verdict, "stats.cleanSheets").note, "a=16, b=12");
    assert_eq!(line(&verdict, "tier.powerIndex").note, "a=1.98, b=1.77");
}

#[test]
fn dead_heat_hands_the_complement_points_to_side_b() {
    let feed = Arc::new(MockFeed::mirror());
    let verdict = TeamComparator::new(feed).compare(&el_clasico(false));

    // mirror-image teams do not draw: each complement metric still pays
    // out its single point, and a tie pays the second side
    assert_eq!(verdict.winner, Winner::B);
    assert_eq!(verdict.score_a, 0);
    assert_eq!(verdict.score_b, 5);
    for metric in [
        "stats.goalsForPerMatch",
        "stats.goalsAgainstPerMatch",
        "stats.cleanSheets",
        "stats.failedToScore",
        "stats.discipline",
    ] {
        let item = line(&verdict, metric);
        assert_eq!((item.points_a, item.points_b), (0, 1), "{metric}");
    }
    // threshold metrics sit the tie out entirely
    for metric in [
        "standings.goalDiff",
        "standings.form",
        "standings.homeAwayWinPct",
        "tier.powerIndex",
    ] {
        let item = line(&verdict, metric);
        assert_eq!((item.points_a, item.points_b), (0, 0), "{metric}");
    }
}

#[test]
fn group_duel_weights_gd_ga_and_head_to_head() {
    let feed = Arc::new(MockFeed::laliga());
    let verdict = TeamComparator::new(feed.clone()).compare(&el_clasico(true));

    assert_eq!(verdict.winner, Winner::A);
    assert_eq!(verdict.score_a, 13);
    assert_eq!(verdict.score_b, 0);
    assert_eq!(verdict.breakdown.len(), 13);
    assert_eq!(verdict.breakdown_total_a(), 13);
    assert_eq!(feed.h2h_calls.load(Ordering::SeqCst), 1);

    let weight_gd = line(&verdict, "groupstage.weight.gd");
    assert_eq!((weight_gd.points_a, weight_gd.points_b), (1, 0));

    let weight_ga = line(&verdict, "groupstage.weight.ga");
    assert_eq!((weight_ga.points_a, weight_ga.points_b), (1, 0));

    let h2h = line(&verdict, "headtohead.last5");
    assert_eq!((h2h.points_a, h2h.points_b), (1, 0));
    assert_eq!(h2h.note, "aW=4, bW=0, D=1");

    let dominance = line(&verdict, "groupstage.bonus.h2hDominance");
    assert_eq!((dominance.points_a, dominance.points_b), (2, 0));

    assert!(verdict.sources.used.contains("headtohead"));
}

#[test]
fn second_duel_is_served_from_cache() {
    let feed = Arc::new(MockFeed::laliga());
    let comparator = TeamComparator::new(feed.clone());
    let first = comparator.compare(&el_clasico(false));
    let second = comparator.compare(&el_clasico(false));

    assert_eq!(feed.standings_calls.load(Ordering::SeqCst), 1);
    assert_eq!(feed.stats_calls.load(Ordering::SeqCst), 2);
    assert_eq!(first.winner, second.winner);
    assert_eq!(first.breakdown, second.breakdown);
    assert!(first.sources.cache_hits.values().all(|hit| !hit));
    assert!(second.sources.cache_hits.values().all(|hit| *hit));
}

#[test]
fn zero_ttl_refetches_every_duel() {
    let feed = Arc::new(MockFeed::laliga());
    let comparator = TeamComparator::with_ttl(feed.clone(), Duration::ZERO);
    comparator.compare(&el_clasico(false));
    comparator.compare(&el_clasico(false));

    assert_eq!(feed.standings_calls.load(Ordering::SeqCst), 2);
    assert_eq!(feed.stats_calls.load(Ordering::SeqCst), 4);
}

#[test]
fn invalid_ids_draw_without_fetching() {
    let feed = Arc::new(MockFeed::laliga());
    let mut args = el_clasico(false);
    args.team_a = 0;
    let verdict = TeamComparator::new(feed.clone()).compare(&args);

    assert_eq!(verdict.winner, Winner::Draw);
    assert_eq!(verdict.score_a, 0);
    assert!(verdict.breakdown.is_empty());
    assert!(verdict.sources.used.is_empty());
    assert!(verdict.sources.cache_hits.is_empty());
    assert_eq!(feed.standings_calls.load(Ordering::SeqCst), 0);
    assert_eq!(feed.stats_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn team_missing_from_standings_degrades_to_draw() {
    let feed = Arc::new(MockFeed::laliga());
    let mut args = el_clasico(false);
    args.team_b = 9999;
    let verdict = TeamComparator::new(feed.clone()).compare(&args);

    assert_eq!(verdict.winner, Winner::Draw);
    assert!(verdict.breakdown.is_empty());
    // the standings were consulted, team stats never were
    assert_eq!(feed.standings_calls.load(Ordering::SeqCst), 1);
    assert_eq!(feed.stats_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_team_statistics_degrade_to_draw() {
    let mut feed = MockFeed::laliga();
    feed.fail_stats = true;
    let verdict = TeamComparator::new(Arc::new(feed)).compare(&el_clasico(false));

    assert_eq!(verdict.winner, Winner::Draw);
    assert_eq!(verdict.score_a, 0);
    assert_eq!(verdict.score_b, 0);
    assert!(verdict.breakdown.is_empty());
    // standings resolved before the stats fetch fell over
    assert_eq!(verdict.entity_a.name, "Barcelona");
}
