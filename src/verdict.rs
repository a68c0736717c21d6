//! Comparison outcome model. A verdict carries the final call, the
//! per-metric breakdown that produced it, both entities' identity
//! blocks, and a provenance section recording which upstream feeds
//! were consulted and which of those calls were served from cache.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Winner {
    A,
    B,
    Draw,
}

impl Winner {
    /// Strict comparison; equal totals stay a draw.
    pub fn from_scores(score_a: i32, score_b: i32) -> Self {
        if score_a > score_b {
            Winner::A
        } else if score_b > score_a {
            Winner::B
        } else {
            Winner::Draw
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Winner::A => "A",
            Winner::B => "B",
            Winner::Draw => "DRAW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownItem {
    pub metric: String,
    pub points_a: i32,
    pub points_b: i32,
    pub note: String,
}

impl BreakdownItem {
    pub fn new(
        metric: impl Into<String>,
        points_a: i32,
        points_b: i32,
        note: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            points_a,
            points_b,
            note: note.into(),
        }
    }
}

/// Which upstream endpoints fed a verdict, and per fetch whether the
/// body came out of the in-process cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Provenance {
    pub used: BTreeSet<String>,
    pub cache_hits: BTreeMap<String, bool>,
}

impl Provenance {
    pub fn mark_used(&mut self, endpoint: &str) {
        self.used.insert(endpoint.to_string());
    }

    pub fn record_fetch(&mut self, key: &str, cache_hit: bool) {
        self.cache_hits.insert(key.to_string(), cache_hit);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityInfo {
    pub id: u32,
    pub name: String,
    pub team_id: Option<u32>,
    pub league_id: u32,
    pub season: u32,
    pub position: Option<String>,
    pub role: Option<String>,
    pub age: Option<i64>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub winner: Winner,
    pub score_a: i32,
    pub score_b: i32,
    pub breakdown: Vec<BreakdownItem>,
    pub entity_a: EntityInfo,
    pub entity_b: EntityInfo,
    pub position_group: Option<String>,
    pub sources: Provenance,
}

impl Verdict {
    /// Neutral outcome used whenever a comparison cannot run.
    pub fn draw() -> Self {
        Self {
            winner: Winner::Draw,
            score_a: 0,
            score_b: 0,
            breakdown: Vec::new(),
            entity_a: EntityInfo::default(),
            entity_b: EntityInfo::default(),
            position_group: None,
            sources: Provenance::default(),
        }
    }

    /// Sum of one side's breakdown points; equals the score by construction.
    pub fn breakdown_total_a(&self) -> i32 {
        self.breakdown.iter().map(|item| item.points_a).sum()
    }

    pub fn breakdown_total_b(&self) -> i32 {
        self.breakdown.iter().map(|item| item.points_b).sum()
    }
}
