//! Point-award primitives shared by the team and player engines.
//! Every rule is a small pure function so the metric pipelines stay
//! readable and the thresholds stay testable in isolation.

pub const FORM_WIN: i64 = 3;
pub const FORM_DRAW: i64 = 1;
pub const FORM_LOSS: i64 = 0;

pub const DISCIPLINE_YELLOW_WEIGHT: f64 = 0.3;
pub const DISCIPLINE_RED_WEIGHT: f64 = 0.05;

/// Threshold point: 1 only when `a` beats `b` by at least `delta`.
/// A gap of exactly `delta` counts as clear.
pub fn cmp_delta(a: f64, b: f64, delta: f64) -> i32 {
    if (a - b).abs() < delta {
        return 0;
    }
    if a > b { 1 } else { 0 }
}

/// Graded points: clear gap takes the full award, a sub-threshold lead
/// takes 1, a tie takes nothing.
pub fn graded_points(a: f64, b: f64, delta: f64) -> i32 {
    graded_points_capped(a, b, delta, 2)
}

pub fn graded_points_capped(a: f64, b: f64, delta: f64, max_pts: i32) -> i32 {
    if (a - b).abs() >= delta {
        return if a > b { max_pts } else { 0 };
    }
    if a > b { 1 } else { 0 }
}

/// Strict lead earns a single point.
pub fn lead_point<T: PartialOrd>(a: T, b: T) -> i32 {
    if a > b { 1 } else { 0 }
}

/// Open-role duel points: an exact tie splits 1/1, otherwise the
/// leader takes 2 plus 3 more on a clear gap. Lower-is-better metrics
/// flip the comparison; the gap test stays on the raw values.
pub fn generic_points(a: f64, b: f64, big: f64, lower_better: bool) -> (i32, i32) {
    if (a - b).abs() < 1e-9 {
        return (1, 1);
    }
    let mut award = 2;
    if (a - b).abs() >= big {
        award += 3;
    }
    let a_leads = if lower_better { a < b } else { a > b };
    if a_leads { (award, 0) } else { (0, award) }
}

pub fn discipline_cost(yellow_per_game: f64, red_per_game: f64) -> f64 {
    yellow_per_game * DISCIPLINE_YELLOW_WEIGHT + red_per_game * DISCIPLINE_RED_WEIGHT
}

/// Win percentage rounded to whole points; no matches means 0.
pub fn percent(wins: i64, played: i64) -> i64 {
    if played <= 0 {
        return 0;
    }
    (wins as f64 * 100.0 / played as f64).round() as i64
}

/// Scores a recent-form string: W=3, D=1, L=0, anything else ignored.
pub fn form_score(form: &str) -> i64 {
    form.trim()
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'W' => FORM_WIN,
            'D' => FORM_DRAW,
            'L' => FORM_LOSS,
            _ => 0,
        })
        .sum()
}

pub fn fmt2(value: f64) -> String {
    format!("{value:.2}")
}

pub fn note_delta(a: f64, b: f64) -> String {
    let d = a - b;
    if d.abs() < 1e-9 {
        return "equal".to_string();
    }
    if d > 0.0 {
        format!("+{}", fmt2(d))
    } else {
        fmt2(d)
    }
}

pub fn note_delta_int(a: i64, b: i64) -> String {
    let d = a - b;
    if d == 0 {
        "equal".to_string()
    } else if d > 0 {
        format!("+{d}")
    } else {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp_delta_requires_clear_gap() {
        assert_eq!(cmp_delta(2.0, 1.6, 0.3), 1);
        assert_eq!(cmp_delta(1.6, 2.0, 0.3), 0);
        assert_eq!(cmp_delta(1.8, 1.7, 0.3), 0);
        assert_eq!(cmp_delta(1.5, 1.5, 0.3), 0);
    }

    #[test]
    fn cmp_delta_boundary_is_inclusive() {
        assert_eq!(cmp_delta(2.0, 1.7, 0.3), 1);
    }

    #[test]
    fn graded_points_tiers() {
        assert_eq!(graded_points(1.0, 0.5, 0.3), 2);
        assert_eq!(graded_points(0.7, 0.5, 0.3), 1);
        assert_eq!(graded_points(0.5, 0.7, 0.3), 0);
        assert_eq!(graded_points(0.5, 0.5, 0.3), 0);
        // boundary gap lands in the big tier
        assert_eq!(graded_points(0.8, 0.5, 0.3), 2);
    }

    #[test]
    fn graded_points_cap() {
        assert_eq!(graded_points_capped(1.0, 0.5, 0.3, 2), 2);
        assert_eq!(graded_points_capped(0.6, 0.5, 0.3, 2), 1);
    }

    #[test]
    fn generic_points_tie_splits() {
        assert_eq!(generic_points(0.4, 0.4, 0.3, false), (1, 1));
    }

    #[test]
    fn generic_points_gap_tiers() {
        assert_eq!(generic_points(0.6, 0.5, 0.3, false), (2, 0));
        assert_eq!(generic_points(0.9, 0.5, 0.3, false), (5, 0));
        assert_eq!(generic_points(0.5, 0.9, 0.3, false), (0, 5));
    }

    #[test]
    fn generic_points_lower_better_flips_leader() {
        assert_eq!(generic_points(0.2, 0.8, 0.3, true), (5, 0));
        assert_eq!(generic_points(0.8, 0.2, 0.3, true), (0, 5));
        assert_eq!(generic_points(0.5, 0.5, 0.3, true), (1, 1));
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn form_scoring() {
        assert_eq!(form_score("WWDLW"), 10);
        assert_eq!(form_score("wdl"), 4);
        assert_eq!(form_score("W-D"), 4);
        assert_eq!(form_score(""), 0);
        assert_eq!(form_score("   "), 0);
    }

    #[test]
    fn notes_render() {
        assert_eq!(note_delta(1.5, 1.5), "equal");
        assert_eq!(note_delta(1.8, 1.5), "+0.30");
        assert_eq!(note_delta(1.5, 1.8), "-0.30");
        assert_eq!(note_delta_int(20, 5), "+15");
        assert_eq!(note_delta_int(5, 20), "-15");
        assert_eq!(note_delta_int(3, 3), "equal");
    }

    #[test]
    fn discipline_cost_weights() {
        assert!((discipline_cost(2.0, 1.0) - 0.65).abs() < 1e-12);
        assert_eq!(discipline_cost(0.0, 0.0), 0.0);
    }
}
