//! Forgetting-curve stability model
//!
//! Each item carries a stability `S` in days: the time constant of an
//! exponential forgetting curve `R(t) = exp(-t / S)`. A review multiplies `S`
//! by a grade-specific factor and the next interval is the time at which
//! predicted retention drops to `TARGET_RETENTION`:
//!
//! - Again: S * 0.6, repetitions reset to 0
//! - Hard:  S * 1.05
//! - Good:  S * 1.35
//! - Easy:  S * 1.6

use super::models::{Grade, ReviewItem, Timestamp, DAY_MS, MIN_STABILITY_DAYS};

/// Retention probability at which the next review is scheduled
pub const TARGET_RETENTION: f64 = 0.9;

/// Multiplicative stability adjustment for a grade
pub fn stability_factor(grade: Grade) -> f64 {
    match grade {
        Grade::Again => 0.6,
        Grade::Hard => 1.05,
        Grade::Good => 1.35,
        Grade::Easy => 1.6,
    }
}

/// Floor a stored stability, treating NaN and non-positive values as zero
fn floor_stability(stability_days: f64) -> f64 {
    let s = if stability_days.is_nan() || stability_days <= 0.0 {
        0.0
    } else {
        stability_days
    };
    s.max(MIN_STABILITY_DAYS)
}

/// Whole-day interval for a stability, never less than one day
pub fn interval_for_stability(stability_days: f64) -> i64 {
    let days = (-stability_days * TARGET_RETENTION.ln()).round() as i64;
    days.max(1)
}

/// Compute the item state after a review with `grade` at `now`
pub fn apply_grade(item: &ReviewItem, grade: Grade, now: Timestamp) -> ReviewItem {
    let s0 = floor_stability(item.stability_days);
    let s1 = (s0 * stability_factor(grade)).max(MIN_STABILITY_DAYS);

    let repetitions = match grade {
        Grade::Again => 0,
        _ => item.repetitions.saturating_add(1),
    };

    let interval_days = interval_for_stability(s1);
    let next_review_at = now.saturating_add(interval_days.saturating_mul(DAY_MS));

    ReviewItem {
        repetitions,
        stability_days: s1,
        interval_days,
        next_review_at: Some(next_review_at),
        ..item.clone()
    }
}

/// `apply_grade` at the current wall-clock time
pub fn apply_grade_now(item: &ReviewItem, grade: Grade) -> ReviewItem {
    apply_grade(item, grade, super::models::now_ms())
}

/// Interval each grade would produce, in `Grade::ALL` order.
/// Used to label review buttons.
pub fn preview_intervals(item: &ReviewItem) -> [i64; 4] {
    Grade::ALL.map(|grade| apply_grade(item, grade, 0).interval_days)
}

/// Format an interval in days to a short label
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
