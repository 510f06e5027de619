//! Memorization probability estimate
//!
//! Advisory only: used to rank and display items, never persisted and never
//! fed back into the stability model.

use std::cmp::Ordering;

use super::models::{ReviewItem, Timestamp, DAY_MS, MIN_STABILITY_DAYS};

/// Estimate for items that have never been successfully reviewed
pub const NEW_ITEM_RECALL: f64 = 0.25;

const MIN_RECALL: f64 = 0.01;
const MAX_RECALL: f64 = 0.99;

/// Probability that the item is still remembered at `now`.
///
/// The last review time is reconstructed as `next_review_at - interval`, which
/// assumes the interval was applied from the grading instant.
pub fn estimate_recall_probability(item: &ReviewItem, now: Timestamp) -> f64 {
    let next_review_at = match item.scheduled_at() {
        Some(at) if item.repetitions > 0 => at,
        _ => return NEW_ITEM_RECALL,
    };

    let stability_days = if item.stability_days.is_nan() {
        MIN_STABILITY_DAYS
    } else {
        item.stability_days.max(MIN_STABILITY_DAYS)
    };
    let interval_days = item.interval_days.max(1);

    let last_review_at = next_review_at.saturating_sub(interval_days.saturating_mul(DAY_MS));
    let elapsed_days = (now.saturating_sub(last_review_at) as f64 / DAY_MS as f64).max(0.0);

    (-elapsed_days / stability_days)
        .exp()
        .clamp(MIN_RECALL, MAX_RECALL)
}

/// `estimate_recall_probability` at the current wall-clock time
pub fn estimate_recall_probability_now(item: &ReviewItem) -> f64 {
    estimate_recall_probability(item, super::models::now_ms())
}

/// Sort items weakest first; ties keep a stable order by id
pub fn rank_by_recall(items: &mut [ReviewItem], now: Timestamp) {
    items.sort_by(|a, b| {
        let pa = estimate_recall_probability(a, now);
        let pb = estimate_recall_probability(b, now);
        pa.partial_cmp(&pb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
