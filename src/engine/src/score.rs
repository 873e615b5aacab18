//! Pure scoring functions
//!
//! Everything here is deterministic math with no store access: the sigmoid
//! mapping from trust to vote weight, the decaying-gravity rank, and the
//! feed comparator. Voter weight is snapshotted into the vote record at cast
//! time, so `vote_weight` must stay a pure function of its inputs.

use crate::config::{RankConfig, WeightConfig};
use std::cmp::Ordering;

/// Map a trust score to a vote weight.
///
/// Monotonically increasing sigmoid bounded to `[min, max]`, centered at the
/// configured midpoint. At the midpoint the weight is exactly halfway
/// between the bounds (1.55 with the defaults).
pub fn vote_weight(trust_score: f64, config: &WeightConfig) -> f64 {
    let x = (trust_score - config.midpoint) / 10.0;
    let sigmoid = 1.0 / (1.0 + (-x).exp());
    config.min + (config.max - config.min) * sigmoid
}

/// Decaying-gravity rank for feed placement.
///
/// The numerator is `max(|score|, 1)` carrying the score's sign, so a
/// zero-score target still ranks by recency instead of collapsing to zero.
/// The denominator is `(age_hours + 2)^gravity`; the +2 softens the first
/// hours so brand-new content does not dominate on a single vote.
///
/// Idempotent: identical inputs always produce identical output.
pub fn hot_rank(weighted_score: f64, age_hours: f64, config: &RankConfig) -> f64 {
    let magnitude = weighted_score.abs().max(1.0);
    let sign = if weighted_score < 0.0 { -1.0 } else { 1.0 };
    let decay = (age_hours.max(0.0) + 2.0).powf(config.gravity);
    sign * magnitude / decay
}

/// Feed ordering over `(is_pinned, rank)` pairs.
///
/// Pinned content bypasses rank ordering entirely: pinned first, then rank
/// descending. Use with `sort_by` to get the feed order.
pub fn feed_order(a: (bool, f64), b: (bool, f64)) -> Ordering {
    b.0.cmp(&a.0).then(b.1.total_cmp(&a.1))
}
