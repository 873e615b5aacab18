//! Engine configuration
//!
//! Every tunable the engine consumes lives here: trust bounds and per-event
//! deltas, the vote-weight sigmoid, rank decay, and flag escalation
//! thresholds. Defaults match the values the forum ships with.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trust bounds and the delta applied for each trust-affecting event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Lower trust bound (default: 0.0)
    pub min: f64,

    /// Upper trust bound (default: 100.0)
    pub max: f64,

    /// Starting trust for new identities (default: 1.0)
    pub initial: f64,

    /// Author delta when their post is upvoted (default: 0.5)
    pub post_upvoted: f64,

    /// Author delta when their post is downvoted (default: -0.3)
    pub post_downvoted: f64,

    /// Author delta when their comment is upvoted (default: 0.3)
    pub comment_upvoted: f64,

    /// Author delta when their comment is downvoted. Unset by default:
    /// minor disagreement is deliberately not punished.
    pub comment_downvoted: Option<f64>,

    /// Author delta when their content is removed (default: -5.0)
    pub flag_actioned: f64,

    /// Author delta on a formal warning (default: -10.0)
    pub warned: f64,

    /// Author delta on mute or ban (default: -20.0)
    pub muted: f64,

    /// Reserved daily-activity bonus (default: 0.1). No code path triggers
    /// it yet; kept so a future scheduler routes through the same ledger.
    pub daily_active: f64,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            initial: 1.0,
            post_upvoted: 0.5,
            post_downvoted: -0.3,
            comment_upvoted: 0.3,
            comment_downvoted: None,
            flag_actioned: -5.0,
            warned: -10.0,
            muted: -20.0,
            daily_active: 0.1,
        }
    }
}

/// Sigmoid mapping from trust score to vote weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Weight floor (default: 0.1)
    pub min: f64,

    /// Weight ceiling (default: 3.0)
    pub max: f64,

    /// Trust score where weight growth is steepest (default: 30.0)
    pub midpoint: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 3.0,
            midpoint: 30.0,
        }
    }
}

/// Decaying-gravity rank parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    /// Exponent on the age denominator (default: 1.8)
    pub gravity: f64,

    /// How often the scheduler sweeps active posts (default: 300s)
    pub recompute_interval: Duration,

    /// Posts older than this stop being swept (default: 48 hours)
    pub max_age_hours: i64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            gravity: 1.8,
            recompute_interval: Duration::from_secs(300), // 5 minutes
            max_age_hours: 48,
        }
    }
}

/// Flag escalation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagConfig {
    /// Pending flags that auto-hide a target (default: 5)
    pub hide_threshold: i64,

    /// Pending flags that escalate the audit label to auto_remove
    /// (default: 10)
    pub remove_threshold: i64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            hide_threshold: 5,
            remove_threshold: 10,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub trust: TrustConfig,
    pub weight: WeightConfig,
    pub rank: RankConfig,
    pub flags: FlagConfig,
}
