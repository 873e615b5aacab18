//! Prometheus metrics for the trust and moderation engine
//!
//! Counters for votes, flags, suppressions, moderation actions, and trust
//! adjustments, plus rank sweep bookkeeping and an operation latency
//! histogram. All metrics register against a shared global registry so a
//! host process can expose one scrape endpoint; the `record_*` helpers are
//! no-ops until [`register_metrics`] has been called.

use lazy_static::lazy_static;
use parking_lot::RwLock;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, HistogramOpts,
    HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;

/// Latency buckets for engine operations (seconds)
const OP_DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

lazy_static! {
    /// Global registry shared across all engine components
    static ref METRICS_REGISTRY: Arc<RwLock<Option<Registry>>> = Arc::new(RwLock::new(None));

    /// Global handle the free helpers record through
    static ref ENGINE_METRICS: Arc<RwLock<Option<Arc<EngineMetrics>>>> = Arc::new(RwLock::new(None));
}

pub struct EngineMetrics {
    /// Votes processed, by target kind and outcome (Counter)
    pub votes_total: IntCounterVec,

    /// Flags filed, by reason (Counter)
    pub flags_total: IntCounterVec,

    /// Automatic suppressions fired, by severity label (Counter)
    pub suppressions_total: IntCounterVec,

    /// Moderation actions applied, by action (Counter)
    pub mod_actions_total: IntCounterVec,

    /// Moderation actions reversed (Counter)
    pub reversals_total: IntCounter,

    /// Trust score adjustments, by reason (Counter)
    pub trust_adjustments_total: IntCounterVec,

    /// Rank sweeps completed (Counter)
    pub rank_sweeps_total: IntCounter,

    /// Posts updated by the most recent rank sweep (Gauge)
    pub rank_sweep_targets: IntGauge,

    /// Engine operation latency, by operation (Histogram)
    pub op_duration_seconds: HistogramVec,
}

impl EngineMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let votes_total = register_int_counter_vec_with_registry!(
            Opts::new("concord_votes_total", "Votes processed by target kind and outcome"),
            &["target_kind", "outcome"],
            registry
        )?;

        let flags_total = register_int_counter_vec_with_registry!(
            Opts::new("concord_flags_total", "Flags filed by reason"),
            &["reason"],
            registry
        )?;

        let suppressions_total = register_int_counter_vec_with_registry!(
            Opts::new("concord_suppressions_total", "Automatic suppressions by severity label"),
            &["label"],
            registry
        )?;

        let mod_actions_total = register_int_counter_vec_with_registry!(
            Opts::new("concord_mod_actions_total", "Moderation actions applied by action"),
            &["action"],
            registry
        )?;

        let reversals_total = register_int_counter_with_registry!(
            Opts::new("concord_reversals_total", "Moderation actions reversed"),
            registry
        )?;

        let trust_adjustments_total = register_int_counter_vec_with_registry!(
            Opts::new("concord_trust_adjustments_total", "Trust score adjustments by reason"),
            &["reason"],
            registry
        )?;

        let rank_sweeps_total = register_int_counter_with_registry!(
            Opts::new("concord_rank_sweeps_total", "Rank sweeps completed"),
            registry
        )?;

        let rank_sweep_targets = register_int_gauge_with_registry!(
            Opts::new("concord_rank_sweep_targets", "Posts updated by the most recent rank sweep"),
            registry
        )?;

        let op_duration_seconds = register_histogram_vec_with_registry!(
            HistogramOpts::new("concord_op_duration_seconds", "Engine operation latency in seconds")
                .buckets(OP_DURATION_BUCKETS.to_vec()),
            &["op"],
            registry
        )?;

        Ok(Self {
            votes_total,
            flags_total,
            suppressions_total,
            mod_actions_total,
            reversals_total,
            trust_adjustments_total,
            rank_sweeps_total,
            rank_sweep_targets,
            op_duration_seconds,
        })
    }
}

/// Initialize the global metrics registry
///
/// Call once during host startup. Subsequent calls return the same handle,
/// so concurrent initializers do not double-register collectors.
pub fn register_metrics() -> Result<Arc<EngineMetrics>, prometheus::Error> {
    let mut handle = ENGINE_METRICS.write();
    if let Some(existing) = handle.as_ref() {
        return Ok(existing.clone());
    }

    let mut registry_lock = METRICS_REGISTRY.write();
    let registry = registry_lock.get_or_insert_with(Registry::new);
    let metrics = Arc::new(EngineMetrics::new(registry)?);
    *handle = Some(metrics.clone());
    Ok(metrics)
}

/// Get the global metrics registry, if initialized
pub fn get_registry() -> Option<Registry> {
    METRICS_REGISTRY.read().clone()
}

fn with_metrics(f: impl FnOnce(&EngineMetrics)) {
    if let Some(metrics) = ENGINE_METRICS.read().as_ref() {
        f(metrics);
    }
}

pub fn record_vote(target_kind: &str, outcome: &str) {
    with_metrics(|m| {
        m.votes_total
            .with_label_values(&[target_kind, outcome])
            .inc()
    });
}

pub fn record_flag(reason: &str) {
    with_metrics(|m| m.flags_total.with_label_values(&[reason]).inc());
}

pub fn record_suppression(label: &str) {
    with_metrics(|m| m.suppressions_total.with_label_values(&[label]).inc());
}

pub fn record_mod_action(action: &str) {
    with_metrics(|m| m.mod_actions_total.with_label_values(&[action]).inc());
}

pub fn record_reversal() {
    with_metrics(|m| m.reversals_total.inc());
}

pub fn record_trust_adjustment(reason: &str) {
    with_metrics(|m| m.trust_adjustments_total.with_label_values(&[reason]).inc());
}

pub fn record_rank_sweep(targets: usize) {
    with_metrics(|m| {
        m.rank_sweeps_total.inc();
        m.rank_sweep_targets.set(targets as i64);
    });
}

pub fn observe_op_duration(op: &str, seconds: f64) {
    with_metrics(|m| m.op_duration_seconds.with_label_values(&[op]).observe(seconds));
}
