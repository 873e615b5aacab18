//! Request admission
//!
//! One counter per (action class, subject) key. A denied request does not
//! consume budget, and an unreachable counter store fails open: the request
//! is allowed and the fault logged, because availability outranks
//! rate-limit precision.

use crate::config::{ActionClass, RateLimitConfig};
use crate::store::CounterStore;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use prometheus::{register_int_counter_vec_with_registry, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tracing::{debug, error, warn};

lazy_static! {
    static ref RATE_CHECKS: Arc<RwLock<Option<IntCounterVec>>> = Arc::new(RwLock::new(None));
}

/// Register the limiter's check counter with a host-owned registry
///
/// Call once at startup, typically with the same registry the engine
/// metrics use, so one endpoint serves both.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    let checks = register_int_counter_vec_with_registry!(
        Opts::new(
            "concord_rate_checks_total",
            "Rate limit checks by action class and outcome"
        ),
        &["class", "outcome"],
        registry
    )?;
    *RATE_CHECKS.write() = Some(checks);
    Ok(())
}

fn record_check(class: &str, outcome: &str) {
    if let Some(checks) = RATE_CHECKS.read().as_ref() {
        checks.with_label_values(&[class, outcome]).inc();
    }
}

pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or deny one action. Never returns an error.
    pub async fn check(&self, class: ActionClass, subject: &str) -> bool {
        let budget = self.config.budget(class);
        let key = format!("{}:{}:{}", self.config.key_prefix, class.as_str(), subject);

        match self.store.current(&key).await {
            Ok(Some(count)) if count >= budget.limit => {
                warn!(
                    class = %class,
                    subject,
                    limit = budget.limit,
                    window_secs = budget.window.as_secs(),
                    "rate limit exceeded"
                );
                record_check(class.as_str(), "denied");
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                error!(class = %class, error = %e, "counter store unavailable, failing open");
                record_check(class.as_str(), "fail_open");
                return true;
            }
        }

        if let Err(e) = self.store.incr_expire(&key, budget.window).await {
            error!(class = %class, error = %e, "counter store unavailable, failing open");
            record_check(class.as_str(), "fail_open");
            return true;
        }

        record_check(class.as_str(), "allowed");
        debug!(class = %class, subject, "action admitted");
        true
    }
}

/// Resolve the rate-limit subject for an unauthenticated client
///
/// First hop of a trusted `x-forwarded-for` value when present, else the
/// peer address, else `"unknown"`.
pub fn client_key(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> String {
    if let Some(header) = forwarded_for {
        if let Some(first) = header.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    match peer_addr {
        Some(peer) => peer.to_string(),
        None => "unknown".to_string(),
    }
}
