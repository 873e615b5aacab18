//! Ranking scheduler
//!
//! Recomputes decaying-gravity ranks for recent posts, either on demand
//! for one post or as a periodic sweep over the active window. Rank is a
//! pure function of the stored aggregate and the clock, so concurrent
//! runs only ever overwrite it with a freshly computed value.

use crate::config::RankConfig;
use crate::error::{EngineError, Result};
use crate::metrics;
use crate::score;
use crate::store::EngineStore;
use crate::types::{TargetId, TargetKind};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error};

#[derive(Clone)]
pub struct RankScheduler {
    store: Arc<dyn EngineStore>,
    config: RankConfig,
}

fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    now.signed_duration_since(created_at).num_milliseconds() as f64 / 3_600_000.0
}

impl RankScheduler {
    pub fn new(store: Arc<dyn EngineStore>, config: RankConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Recompute and store one post's rank, returning the new value
    pub async fn recompute(&self, target_id: TargetId) -> Result<f64> {
        let post = self
            .store
            .target(TargetKind::Post, target_id)
            .await?
            .ok_or(EngineError::TargetNotFound {
                kind: TargetKind::Post,
                id: target_id,
            })?;
        let age = age_hours(post.created_at, Utc::now());
        let rank = score::hot_rank(post.weighted_score, age, &self.config);
        self.store.set_rank(target_id, rank).await?;
        Ok(rank)
    }

    /// Recompute every non-removed post inside the active window
    pub async fn recompute_active(&self) -> Result<usize> {
        let started = Instant::now();
        let now = Utc::now();
        let cutoff = now - chrono::Duration::hours(self.config.max_age_hours);
        let posts = self.store.active_posts(cutoff).await?;

        let mut updated = 0;
        for post in posts {
            let rank = score::hot_rank(post.weighted_score, age_hours(post.created_at, now), &self.config);
            self.store.set_rank(post.id, rank).await?;
            updated += 1;
        }
        metrics::record_rank_sweep(updated);
        metrics::observe_op_duration("rank_sweep", started.elapsed().as_secs_f64());
        Ok(updated)
    }

    /// Run `recompute_active` on a fixed interval until the handle is aborted
    ///
    /// The first sweep fires immediately. Store failures are logged and the
    /// loop keeps ticking; a stale rank is better than a dead scheduler.
    pub fn spawn(&self, every: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                ticker.tick().await;
                let started = Instant::now();
                match scheduler.recompute_active().await {
                    Ok(updated) => debug!(
                        updated,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "rank sweep complete"
                    ),
                    Err(e) => error!(error = %e, "rank sweep failed"),
                }
            }
        })
    }
}
