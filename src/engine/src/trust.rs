//! Trust score ledger
//!
//! Every trust mutation in the system flows through [`TrustLedger`]: direct
//! adjustments call the store's clamped read-modify-write, and moderation
//! transactions carry a [`TrustPatch`] built here so the penalty commits
//! atomically with the action. Nothing else writes `trust_score`.

use crate::config::TrustConfig;
use crate::error::Result;
use crate::metrics;
use crate::store::{EngineStore, TrustPatch};
use crate::types::{ActorId, TargetKind};
use std::sync::Arc;
use tracing::debug;

/// Why a trust score moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustEvent {
    /// Author's post received an upvote
    PostUpvoted,

    /// Author's post received a downvote
    PostDownvoted,

    /// Author's comment received an upvote
    CommentUpvoted,

    /// Author's comment received a downvote; carries no delta by default
    CommentDownvoted,

    /// Author's content was removed by a moderator
    FlagActioned,

    /// Author was formally warned
    Warned,

    /// Author was muted or banned
    Muted,

    /// Reserved: the bonus is configured but no code path triggers it yet
    DailyActive,
}

impl TrustEvent {
    /// Reason label recorded in audit entries and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustEvent::PostUpvoted => "post_upvoted",
            TrustEvent::PostDownvoted => "post_downvoted",
            TrustEvent::CommentUpvoted => "comment_upvoted",
            TrustEvent::CommentDownvoted => "comment_downvoted",
            TrustEvent::FlagActioned => "flag_actioned",
            TrustEvent::Warned => "warned",
            TrustEvent::Muted => "muted",
            TrustEvent::DailyActive => "daily_active",
        }
    }

    /// The event a non-zero vote raises for the target's author
    pub fn from_vote(kind: TargetKind, value: i32) -> Option<Self> {
        match (kind, value) {
            (_, 0) => None,
            (TargetKind::Post, v) if v > 0 => Some(TrustEvent::PostUpvoted),
            (TargetKind::Post, _) => Some(TrustEvent::PostDownvoted),
            (TargetKind::Comment, v) if v > 0 => Some(TrustEvent::CommentUpvoted),
            (TargetKind::Comment, _) => Some(TrustEvent::CommentDownvoted),
        }
    }

    /// Baseline delta from configuration; None when the event carries none
    pub fn base_delta(&self, config: &TrustConfig) -> Option<f64> {
        match self {
            TrustEvent::PostUpvoted => Some(config.post_upvoted),
            TrustEvent::PostDownvoted => Some(config.post_downvoted),
            TrustEvent::CommentUpvoted => Some(config.comment_upvoted),
            TrustEvent::CommentDownvoted => config.comment_downvoted,
            TrustEvent::FlagActioned => Some(config.flag_actioned),
            TrustEvent::Warned => Some(config.warned),
            TrustEvent::Muted => Some(config.muted),
            TrustEvent::DailyActive => Some(config.daily_active),
        }
    }
}

/// Sole writer of actor trust scores
pub struct TrustLedger {
    store: Arc<dyn EngineStore>,
    config: TrustConfig,
}

impl TrustLedger {
    pub fn new(store: Arc<dyn EngineStore>, config: TrustConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Clamped adjustment with its audit entry; returns the new score
    pub async fn adjust(&self, actor: ActorId, delta: f64, reason: &str) -> Result<f64> {
        let new_score = self
            .store
            .adjust_trust(actor, delta, self.config.min, self.config.max, reason)
            .await?;
        metrics::record_trust_adjustment(reason);
        debug!(actor = %actor, delta, new_score, reason, "trust adjusted");
        Ok(new_score)
    }

    /// Apply one event at its baseline delta; None when the event carries no
    /// configured delta
    pub async fn apply(&self, actor: ActorId, event: TrustEvent) -> Result<Option<f64>> {
        self.apply_scaled(actor, event, 1.0).await
    }

    /// Apply one event with its baseline delta multiplied by `scale`
    /// (vote events scale by the voter's snapshot weight)
    pub async fn apply_scaled(
        &self,
        actor: ActorId,
        event: TrustEvent,
        scale: f64,
    ) -> Result<Option<f64>> {
        let Some(base) = event.base_delta(&self.config) else {
            return Ok(None);
        };
        let new_score = self.adjust(actor, base * scale, event.as_str()).await?;
        Ok(Some(new_score))
    }

    /// Rider for a moderation transaction, applied by the store atomically
    /// with the action record; None when the event carries no delta
    pub fn patch(&self, event: TrustEvent) -> Option<TrustPatch> {
        let delta = event.base_delta(&self.config)?;
        Some(TrustPatch {
            delta,
            min: self.config.min,
            max: self.config.max,
            reason: event.as_str().to_string(),
        })
    }
}
