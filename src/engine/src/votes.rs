//! Vote ledger
//!
//! At most one vote per (voter, target). A cast is an additive delta against
//! the target's aggregates, committed atomically with the vote row, so
//! re-votes and retractions can never double-apply a voter's contribution.

use crate::config::WeightConfig;
use crate::error::{EngineError, Result};
use crate::metrics;
use crate::score;
use crate::store::{EngineStore, VoteWrite};
use crate::trust::{TrustEvent, TrustLedger};
use crate::types::{ActorId, TargetId, TargetKind, VoteReceipt, VoteRecord};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct VoteLedger {
    store: Arc<dyn EngineStore>,
    trust: Arc<TrustLedger>,
    weight: WeightConfig,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn EngineStore>, trust: Arc<TrustLedger>, weight: WeightConfig) -> Self {
        Self {
            store,
            trust,
            weight,
        }
    }

    /// Cast, change, or retract a vote
    ///
    /// `value` is 1, -1, or 0 to retract. Re-sending the current value is an
    /// idempotent no-op. The author's trust moves on new and changed votes,
    /// scaled by the voter's snapshot weight; retraction never unwinds it.
    pub async fn cast_vote(
        &self,
        voter_id: ActorId,
        kind: TargetKind,
        target_id: TargetId,
        value: i32,
    ) -> Result<VoteReceipt> {
        if !matches!(value, -1 | 0 | 1) {
            return Err(EngineError::InvalidVote(value));
        }
        let started = Instant::now();
        let voter = self
            .store
            .actor(voter_id)
            .await?
            .ok_or(EngineError::ActorNotFound(voter_id))?;
        let target = self
            .store
            .target(kind, target_id)
            .await?
            .ok_or(EngineError::TargetNotFound { kind, id: target_id })?;
        if target.is_removed {
            // Suppressed content reads as absent to voters
            return Err(EngineError::TargetNotFound { kind, id: target_id });
        }
        if target.author == voter_id {
            debug!(voter = %voter_id, target = %target_id, "self-vote rejected");
            return Err(EngineError::SelfVote);
        }

        let existing = self.store.vote(voter_id, kind, target_id).await?;

        // Weight snapshot taken whenever a non-zero value lands
        let mut snapshot = None;
        let (write, score_delta, weighted_delta, outcome) = match (&existing, value) {
            (None, 0) => {
                // Retracting a vote that was never cast changes nothing
                metrics::record_vote(kind.as_str(), "unchanged");
                return Ok(VoteReceipt {
                    vote_score: target.vote_score,
                    weighted_score: target.weighted_score,
                    viewer_vote: None,
                });
            }
            (Some(vote), v) if v == vote.value => {
                metrics::record_vote(kind.as_str(), "unchanged");
                return Ok(VoteReceipt {
                    vote_score: target.vote_score,
                    weighted_score: target.weighted_score,
                    viewer_vote: Some(v),
                });
            }
            (None, v) => {
                let weight = score::vote_weight(voter.trust_score, &self.weight);
                snapshot = Some(weight);
                let record = VoteRecord {
                    id: Uuid::new_v4(),
                    voter: voter_id,
                    target_kind: kind,
                    target_id,
                    value: v,
                    weight,
                    created_at: Utc::now(),
                };
                (
                    VoteWrite::Insert(record),
                    v as i64,
                    v as f64 * weight,
                    "cast",
                )
            }
            (Some(vote), 0) => (
                VoteWrite::Retract { id: vote.id },
                -(vote.value as i64),
                -(vote.value as f64) * vote.weight,
                "retracted",
            ),
            (Some(vote), v) => {
                let weight = score::vote_weight(voter.trust_score, &self.weight);
                snapshot = Some(weight);
                (
                    VoteWrite::Update {
                        id: vote.id,
                        value: v,
                        weight,
                    },
                    (v - vote.value) as i64,
                    v as f64 * weight - vote.value as f64 * vote.weight,
                    "changed",
                )
            }
        };

        let (vote_score, weighted_score) = self
            .store
            .commit_vote(kind, target_id, write, score_delta, weighted_delta)
            .await?;

        // Author trust rides behind the committed vote; a failure here is
        // logged and swallowed, never unwinding the vote itself
        if let Some(weight) = snapshot {
            if let Some(event) = TrustEvent::from_vote(kind, value) {
                if let Err(e) = self.trust.apply_scaled(target.author, event, weight).await {
                    warn!(author = %target.author, error = %e, "vote trust side effect failed");
                }
            }
        }

        metrics::record_vote(kind.as_str(), outcome);
        metrics::observe_op_duration("cast_vote", started.elapsed().as_secs_f64());
        debug!(
            voter = %voter_id,
            target = %target_id,
            value,
            outcome,
            vote_score,
            weighted_score,
            "vote committed"
        );
        Ok(VoteReceipt {
            vote_score,
            weighted_score,
            viewer_vote: if value == 0 { None } else { Some(value) },
        })
    }

    /// The voter's current stance on a target, if any
    pub async fn viewer_vote(
        &self,
        voter_id: ActorId,
        kind: TargetKind,
        target_id: TargetId,
    ) -> Result<Option<i32>> {
        Ok(self
            .store
            .vote(voter_id, kind, target_id)
            .await?
            .map(|v| v.value))
    }
}
