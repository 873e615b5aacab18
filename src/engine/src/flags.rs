//! Flag escalation
//!
//! Reports accumulate per target; when the pending count crosses a
//! threshold the target is suppressed once, inside the same transaction
//! that created the tipping flag, with a single audit entry whose label
//! reflects severity.

use crate::audit::AuditEntry;
use crate::config::FlagConfig;
use crate::error::{EngineError, Result};
use crate::metrics;
use crate::store::{EngineStore, EscalationPolicy};
use crate::types::{
    ActorId, FlagReason, FlagReceipt, FlagRecord, FlagStatus, TargetId, TargetKind,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct FlagEscalator {
    store: Arc<dyn EngineStore>,
    config: FlagConfig,
}

impl FlagEscalator {
    pub fn new(store: Arc<dyn EngineStore>, config: FlagConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FlagConfig {
        &self.config
    }

    /// File a report against a target
    ///
    /// One flag per (reporter, target). The pending count is evaluated in
    /// the same transaction; crossing the hide threshold removes the target
    /// and writes one `auto_hide` (or `auto_remove`) audit entry. An
    /// already-removed target is never suppressed twice.
    pub async fn create_flag(
        &self,
        reporter_id: ActorId,
        kind: TargetKind,
        target_id: TargetId,
        reason: FlagReason,
        details: Option<String>,
    ) -> Result<FlagReceipt> {
        let started = Instant::now();
        let target = self
            .store
            .target(kind, target_id)
            .await?
            .ok_or(EngineError::TargetNotFound { kind, id: target_id })?;
        if target.author == reporter_id {
            debug!(reporter = %reporter_id, target = %target_id, "self-flag rejected");
            return Err(EngineError::SelfFlag);
        }
        if self
            .store
            .flag_by_reporter(reporter_id, kind, target_id)
            .await?
            .is_some()
        {
            return Err(EngineError::DuplicateFlag);
        }

        let flag = FlagRecord::new(reporter_id, kind, target_id, reason, details);
        let audit = AuditEntry::flag_created(reporter_id, kind, target_id, reason.as_str());
        let (pending_count, suppression) = self
            .store
            .create_flag(flag.clone(), audit, EscalationPolicy::from(&self.config))
            .await?;

        metrics::record_flag(reason.as_str());
        metrics::observe_op_duration("create_flag", started.elapsed().as_secs_f64());
        if let Some(label) = suppression.label() {
            metrics::record_suppression(label);
            warn!(
                target = %target_id,
                kind = %kind,
                label,
                pending_count,
                "flag threshold reached, target suppressed"
            );
        } else {
            debug!(
                reporter = %reporter_id,
                target = %target_id,
                reason = reason.as_str(),
                pending_count,
                "flag created"
            );
        }

        Ok(FlagReceipt {
            flag,
            pending_count,
            suppression,
        })
    }

    /// Record a moderator's verdict on a flag
    ///
    /// `status` must be a settled state; pushing a flag back to pending is
    /// rejected. Re-reviewing an already-settled flag is allowed, so
    /// moderators can revisit.
    pub async fn review_flag(
        &self,
        flag_id: Uuid,
        reviewer_id: ActorId,
        status: FlagStatus,
    ) -> Result<FlagRecord> {
        if status == FlagStatus::Pending {
            return Err(EngineError::InvalidTransition(status));
        }
        let flag = self
            .store
            .flag(flag_id)
            .await?
            .ok_or(EngineError::FlagNotFound(flag_id))?;

        let audit = AuditEntry::flag_reviewed(
            reviewer_id,
            flag_id,
            status,
            flag.target_kind,
            flag.target_id,
        );
        let updated = self
            .store
            .review_flag(flag_id, status, reviewer_id, Utc::now(), audit)
            .await?;

        debug!(flag = %flag_id, reviewer = %reviewer_id, status = %status, "flag reviewed");
        Ok(updated)
    }

    /// Moderator review queue for one status, oldest first
    pub async fn queue(
        &self,
        status: FlagStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>> {
        self.store.flags_by_status(status, limit, offset).await
    }

    /// One reporter's filing history, newest first
    pub async fn submitted_by(
        &self,
        reporter_id: ActorId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>> {
        self.store.flags_by_reporter(reporter_id, limit, offset).await
    }
}
