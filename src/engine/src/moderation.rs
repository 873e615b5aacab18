//! Moderation state machine
//!
//! Each action is one transition on a target's `{removed, pinned, locked}`
//! state or its author's `{active, trust}` state, recorded with an audit
//! entry in the same unit of work. Reversal undoes the one effect the
//! action applied, exactly once; trust deltas are never refunded.

use crate::audit::AuditEntry;
use crate::error::{EngineError, Result};
use crate::metrics;
use crate::store::{AuthorPatch, EngineStore, TargetPatch};
use crate::trust::{TrustEvent, TrustLedger};
use crate::types::{ActionRecord, ActorId, ModAction, TargetId, TargetKind};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

pub struct ModerationEngine {
    store: Arc<dyn EngineStore>,
    trust: Arc<TrustLedger>,
}

impl ModerationEngine {
    pub fn new(store: Arc<dyn EngineStore>, trust: Arc<TrustLedger>) -> Self {
        Self { store, trust }
    }

    /// Apply a moderation action to a target
    ///
    /// Pin, unpin, lock, and unlock only make sense on posts; on a comment
    /// they record the action without touching the target. Remove, warn,
    /// mute, and ban also dock the author's trust through the ledger's
    /// configured deltas. Role checks belong to the calling layer.
    pub async fn apply(
        &self,
        moderator_id: ActorId,
        kind: TargetKind,
        target_id: TargetId,
        action: ModAction,
        reason: impl Into<String>,
        duration_hours: Option<i32>,
        flag_id: Option<Uuid>,
    ) -> Result<ActionRecord> {
        let started = Instant::now();
        let target = self
            .store
            .target(kind, target_id)
            .await?
            .ok_or(EngineError::TargetNotFound { kind, id: target_id })?;
        let author = self.store.actor(target.author).await?;
        let author_handle = author.map(|a| a.handle);

        let post = kind == TargetKind::Post;
        let (target_patch, deactivate, trust_event) = match action {
            ModAction::Remove => (
                TargetPatch {
                    removed: Some(true),
                    ..TargetPatch::default()
                },
                false,
                Some(TrustEvent::FlagActioned),
            ),
            ModAction::Restore => (
                TargetPatch {
                    removed: Some(false),
                    ..TargetPatch::default()
                },
                false,
                None,
            ),
            ModAction::Warn => (TargetPatch::default(), false, Some(TrustEvent::Warned)),
            ModAction::Mute | ModAction::Ban => {
                (TargetPatch::default(), true, Some(TrustEvent::Muted))
            }
            ModAction::Pin => (
                TargetPatch {
                    pinned: post.then_some(true),
                    ..TargetPatch::default()
                },
                false,
                None,
            ),
            ModAction::Unpin => (
                TargetPatch {
                    pinned: post.then_some(false),
                    ..TargetPatch::default()
                },
                false,
                None,
            ),
            ModAction::Lock => (
                TargetPatch {
                    locked: post.then_some(true),
                    ..TargetPatch::default()
                },
                false,
                None,
            ),
            ModAction::Unlock => (
                TargetPatch {
                    locked: post.then_some(false),
                    ..TargetPatch::default()
                },
                false,
                None,
            ),
        };

        let trust_label = trust_event.map(|e| e.as_str());
        let trust_patch = trust_event.and_then(|e| self.trust.patch(e));
        let author_patch = if deactivate || trust_patch.is_some() {
            Some(AuthorPatch {
                author: target.author,
                deactivate,
                trust: trust_patch,
            })
        } else {
            None
        };

        let reason = reason.into();
        let record = ActionRecord::new(
            moderator_id,
            kind,
            target_id,
            action,
            reason.clone(),
            duration_hours,
            flag_id,
        );
        let audit = AuditEntry::mod_action(
            moderator_id,
            kind,
            target_id,
            action,
            &reason,
            author_handle.as_deref(),
        );
        self.store
            .record_action(record.clone(), target_patch, author_patch, audit)
            .await?;

        metrics::record_mod_action(action.as_str());
        metrics::observe_op_duration("apply_action", started.elapsed().as_secs_f64());
        if let Some(label) = trust_label {
            metrics::record_trust_adjustment(label);
        }
        info!(
            moderator = %moderator_id,
            target = %target_id,
            kind = %kind,
            action = %action,
            "moderation action applied"
        );
        Ok(record)
    }

    /// Undo the effect of a prior action, exactly once
    ///
    /// The authoritative already-reversed check runs inside the store
    /// transaction, so concurrent reversers cannot both win; the check here
    /// just short-circuits the obvious case. Trust deltas stay docked.
    pub async fn reverse(&self, action_id: Uuid, reverser_id: ActorId) -> Result<ActionRecord> {
        let started = Instant::now();
        let action = self
            .store
            .action(action_id)
            .await?
            .ok_or(EngineError::ActionNotFound(action_id))?;
        if action.is_reversed {
            return Err(EngineError::AlreadyReversed(action_id));
        }

        let post = action.target_kind == TargetKind::Post;
        let mut reactivate = false;
        let target_patch = match action.action {
            ModAction::Remove => TargetPatch {
                removed: Some(false),
                ..TargetPatch::default()
            },
            ModAction::Pin => TargetPatch {
                pinned: post.then_some(false),
                ..TargetPatch::default()
            },
            ModAction::Lock => TargetPatch {
                locked: post.then_some(false),
                ..TargetPatch::default()
            },
            ModAction::Mute | ModAction::Ban => {
                reactivate = true;
                TargetPatch::default()
            }
            // Restore, warn, unpin, unlock leave nothing to put back
            ModAction::Restore | ModAction::Warn | ModAction::Unpin | ModAction::Unlock => {
                TargetPatch::default()
            }
        };

        let audit = AuditEntry::mod_reversed(
            reverser_id,
            action.target_kind,
            action.target_id,
            action.action,
            action_id,
        );
        let reversed = self
            .store
            .reverse_action(action_id, reverser_id, Utc::now(), target_patch, reactivate, audit)
            .await?;

        metrics::record_reversal();
        metrics::observe_op_duration("reverse_action", started.elapsed().as_secs_f64());
        info!(
            reverser = %reverser_id,
            action_id = %action_id,
            action = %reversed.action,
            "moderation action reversed"
        );
        Ok(reversed)
    }

    /// Every action ever taken, newest first, optionally by target kind
    pub async fn log(
        &self,
        kind: Option<TargetKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActionRecord>> {
        self.store.actions(kind, limit, offset).await
    }

    /// Full action history for one target, newest first
    pub async fn history(&self, kind: TargetKind, id: TargetId) -> Result<Vec<ActionRecord>> {
        self.store.actions_for_target(kind, id).await
    }
}
