//! Append-only audit trail entries
//!
//! Every trust-affecting or suppression-affecting operation writes one of
//! these alongside its own rows, inside the same transaction. This module
//! owns the label scheme; nothing else builds audit rows by hand.
//!
//! Labels in use: `flag_created`, `auto_hide`, `auto_remove`,
//! `flag_{status}`, `mod_{action}`, `mod_{action}_reversed`,
//! `trust_adjusted`.

use crate::types::{ActorId, FlagStatus, ModAction, TargetId, TargetKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// One append-only audit row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,

    /// Who caused the entry; None for system-originated rows
    pub actor: Option<ActorId>,

    /// Action label, e.g. "mod_remove" or "auto_hide"
    pub action: String,

    /// What the entry refers to: "post", "comment", "flag", "actor"
    pub resource_kind: String,

    pub resource_id: Option<Uuid>,

    /// Structured context, shape depends on the label
    pub details: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    fn new(
        actor: Option<ActorId>,
        action: String,
        resource_kind: &str,
        resource_id: Option<Uuid>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor,
            action,
            resource_kind: resource_kind.to_string(),
            resource_id,
            details,
            created_at: Utc::now(),
        }
    }

    /// A reporter filed a new flag
    pub fn flag_created(
        reporter: ActorId,
        kind: TargetKind,
        target: TargetId,
        reason: &str,
    ) -> Self {
        Self::new(
            Some(reporter),
            "flag_created".to_string(),
            kind.as_str(),
            Some(target),
            json!({ "reason": reason }),
        )
    }

    /// Pending flags crossed a threshold and the target was suppressed
    pub fn suppression(
        reporter: ActorId,
        kind: TargetKind,
        target: TargetId,
        label: &str,
        flag_count: i64,
        hide_threshold: i64,
    ) -> Self {
        Self::new(
            Some(reporter),
            label.to_string(),
            kind.as_str(),
            Some(target),
            json!({
                "reason": format!("Flag count ({}) reached threshold", flag_count),
                "flag_count": flag_count,
                "threshold": hide_threshold,
            }),
        )
    }

    /// A moderator moved a flag out of (or back through) review
    pub fn flag_reviewed(
        reviewer: ActorId,
        flag_id: Uuid,
        status: FlagStatus,
        kind: TargetKind,
        target: TargetId,
    ) -> Self {
        Self::new(
            Some(reviewer),
            format!("flag_{}", status.as_str()),
            "flag",
            Some(flag_id),
            json!({
                "target_type": kind.as_str(),
                "target_id": target.to_string(),
            }),
        )
    }

    /// A moderation action was taken
    pub fn mod_action(
        moderator: ActorId,
        kind: TargetKind,
        target: TargetId,
        action: ModAction,
        reason: &str,
        target_author: Option<&str>,
    ) -> Self {
        Self::new(
            Some(moderator),
            format!("mod_{}", action.as_str()),
            kind.as_str(),
            Some(target),
            json!({
                "reason": reason,
                "target_author": target_author,
            }),
        )
    }

    /// A moderation action was reversed
    pub fn mod_reversed(
        reverser: ActorId,
        kind: TargetKind,
        target: TargetId,
        action: ModAction,
        original_action_id: Uuid,
    ) -> Self {
        Self::new(
            Some(reverser),
            format!("mod_{}_reversed", action.as_str()),
            kind.as_str(),
            Some(target),
            json!({ "original_action_id": original_action_id.to_string() }),
        )
    }

    /// An identity's trust score moved through the ledger
    pub fn trust_adjusted(subject: ActorId, delta: f64, reason: &str, new_score: f64) -> Self {
        Self::new(
            Some(subject),
            "trust_adjusted".to_string(),
            "actor",
            Some(subject),
            json!({
                "delta": delta,
                "reason": reason,
                "trust_score": new_score,
            }),
        )
    }
}
