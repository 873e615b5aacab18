//! Persistence seam over the forum's relational tables
//!
//! Every multi-step sequence the engine relies on (vote plus aggregate
//! deltas, flag plus escalation, action plus its side effects) is a single
//! store operation, so atomicity lives here and not in the callers.

use crate::audit::AuditEntry;
use crate::config::FlagConfig;
use crate::error::{EngineError, Result};
use crate::types::{
    ActionRecord, Actor, ActorId, FlagRecord, FlagStatus, Suppression, Target, TargetId,
    TargetKind, VoteRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// How a cast lands on the votes table
#[derive(Debug, Clone)]
pub enum VoteWrite {
    /// First non-zero vote from this voter on this target
    Insert(VoteRecord),

    /// The voter switched sides; weight is re-snapshotted
    Update { id: Uuid, value: i32, weight: f64 },

    /// The voter retracted; the row is deleted
    Retract { id: Uuid },
}

/// Escalation thresholds evaluated inside the flag transaction
#[derive(Debug, Clone, Copy)]
pub struct EscalationPolicy {
    pub hide_threshold: i64,
    pub remove_threshold: i64,
}

impl From<&FlagConfig> for EscalationPolicy {
    fn from(config: &FlagConfig) -> Self {
        Self {
            hide_threshold: config.hide_threshold,
            remove_threshold: config.remove_threshold,
        }
    }
}

/// Moderation flag changes for a target row; `None` fields are untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetPatch {
    pub removed: Option<bool>,
    pub pinned: Option<bool>,
    pub locked: Option<bool>,
}

impl TargetPatch {
    pub fn apply(&self, target: &mut Target) {
        if let Some(removed) = self.removed {
            target.is_removed = removed;
        }
        if let Some(pinned) = self.pinned {
            target.is_pinned = pinned;
        }
        if let Some(locked) = self.locked {
            target.is_locked = locked;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_none() && self.pinned.is_none() && self.locked.is_none()
    }
}

/// Clamped trust change riding a moderation transaction
#[derive(Debug, Clone)]
pub struct TrustPatch {
    pub delta: f64,
    pub min: f64,
    pub max: f64,

    /// Label recorded in the trust_adjusted audit entry
    pub reason: String,
}

/// Author-side changes riding a moderation transaction
#[derive(Debug, Clone)]
pub struct AuthorPatch {
    pub author: ActorId,
    pub deactivate: bool,
    pub trust: Option<TrustPatch>,
}

/// Storage contract for the trust, ranking, and moderation engine
///
/// Compound writes take prebuilt audit entries and commit the whole change
/// in one transaction. Audit entries whose details depend on in-transaction
/// values (trust_adjusted, auto_hide/auto_remove) are built by the store
/// from the shared constructors.
#[async_trait]
pub trait EngineStore: Send + Sync {
    /// Get an actor by id
    async fn actor(&self, id: ActorId) -> Result<Option<Actor>>;

    /// Get a post or comment by id
    async fn target(&self, kind: TargetKind, id: TargetId) -> Result<Option<Target>>;

    /// Get one voter's vote on one target, if any
    async fn vote(
        &self,
        voter: ActorId,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Option<VoteRecord>>;

    /// Get a flag by id
    async fn flag(&self, id: Uuid) -> Result<Option<FlagRecord>>;

    /// Get one reporter's flag on one target, if any
    async fn flag_by_reporter(
        &self,
        reporter: ActorId,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Option<FlagRecord>>;

    /// Get a moderation action by id
    async fn action(&self, id: Uuid) -> Result<Option<ActionRecord>>;

    /// Apply a vote write plus the target's aggregate deltas in one
    /// transaction; returns the new `(vote_score, weighted_score)`
    async fn commit_vote(
        &self,
        kind: TargetKind,
        target: TargetId,
        write: VoteWrite,
        score_delta: i64,
        weighted_delta: f64,
    ) -> Result<(i64, f64)>;

    /// Clamped trust adjustment plus its trust_adjusted audit entry in one
    /// transaction; returns the new trust score
    async fn adjust_trust(
        &self,
        actor: ActorId,
        delta: f64,
        min: f64,
        max: f64,
        reason: &str,
    ) -> Result<f64>;

    /// Insert a flag, count pending flags on its target, and suppress the
    /// target when a threshold is reached, all in one transaction; returns
    /// the pending count and the suppression outcome
    async fn create_flag(
        &self,
        flag: FlagRecord,
        audit: AuditEntry,
        policy: EscalationPolicy,
    ) -> Result<(i64, Suppression)>;

    /// Stamp a flag's review outcome plus its audit entry in one
    /// transaction; returns the updated flag
    async fn review_flag(
        &self,
        id: Uuid,
        status: FlagStatus,
        reviewer: ActorId,
        reviewed_at: DateTime<Utc>,
        audit: AuditEntry,
    ) -> Result<FlagRecord>;

    /// Persist an action record with its target and author side effects
    /// plus the audit trail in one transaction
    async fn record_action(
        &self,
        record: ActionRecord,
        target_patch: TargetPatch,
        author_patch: Option<AuthorPatch>,
        audit: AuditEntry,
    ) -> Result<()>;

    /// Mark an action reversed and apply the inverse effects in one
    /// transaction; the reversed check and the write share the transaction
    /// so exactly one reverser wins
    async fn reverse_action(
        &self,
        id: Uuid,
        reverser: ActorId,
        reversed_at: DateTime<Utc>,
        target_patch: TargetPatch,
        reactivate_author: bool,
        audit: AuditEntry,
    ) -> Result<ActionRecord>;

    /// Overwrite a post's rank
    async fn set_rank(&self, id: TargetId, rank: f64) -> Result<()>;

    /// Non-removed posts created at or after the cutoff
    async fn active_posts(&self, cutoff: DateTime<Utc>) -> Result<Vec<Target>>;

    /// Flags in one review state, oldest first
    async fn flags_by_status(
        &self,
        status: FlagStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>>;

    /// One reporter's flags, newest first
    async fn flags_by_reporter(
        &self,
        reporter: ActorId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>>;

    /// Moderation actions, newest first, optionally filtered by target kind
    async fn actions(
        &self,
        kind: Option<TargetKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActionRecord>>;

    /// Every action ever taken against one target, newest first
    async fn actions_for_target(
        &self,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Vec<ActionRecord>>;

    /// Append a standalone audit entry
    async fn append_audit(&self, entry: AuditEntry) -> Result<()>;

    /// Audit entries whose resource id matches, oldest first
    async fn audit_for_resource(&self, resource: Uuid) -> Result<Vec<AuditEntry>>;
}

#[derive(Default)]
struct MemoryInner {
    actors: HashMap<ActorId, Actor>,
    targets: HashMap<(TargetKind, TargetId), Target>,
    votes: HashMap<(ActorId, TargetKind, TargetId), VoteRecord>,
    flags: HashMap<Uuid, FlagRecord>,
    actions: HashMap<Uuid, ActionRecord>,
    audit: Vec<AuditEntry>,
}

/// In-memory store implementation
///
/// All tables live behind one lock, so every compound operation is atomic
/// by construction. Backs unit tests and single-process deployments.
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner::default())),
        }
    }

    /// Seed an actor row
    pub async fn insert_actor(&self, actor: Actor) {
        let mut inner = self.inner.write().await;
        inner.actors.insert(actor.id, actor);
    }

    /// Seed a post or comment row
    pub async fn insert_target(&self, target: Target) {
        let mut inner = self.inner.write().await;
        inner.targets.insert((target.kind, target.id), target);
    }

    /// Full audit trail, oldest first
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        let inner = self.inner.read().await;
        inner.audit.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn actor(&self, id: ActorId) -> Result<Option<Actor>> {
        let inner = self.inner.read().await;
        Ok(inner.actors.get(&id).cloned())
    }

    async fn target(&self, kind: TargetKind, id: TargetId) -> Result<Option<Target>> {
        let inner = self.inner.read().await;
        Ok(inner.targets.get(&(kind, id)).cloned())
    }

    async fn vote(
        &self,
        voter: ActorId,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Option<VoteRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.votes.get(&(voter, kind, id)).cloned())
    }

    async fn flag(&self, id: Uuid) -> Result<Option<FlagRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.flags.get(&id).cloned())
    }

    async fn flag_by_reporter(
        &self,
        reporter: ActorId,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Option<FlagRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .flags
            .values()
            .find(|f| f.reporter == reporter && f.target_kind == kind && f.target_id == id)
            .cloned())
    }

    async fn action(&self, id: Uuid) -> Result<Option<ActionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.actions.get(&id).cloned())
    }

    async fn commit_vote(
        &self,
        kind: TargetKind,
        target: TargetId,
        write: VoteWrite,
        score_delta: i64,
        weighted_delta: f64,
    ) -> Result<(i64, f64)> {
        let mut inner = self.inner.write().await;
        if !inner.targets.contains_key(&(kind, target)) {
            return Err(EngineError::TargetNotFound { kind, id: target });
        }

        match write {
            VoteWrite::Insert(record) => {
                let key = (record.voter, record.target_kind, record.target_id);
                if inner.votes.contains_key(&key) {
                    // Mirrors the relational unique constraint on
                    // (voter, target_kind, target_id)
                    return Err(EngineError::Database(format!(
                        "duplicate vote by {} on {} {}",
                        record.voter, record.target_kind, record.target_id
                    )));
                }
                inner.votes.insert(key, record);
            }
            VoteWrite::Update { id, value, weight } => {
                if let Some(vote) = inner.votes.values_mut().find(|v| v.id == id) {
                    vote.value = value;
                    vote.weight = weight;
                }
            }
            VoteWrite::Retract { id } => {
                inner.votes.retain(|_, v| v.id != id);
            }
        }

        match inner.targets.get_mut(&(kind, target)) {
            Some(t) => {
                t.vote_score += score_delta;
                t.weighted_score += weighted_delta;
                Ok((t.vote_score, t.weighted_score))
            }
            None => Err(EngineError::TargetNotFound { kind, id: target }),
        }
    }

    async fn adjust_trust(
        &self,
        actor: ActorId,
        delta: f64,
        min: f64,
        max: f64,
        reason: &str,
    ) -> Result<f64> {
        let mut inner = self.inner.write().await;
        let row = inner
            .actors
            .get_mut(&actor)
            .ok_or(EngineError::ActorNotFound(actor))?;
        row.trust_score = (row.trust_score + delta).clamp(min, max);
        let new_score = row.trust_score;
        inner
            .audit
            .push(AuditEntry::trust_adjusted(actor, delta, reason, new_score));
        Ok(new_score)
    }

    async fn create_flag(
        &self,
        flag: FlagRecord,
        audit: AuditEntry,
        policy: EscalationPolicy,
    ) -> Result<(i64, Suppression)> {
        let mut inner = self.inner.write().await;
        let key = (flag.target_kind, flag.target_id);
        if !inner.targets.contains_key(&key) {
            return Err(EngineError::TargetNotFound {
                kind: flag.target_kind,
                id: flag.target_id,
            });
        }
        let duplicate = inner.flags.values().any(|f| {
            f.reporter == flag.reporter
                && f.target_kind == flag.target_kind
                && f.target_id == flag.target_id
        });
        if duplicate {
            return Err(EngineError::DuplicateFlag);
        }

        let reporter = flag.reporter;
        let (kind, target_id) = key;
        inner.flags.insert(flag.id, flag);
        inner.audit.push(audit);

        let pending = inner
            .flags
            .values()
            .filter(|f| {
                f.target_kind == kind && f.target_id == target_id && f.status == FlagStatus::Pending
            })
            .count() as i64;

        let mut suppression = Suppression::None;
        if let Some(target) = inner.targets.get_mut(&key) {
            if !target.is_removed && pending >= policy.hide_threshold {
                suppression = if pending >= policy.remove_threshold {
                    Suppression::Removed
                } else {
                    Suppression::Hidden
                };
                target.is_removed = true;
            }
        }
        if let Some(label) = suppression.label() {
            inner.audit.push(AuditEntry::suppression(
                reporter,
                kind,
                target_id,
                label,
                pending,
                policy.hide_threshold,
            ));
        }

        Ok((pending, suppression))
    }

    async fn review_flag(
        &self,
        id: Uuid,
        status: FlagStatus,
        reviewer: ActorId,
        reviewed_at: DateTime<Utc>,
        audit: AuditEntry,
    ) -> Result<FlagRecord> {
        let mut inner = self.inner.write().await;
        let flag = inner
            .flags
            .get_mut(&id)
            .ok_or(EngineError::FlagNotFound(id))?;
        flag.status = status;
        flag.reviewer = Some(reviewer);
        flag.reviewed_at = Some(reviewed_at);
        let updated = flag.clone();
        inner.audit.push(audit);
        Ok(updated)
    }

    async fn record_action(
        &self,
        record: ActionRecord,
        target_patch: TargetPatch,
        author_patch: Option<AuthorPatch>,
        audit: AuditEntry,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(target) = inner.targets.get_mut(&(record.target_kind, record.target_id)) {
            target_patch.apply(target);
        }

        let mut trust_audit = None;
        if let Some(patch) = &author_patch {
            if let Some(author) = inner.actors.get_mut(&patch.author) {
                if patch.deactivate {
                    author.is_active = false;
                }
                if let Some(trust) = &patch.trust {
                    author.trust_score =
                        (author.trust_score + trust.delta).clamp(trust.min, trust.max);
                    trust_audit = Some(AuditEntry::trust_adjusted(
                        patch.author,
                        trust.delta,
                        &trust.reason,
                        author.trust_score,
                    ));
                }
            }
        }

        inner.actions.insert(record.id, record);
        inner.audit.push(audit);
        if let Some(entry) = trust_audit {
            inner.audit.push(entry);
        }
        Ok(())
    }

    async fn reverse_action(
        &self,
        id: Uuid,
        reverser: ActorId,
        reversed_at: DateTime<Utc>,
        target_patch: TargetPatch,
        reactivate_author: bool,
        audit: AuditEntry,
    ) -> Result<ActionRecord> {
        let mut inner = self.inner.write().await;
        let action = inner
            .actions
            .get_mut(&id)
            .ok_or(EngineError::ActionNotFound(id))?;
        if action.is_reversed {
            return Err(EngineError::AlreadyReversed(id));
        }
        action.is_reversed = true;
        action.reversed_by = Some(reverser);
        action.reversed_at = Some(reversed_at);
        let updated = action.clone();
        let key = (updated.target_kind, updated.target_id);

        if let Some(target) = inner.targets.get_mut(&key) {
            target_patch.apply(target);
        }
        if reactivate_author {
            // The author is resolved through the target, which may be gone;
            // the reversal record still closes either way
            if let Some(author_id) = inner.targets.get(&key).map(|t| t.author) {
                if let Some(author) = inner.actors.get_mut(&author_id) {
                    author.is_active = true;
                }
            }
        }
        inner.audit.push(audit);
        Ok(updated)
    }

    async fn set_rank(&self, id: TargetId, rank: f64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(target) = inner.targets.get_mut(&(TargetKind::Post, id)) {
            target.rank = rank;
        }
        Ok(())
    }

    async fn active_posts(&self, cutoff: DateTime<Utc>) -> Result<Vec<Target>> {
        let inner = self.inner.read().await;
        Ok(inner
            .targets
            .values()
            .filter(|t| t.kind == TargetKind::Post && !t.is_removed && t.created_at >= cutoff)
            .cloned()
            .collect())
    }

    async fn flags_by_status(
        &self,
        status: FlagStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>> {
        let inner = self.inner.read().await;
        let mut flags: Vec<FlagRecord> = inner
            .flags
            .values()
            .filter(|f| f.status == status)
            .cloned()
            .collect();
        flags.sort_by_key(|f| f.created_at);
        Ok(flags
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn flags_by_reporter(
        &self,
        reporter: ActorId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlagRecord>> {
        let inner = self.inner.read().await;
        let mut flags: Vec<FlagRecord> = inner
            .flags
            .values()
            .filter(|f| f.reporter == reporter)
            .cloned()
            .collect();
        flags.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(flags
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn actions(
        &self,
        kind: Option<TargetKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActionRecord>> {
        let inner = self.inner.read().await;
        let mut actions: Vec<ActionRecord> = inner
            .actions
            .values()
            .filter(|a| kind.map_or(true, |k| a.target_kind == k))
            .cloned()
            .collect();
        actions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(actions
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn actions_for_target(
        &self,
        kind: TargetKind,
        id: TargetId,
    ) -> Result<Vec<ActionRecord>> {
        let inner = self.inner.read().await;
        let mut actions: Vec<ActionRecord> = inner
            .actions
            .values()
            .filter(|a| a.target_kind == kind && a.target_id == id)
            .cloned()
            .collect();
        actions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(actions)
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.audit.push(entry);
        Ok(())
    }

    async fn audit_for_resource(&self, resource: Uuid) -> Result<Vec<AuditEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .audit
            .iter()
            .filter(|e| e.resource_id == Some(resource))
            .cloned()
            .collect())
    }
}
