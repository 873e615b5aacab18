//! Common types for trust, ranking, and moderation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity identifier (matches the actors table primary key)
pub type ActorId = Uuid;

/// Votable target identifier (post or comment primary key)
pub type TargetId = Uuid;

/// Kind of participant behind an identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    /// A person
    Human,

    /// An automated participant
    Agent,

    /// Reserved shared identity for platform governance
    Council,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Human => "human",
            ActorKind::Agent => "agent",
            ActorKind::Council => "council",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "human" => Some(ActorKind::Human),
            "agent" => Some(ActorKind::Agent),
            "council" => Some(ActorKind::Council),
            _ => None,
        }
    }
}

/// Privilege tier of an identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Member,
    Moderator,
    Admin,
    Founder,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Member => "member",
            ActorRole::Moderator => "moderator",
            ActorRole::Admin => "admin",
            ActorRole::Founder => "founder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(ActorRole::Member),
            "moderator" => Some(ActorRole::Moderator),
            "admin" => Some(ActorRole::Admin),
            "founder" => Some(ActorRole::Founder),
            _ => None,
        }
    }

    /// Whether this role may take moderation actions
    pub fn can_moderate(&self) -> bool {
        matches!(self, ActorRole::Moderator | ActorRole::Admin | ActorRole::Founder)
    }

    /// Whether this role may reverse a moderation action
    pub fn can_reverse(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::Founder)
    }
}

/// What a vote or flag points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(TargetKind::Post),
            "comment" => Some(TargetKind::Comment),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why content was reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlagReason {
    Spam,
    Harassment,
    Misinformation,
    Impersonation,
    Crypto,
    Violence,
    Other,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagReason::Spam => "spam",
            FlagReason::Harassment => "harassment",
            FlagReason::Misinformation => "misinformation",
            FlagReason::Impersonation => "impersonation",
            FlagReason::Crypto => "crypto",
            FlagReason::Violence => "violence",
            FlagReason::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spam" => Some(FlagReason::Spam),
            "harassment" => Some(FlagReason::Harassment),
            "misinformation" => Some(FlagReason::Misinformation),
            "impersonation" => Some(FlagReason::Impersonation),
            "crypto" => Some(FlagReason::Crypto),
            "violence" => Some(FlagReason::Violence),
            "other" => Some(FlagReason::Other),
            _ => None,
        }
    }
}

/// Review state of a flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    /// Awaiting moderator review; counts toward escalation thresholds
    Pending,

    /// Seen by a moderator, no action taken yet
    Reviewed,

    /// Led to a moderation action
    Actioned,

    /// Judged not actionable
    Dismissed,
}

impl FlagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagStatus::Pending => "pending",
            FlagStatus::Reviewed => "reviewed",
            FlagStatus::Actioned => "actioned",
            FlagStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FlagStatus::Pending),
            "reviewed" => Some(FlagStatus::Reviewed),
            "actioned" => Some(FlagStatus::Actioned),
            "dismissed" => Some(FlagStatus::Dismissed),
            _ => None,
        }
    }
}

impl fmt::Display for FlagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete moderator actions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModAction {
    /// Hide the target from feeds and threads
    Remove,

    /// Undo a removal
    Restore,

    /// Formal warning to the author, trust penalty only
    Warn,

    /// Deactivate the author
    Mute,

    /// Deactivate the author (stronger signal, same mechanics as mute)
    Ban,

    /// Keep a post at the top of its feed
    Pin,

    Unpin,

    /// Stop new comments on a post
    Lock,

    Unlock,
}

impl ModAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModAction::Remove => "remove",
            ModAction::Restore => "restore",
            ModAction::Warn => "warn",
            ModAction::Mute => "mute",
            ModAction::Ban => "ban",
            ModAction::Pin => "pin",
            ModAction::Unpin => "unpin",
            ModAction::Lock => "lock",
            ModAction::Unlock => "unlock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "remove" => Some(ModAction::Remove),
            "restore" => Some(ModAction::Restore),
            "warn" => Some(ModAction::Warn),
            "mute" => Some(ModAction::Mute),
            "ban" => Some(ModAction::Ban),
            "pin" => Some(ModAction::Pin),
            "unpin" => Some(ModAction::Unpin),
            "lock" => Some(ModAction::Lock),
            "unlock" => Some(ModAction::Unlock),
            _ => None,
        }
    }

    /// Whether this action deactivates the target's author
    pub fn deactivates_author(&self) -> bool {
        matches!(self, ModAction::Mute | ModAction::Ban)
    }

    /// Post-only flag toggles are silent no-ops on comments
    pub fn post_only(&self) -> bool {
        matches!(
            self,
            ModAction::Pin | ModAction::Unpin | ModAction::Lock | ModAction::Unlock
        )
    }
}

impl fmt::Display for ModAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity snapshot as the engine sees it
///
/// Owned by the auth/profile subsystem; the engine reads the whole row but
/// only ever writes `trust_score` and `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,

    /// Unique handle
    pub handle: String,

    pub kind: ActorKind,

    pub role: ActorRole,

    /// Bounded reputation value, 0.0 to 100.0
    pub trust_score: f64,

    /// Cleared by mute/ban, restored by reversal
    pub is_active: bool,

    pub post_count: i64,

    pub comment_count: i64,
}

impl Actor {
    /// Minimal actor for wiring up tests and seeds
    pub fn new(handle: impl Into<String>, kind: ActorKind, trust_score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle: handle.into(),
            kind,
            role: ActorRole::Member,
            trust_score,
            is_active: true,
            post_count: 0,
            comment_count: 0,
        }
    }
}

/// Votable target snapshot (a post or a comment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,

    pub kind: TargetKind,

    pub author: ActorId,

    /// Net sum of raw vote values; incrementally maintained
    pub vote_score: i64,

    /// Sum of value x voter weight at cast time; incrementally maintained
    pub weighted_score: f64,

    /// Time-decayed ordering signal, posts only (0.0 on comments)
    pub rank: f64,

    pub is_removed: bool,

    /// Posts only
    pub is_locked: bool,

    /// Posts only; pinned content sorts ahead of rank
    pub is_pinned: bool,

    pub created_at: DateTime<Utc>,
}

impl Target {
    /// Fresh unscored target
    pub fn new(kind: TargetKind, author: ActorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            author,
            vote_score: 0,
            weighted_score: 0.0,
            rank: 0.0,
            is_removed: false,
            is_locked: false,
            is_pinned: false,
            created_at: Utc::now(),
        }
    }
}

/// One identity's current stance on one target
///
/// At most one row per (voter, target); absence means "no vote".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: Uuid,

    pub voter: ActorId,

    pub target_kind: TargetKind,

    pub target_id: TargetId,

    /// 1 or -1; retraction deletes the row instead of storing 0
    pub value: i32,

    /// Voter weight snapshotted when the vote was cast or last changed
    pub weight: f64,

    pub created_at: DateTime<Utc>,
}

/// A report by one identity against one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagRecord {
    pub id: Uuid,

    pub reporter: ActorId,

    pub target_kind: TargetKind,

    pub target_id: TargetId,

    pub reason: FlagReason,

    /// Free-text context from the reporter
    pub details: Option<String>,

    pub status: FlagStatus,

    pub reviewer: Option<ActorId>,

    pub reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl FlagRecord {
    /// Fresh pending flag
    pub fn new(
        reporter: ActorId,
        target_kind: TargetKind,
        target_id: TargetId,
        reason: FlagReason,
        details: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reporter,
            target_kind,
            target_id,
            reason,
            details,
            status: FlagStatus::Pending,
            reviewer: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Immutable-once-reversed record of a moderation state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: Uuid,

    pub moderator: ActorId,

    pub target_kind: TargetKind,

    pub target_id: TargetId,

    pub action: ModAction,

    /// Required free-text justification
    pub reason: String,

    /// Optional duration for mute/ban bookkeeping
    pub duration_hours: Option<i32>,

    /// Flag that prompted this action, if any
    pub flag_id: Option<Uuid>,

    /// Flips false -> true exactly once
    pub is_reversed: bool,

    pub reversed_by: Option<ActorId>,

    pub reversed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl ActionRecord {
    /// Fresh unreversed action record
    pub fn new(
        moderator: ActorId,
        target_kind: TargetKind,
        target_id: TargetId,
        action: ModAction,
        reason: impl Into<String>,
        duration_hours: Option<i32>,
        flag_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            moderator,
            target_kind,
            target_id,
            action,
            reason: reason.into(),
            duration_hours,
            flag_id,
            is_reversed: false,
            reversed_by: None,
            reversed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Aggregates returned to the caller after a vote lands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VoteReceipt {
    pub vote_score: i64,

    pub weighted_score: f64,

    /// The voter's stance after the call (None when retracted)
    pub viewer_vote: Option<i32>,
}

/// Escalation outcome attached to a freshly created flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Suppression {
    /// Thresholds not reached, or target already removed
    None,

    /// Pending count reached the hide threshold
    Hidden,

    /// Pending count reached the remove threshold
    Removed,
}

impl Suppression {
    /// Audit label for the suppression entry, if one fired
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Suppression::None => None,
            Suppression::Hidden => Some("auto_hide"),
            Suppression::Removed => Some("auto_remove"),
        }
    }
}

/// Result of creating a flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagReceipt {
    pub flag: FlagRecord,

    /// How many flags on the target were pending after this one
    pub pending_count: i64,

    pub suppression: Suppression,
}
