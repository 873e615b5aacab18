//! Error types for the moderation engine

use crate::types::{FlagStatus, TargetKind};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Actor not found: {0}")]
    ActorNotFound(Uuid),

    #[error("{kind} not found: {id}")]
    TargetNotFound { kind: TargetKind, id: Uuid },

    #[error("Flag not found: {0}")]
    FlagNotFound(Uuid),

    #[error("Moderation action not found: {0}")]
    ActionNotFound(Uuid),

    #[error("Cannot vote on your own content")]
    SelfVote,

    #[error("Cannot flag your own content")]
    SelfFlag,

    #[error("Invalid vote value: {0} (must be -1, 0, or 1)")]
    InvalidVote(i32),

    #[error("Content already flagged by this reporter")]
    DuplicateFlag,

    #[error("Flag review cannot set status to {0}")]
    InvalidTransition(FlagStatus),

    #[error("Moderation action already reversed: {0}")]
    AlreadyReversed(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Prometheus metric error: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
