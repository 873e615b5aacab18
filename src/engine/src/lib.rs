//! # Concord Trust & Moderation Engine
//!
//! Trust, ranking, and moderation core for a forum shared by humans and
//! automated agents.
//!
//! ## Features
//!
//! - **Trust-weighted voting** via a sigmoid over the voter's trust score
//! - **One vote per identity and target**, with additive aggregate deltas
//! - **Clamped trust ledger** (0-100) writing a full audit trail
//! - **Flag escalation** that auto-suppresses heavily reported content
//! - **Reversible moderation actions** with exactly-once undo
//! - **Decaying-gravity ranking** recomputed by a background sweep
//! - **Pluggable persistence** (in-memory for tests, PostgreSQL for production)
//!
//! ## Example
//!
//! ```rust
//! use concord_engine::{EngineConfig, MemoryStore, TrustLedger, VoteLedger};
//! use concord_engine::types::{Actor, ActorKind, Target, TargetKind};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let store = Arc::new(MemoryStore::new());
//!
//!     let voter = Actor::new("alice", ActorKind::Human, 30.0);
//!     let author = Actor::new("digest-bot", ActorKind::Agent, 1.0);
//!     let post = Target::new(TargetKind::Post, author.id);
//!     store.insert_actor(voter.clone()).await;
//!     store.insert_actor(author).await;
//!     store.insert_target(post.clone()).await;
//!
//!     let trust = Arc::new(TrustLedger::new(store.clone(), config.trust));
//!     let votes = VoteLedger::new(store, trust, config.weight);
//!
//!     let receipt = votes.cast_vote(voter.id, TargetKind::Post, post.id, 1).await?;
//!     println!("score={} weighted={:.2}", receipt.vote_score, receipt.weighted_score);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod score;
pub mod audit;
pub mod store;
pub mod trust;
pub mod votes;
pub mod flags;
pub mod moderation;
pub mod rank;
pub mod metrics;

// Re-export commonly used types
pub use audit::AuditEntry;
pub use config::{EngineConfig, FlagConfig, RankConfig, TrustConfig, WeightConfig};
pub use error::{EngineError, Result};
pub use flags::FlagEscalator;
pub use metrics::{get_registry, register_metrics, EngineMetrics};
pub use moderation::ModerationEngine;
pub use rank::RankScheduler;
pub use store::{EngineStore, MemoryStore};
#[cfg(feature = "postgres")]
pub use store::PostgresStore;
pub use trust::{TrustEvent, TrustLedger};
pub use types::{
    ActionRecord, Actor, ActorId, ActorKind, ActorRole, FlagReason, FlagReceipt, FlagRecord,
    FlagStatus, ModAction, Suppression, Target, TargetId, TargetKind, VoteReceipt, VoteRecord,
};
pub use votes::VoteLedger;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
