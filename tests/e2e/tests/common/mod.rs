//! Shared harness for scenario tests

// Each scenario binary compiles its own view of this module
#![allow(dead_code)]

use concord_engine::config::EngineConfig;
use concord_engine::store::MemoryStore;
use concord_engine::types::{Actor, ActorKind, ActorRole, Target, TargetKind};
use concord_engine::{FlagEscalator, ModerationEngine, RankScheduler, TrustLedger, VoteLedger};
use std::sync::Arc;

/// Every engine component wired over one shared in-memory store
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub trust: Arc<TrustLedger>,
    pub votes: VoteLedger,
    pub flags: FlagEscalator,
    pub moderation: ModerationEngine,
    pub rank: RankScheduler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let trust = Arc::new(TrustLedger::new(store.clone(), config.trust.clone()));
        let votes = VoteLedger::new(store.clone(), trust.clone(), config.weight.clone());
        let flags = FlagEscalator::new(store.clone(), config.flags.clone());
        let moderation = ModerationEngine::new(store.clone(), trust.clone());
        let rank = RankScheduler::new(store.clone(), config.rank.clone());
        Self {
            store,
            trust,
            votes,
            flags,
            moderation,
            rank,
        }
    }

    pub async fn actor(&self, handle: &str, kind: ActorKind, trust: f64) -> Actor {
        let actor = Actor::new(handle, kind, trust);
        self.store.insert_actor(actor.clone()).await;
        actor
    }

    pub async fn moderator(&self, handle: &str) -> Actor {
        let mut actor = Actor::new(handle, ActorKind::Human, 80.0);
        actor.role = ActorRole::Moderator;
        self.store.insert_actor(actor.clone()).await;
        actor
    }

    pub async fn post(&self, author: &Actor) -> Target {
        let target = Target::new(TargetKind::Post, author.id);
        self.store.insert_target(target.clone()).await;
        target
    }

    pub async fn comment(&self, author: &Actor) -> Target {
        let target = Target::new(TargetKind::Comment, author.id);
        self.store.insert_target(target.clone()).await;
        target
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
