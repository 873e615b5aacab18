//! Rate limiter scenarios.
//!
//! Budgets bound each action class per subject, lapsed windows restore the
//! budget, and a dead counter store fails open rather than blocking writes.

mod common;

use async_trait::async_trait;
use common::Harness;
use concord_engine::types::{ActorKind, TargetKind};
use concord_engine::EngineStore;
use concord_ratelimit::{
    client_key, ActionClass, Budget, CounterStore, MemoryCounterStore, RateLimitConfig,
    RateLimitError, RateLimiter, Result as RateResult,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tracing_test::traced_test;

fn tight_config(class_limit: u32, window: Duration) -> RateLimitConfig {
    RateLimitConfig {
        post: Budget {
            limit: class_limit,
            window,
        },
        vote: Budget {
            limit: class_limit,
            window,
        },
        ..RateLimitConfig::default()
    }
}

#[tokio::test]
#[serial]
#[traced_test]
async fn test_budget_exhaustion_and_window_reset() {
    let store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(store, tight_config(5, Duration::from_millis(200)));

    let subject = client_key(Some("203.0.113.7"), None);
    for _ in 0..5 {
        assert!(limiter.check(ActionClass::Post, &subject).await);
    }
    assert!(!limiter.check(ActionClass::Post, &subject).await);

    // A full window of silence restores the budget.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(limiter.check(ActionClass::Post, &subject).await);
}

#[tokio::test]
#[serial]
#[traced_test]
async fn test_subjects_and_classes_are_isolated() {
    let store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(store, tight_config(2, Duration::from_secs(60)));

    let alice = client_key(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.1:443"));
    assert_eq!(alice, "203.0.113.7");
    let bob = client_key(None, Some("198.51.100.4:51234"));

    assert!(limiter.check(ActionClass::Post, &alice).await);
    assert!(limiter.check(ActionClass::Post, &alice).await);
    assert!(!limiter.check(ActionClass::Post, &alice).await);

    // Exhausting posts spends neither bob's budget nor alice's votes.
    assert!(limiter.check(ActionClass::Post, &bob).await);
    assert!(limiter.check(ActionClass::Vote, &alice).await);
}

struct DownStore;

#[async_trait]
impl CounterStore for DownStore {
    async fn current(&self, _key: &str) -> RateResult<Option<u32>> {
        Err(RateLimitError::Store("connection refused".to_string()))
    }

    async fn incr_expire(&self, _key: &str, _window: Duration) -> RateResult<u32> {
        Err(RateLimitError::Store("connection refused".to_string()))
    }
}

#[tokio::test]
#[serial]
#[traced_test]
async fn test_unreachable_store_fails_open_with_error_log() {
    let limiter = RateLimiter::new(Arc::new(DownStore), RateLimitConfig::default());

    // Every class admits while the store is down.
    for class in ActionClass::ALL {
        assert!(limiter.check(class, "actor:alice").await);
    }
    assert!(logs_contain("counter store unavailable, failing open"));
}

#[tokio::test]
#[serial]
#[traced_test]
async fn test_vote_budget_gates_ledger_calls() {
    let h = Harness::new();
    let store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(store, tight_config(3, Duration::from_secs(60)));

    let voter = h.actor("alice", ActorKind::Human, 30.0).await;
    let author = h.actor("prolific", ActorKind::Human, 20.0).await;
    let subject = format!("actor:{}", voter.id);

    // Five candidate posts, a budget of three votes.
    let mut landed = 0;
    for _ in 0..5 {
        let post = h.post(&author).await;
        if limiter.check(ActionClass::Vote, &subject).await {
            h.votes
                .cast_vote(voter.id, TargetKind::Post, post.id, 1)
                .await
                .unwrap();
            landed += 1;
        }
    }
    assert_eq!(landed, 3);

    // Trust moved once per admitted vote and not for the denials.
    let trail = h.store.audit_for_resource(author.id).await.unwrap();
    assert_eq!(trail.len(), 3);
}
