//! Moderation lifecycle scenarios.
//!
//! Actions land with their side effects, reversals put back exactly what the
//! action took away, and the public log keeps the full history.

mod common;

use common::Harness;
use concord_engine::types::{ActorKind, ModAction, TargetKind};
use concord_engine::{EngineError, EngineStore};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_remove_then_restore_keeps_trust_penalty() {
    common::init_tracing();
    let h = Harness::new();

    let moderator = h.moderator("mod").await;
    let author = h.actor("poster", ActorKind::Human, 50.0).await;
    let post = h.post(&author).await;

    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Remove,
            "spam wave",
            None,
            None,
        )
        .await
        .unwrap();

    let hidden = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(hidden.is_removed);
    let docked = h.store.actor(author.id).await.unwrap().unwrap();
    assert_eq!(docked.trust_score, 45.0);

    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Restore,
            "appeal accepted",
            None,
            None,
        )
        .await
        .unwrap();

    let restored = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(!restored.is_removed);

    // Restoring content does not refund the penalty.
    let after = h.store.actor(author.id).await.unwrap().unwrap();
    assert_eq!(after.trust_score, 45.0);
}

#[tokio::test]
#[serial]
async fn test_mute_reversal_reactivates_exactly_once() {
    common::init_tracing();
    let h = Harness::new();

    let moderator = h.moderator("mod").await;
    let admin = h.moderator("admin").await;
    let author = h.actor("poster", ActorKind::Agent, 50.0).await;
    let post = h.post(&author).await;

    let action = h
        .moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Mute,
            "repeated spam",
            Some(24),
            None,
        )
        .await
        .unwrap();
    assert_eq!(action.duration_hours, Some(24));

    let muted = h.store.actor(author.id).await.unwrap().unwrap();
    assert!(!muted.is_active);
    assert_eq!(muted.trust_score, 30.0);

    let reversed = h.moderation.reverse(action.id, admin.id).await.unwrap();
    assert!(reversed.is_reversed);
    assert_eq!(reversed.reversed_by, Some(admin.id));
    assert!(reversed.reversed_at.is_some());

    // Reactivated, but the trust penalty stands.
    let back = h.store.actor(author.id).await.unwrap().unwrap();
    assert!(back.is_active);
    assert_eq!(back.trust_score, 30.0);

    let err = h.moderation.reverse(action.id, admin.id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyReversed(id) if id == action.id));
}

#[tokio::test]
#[serial]
async fn test_warn_touches_trust_only() {
    common::init_tracing();
    let h = Harness::new();

    let moderator = h.moderator("mod").await;
    let author = h.actor("poster", ActorKind::Human, 50.0).await;
    let post = h.post(&author).await;

    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Warn,
            "tone it down",
            None,
            None,
        )
        .await
        .unwrap();

    let warned = h.store.actor(author.id).await.unwrap().unwrap();
    assert_eq!(warned.trust_score, 40.0);
    assert!(warned.is_active);

    let target = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(!target.is_removed);
}

#[tokio::test]
#[serial]
async fn test_pin_lock_and_public_log() {
    common::init_tracing();
    let h = Harness::new();

    let moderator = h.moderator("mod").await;
    let author = h.actor("poster", ActorKind::Human, 50.0).await;
    let post = h.post(&author).await;

    let pin = h
        .moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Pin,
            "community announcement",
            None,
            None,
        )
        .await
        .unwrap();
    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Lock,
            "thread ran its course",
            None,
            None,
        )
        .await
        .unwrap();

    let target = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(target.is_pinned);
    assert!(target.is_locked);

    // The log reads newest first and filters by kind.
    let log = h.moderation.log(None, 10, 0).await.unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(h
        .moderation
        .log(Some(TargetKind::Comment), 10, 0)
        .await
        .unwrap()
        .is_empty());

    let history = h.moderation.history(TargetKind::Post, post.id).await.unwrap();
    assert_eq!(history.len(), 2);

    // Reversing the pin leaves the lock in place.
    h.moderation.reverse(pin.id, moderator.id).await.unwrap();
    let target = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(!target.is_pinned);
    assert!(target.is_locked);
}

#[tokio::test]
#[serial]
async fn test_ban_records_duration_and_deactivates() {
    common::init_tracing();
    let h = Harness::new();

    let moderator = h.moderator("mod").await;
    let author = h.actor("persistent-bot", ActorKind::Agent, 15.0).await;
    let post = h.post(&author).await;

    let action = h
        .moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Ban,
            "ban evasion",
            Some(168),
            None,
        )
        .await
        .unwrap();
    assert_eq!(action.action, ModAction::Ban);
    assert_eq!(action.duration_hours, Some(168));

    let banned = h.store.actor(author.id).await.unwrap().unwrap();
    assert!(!banned.is_active);
    // 15 - 20 clamps at the floor.
    assert_eq!(banned.trust_score, 0.0);
}
