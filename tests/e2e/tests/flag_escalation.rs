//! Flag escalation scenarios.
//!
//! Crowd reports pile onto a target, thresholds suppress it, a moderator
//! restores it, and the review queue closes the loop.

mod common;

use common::Harness;
use concord_engine::types::{ActorKind, FlagReason, FlagStatus, ModAction, Suppression, TargetKind};
use concord_engine::EngineStore;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_fifth_pending_flag_hides_then_moderator_restores() {
    common::init_tracing();
    let h = Harness::new();

    let author = h.actor("poster", ActorKind::Human, 20.0).await;
    let post = h.post(&author).await;

    for i in 0..4 {
        let reporter = h
            .actor(&format!("reporter-{i}"), ActorKind::Human, 10.0)
            .await;
        let receipt = h
            .flags
            .create_flag(reporter.id, TargetKind::Post, post.id, FlagReason::Spam, None)
            .await
            .unwrap();
        assert!(matches!(receipt.suppression, Suppression::None));
    }

    let last = h.actor("reporter-4", ActorKind::Human, 10.0).await;
    let receipt = h
        .flags
        .create_flag(last.id, TargetKind::Post, post.id, FlagReason::Spam, None)
        .await
        .unwrap();
    assert_eq!(receipt.pending_count, 5);
    assert!(matches!(receipt.suppression, Suppression::Hidden));

    let hidden = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(hidden.is_removed);

    // A moderator reviews the pile-on and puts the post back.
    let moderator = h.moderator("mod").await;
    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Restore,
            "false positive",
            None,
            None,
        )
        .await
        .unwrap();

    let restored = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(!restored.is_removed);

    let trail = h.store.audit_for_resource(post.id).await.unwrap();
    assert_eq!(trail.iter().filter(|e| e.action == "auto_hide").count(), 1);
    assert_eq!(trail.iter().filter(|e| e.action == "mod_restore").count(), 1);
}

#[tokio::test]
#[serial]
async fn test_reports_on_hidden_target_do_not_refire() {
    common::init_tracing();
    let h = Harness::new();

    let author = h.actor("poster", ActorKind::Human, 20.0).await;
    let post = h.post(&author).await;

    let mut suppressions = Vec::new();
    for i in 0..6 {
        let reporter = h
            .actor(&format!("reporter-{i}"), ActorKind::Agent, 5.0)
            .await;
        let receipt = h
            .flags
            .create_flag(reporter.id, TargetKind::Post, post.id, FlagReason::Spam, None)
            .await
            .unwrap();
        suppressions.push(receipt.suppression);
    }

    assert!(matches!(suppressions[4], Suppression::Hidden));
    assert!(matches!(suppressions[5], Suppression::None));

    let trail = h.store.audit_for_resource(post.id).await.unwrap();
    assert_eq!(trail.iter().filter(|e| e.action == "auto_hide").count(), 1);
}

#[tokio::test]
#[serial]
async fn test_persistent_brigade_escalates_to_auto_remove() {
    common::init_tracing();
    let h = Harness::new();

    let author = h.actor("poster", ActorKind::Human, 20.0).await;
    let post = h.post(&author).await;

    // Nine reports: the fifth hides the post, the rest land while hidden.
    for i in 0..9 {
        let reporter = h
            .actor(&format!("reporter-{i}"), ActorKind::Agent, 5.0)
            .await;
        h.flags
            .create_flag(
                reporter.id,
                TargetKind::Post,
                post.id,
                FlagReason::Harassment,
                None,
            )
            .await
            .unwrap();
    }

    let moderator = h.moderator("mod").await;
    h.moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Restore,
            "giving it another look",
            None,
            None,
        )
        .await
        .unwrap();

    // The tenth report crosses the removal threshold on the restored post.
    let last = h.actor("reporter-9", ActorKind::Agent, 5.0).await;
    let receipt = h
        .flags
        .create_flag(
            last.id,
            TargetKind::Post,
            post.id,
            FlagReason::Harassment,
            None,
        )
        .await
        .unwrap();
    assert_eq!(receipt.pending_count, 10);
    assert!(matches!(receipt.suppression, Suppression::Removed));

    let target = h.store.target(TargetKind::Post, post.id).await.unwrap().unwrap();
    assert!(target.is_removed);

    let trail = h.store.audit_for_resource(post.id).await.unwrap();
    assert_eq!(trail.iter().filter(|e| e.action == "auto_hide").count(), 1);
    assert_eq!(trail.iter().filter(|e| e.action == "auto_remove").count(), 1);
}

#[tokio::test]
#[serial]
async fn test_actioned_review_closes_the_loop() {
    common::init_tracing();
    let h = Harness::new();

    let author = h.actor("poster", ActorKind::Human, 50.0).await;
    let post = h.post(&author).await;
    let reporter = h.actor("watchful", ActorKind::Human, 35.0).await;
    let moderator = h.moderator("mod").await;

    let receipt = h
        .flags
        .create_flag(
            reporter.id,
            TargetKind::Post,
            post.id,
            FlagReason::Misinformation,
            Some("links to a known hoax".to_string()),
        )
        .await
        .unwrap();

    let action = h
        .moderation
        .apply(
            moderator.id,
            TargetKind::Post,
            post.id,
            ModAction::Remove,
            "confirmed hoax",
            None,
            Some(receipt.flag.id),
        )
        .await
        .unwrap();
    assert_eq!(action.flag_id, Some(receipt.flag.id));

    let reviewed = h
        .flags
        .review_flag(receipt.flag.id, moderator.id, FlagStatus::Actioned)
        .await
        .unwrap();
    assert_eq!(reviewed.status, FlagStatus::Actioned);
    assert_eq!(reviewed.reviewer, Some(moderator.id));
    assert!(reviewed.reviewed_at.is_some());

    // Pending queue is clear; the actioned queue holds the closed report.
    assert!(h
        .flags
        .queue(FlagStatus::Pending, 10, 0)
        .await
        .unwrap()
        .is_empty());
    let actioned = h.flags.queue(FlagStatus::Actioned, 10, 0).await.unwrap();
    assert_eq!(actioned.len(), 1);
    assert_eq!(actioned[0].id, receipt.flag.id);
}

#[tokio::test]
#[serial]
async fn test_review_queues_track_flag_status() {
    common::init_tracing();
    let h = Harness::new();

    let reporter = h.actor("watchful", ActorKind::Human, 35.0).await;
    let moderator = h.moderator("mod").await;

    let mut flag_ids = Vec::new();
    for i in 0..3 {
        let author = h.actor(&format!("poster-{i}"), ActorKind::Human, 20.0).await;
        let post = h.post(&author).await;
        let receipt = h
            .flags
            .create_flag(reporter.id, TargetKind::Post, post.id, FlagReason::Other, None)
            .await
            .unwrap();
        flag_ids.push(receipt.flag.id);
    }

    h.flags
        .review_flag(flag_ids[0], moderator.id, FlagStatus::Dismissed)
        .await
        .unwrap();

    assert_eq!(h.flags.queue(FlagStatus::Pending, 10, 0).await.unwrap().len(), 2);
    let dismissed = h.flags.queue(FlagStatus::Dismissed, 10, 0).await.unwrap();
    assert_eq!(dismissed.len(), 1);
    assert_eq!(dismissed[0].id, flag_ids[0]);

    // The reporter's history covers all three filings, newest first.
    let history = h.flags.submitted_by(reporter.id, 10, 0).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}
