//! Sweep behavior of the reconciliation loop.

mod common;

use std::sync::Arc;

use leettrack::domain::models::{Difficulty, TrackerConfig};
use leettrack::domain::ports::ProgressStore;
use leettrack::services::Reconciler;

use common::{setup_test_store, CollectingNotifier, GatedNotifier, ScriptedActivitySource};

fn fast_config() -> TrackerConfig {
    TrackerConfig {
        interval_secs: 300,
        lookback_limit: 30,
        user_pause_ms: 0,
    }
}

async fn registered_user(store: &Arc<dyn ProgressStore>, handle: &str, username: &str) -> i64 {
    let user = store.get_or_create_user(handle).await.unwrap();
    store.set_leetcode_username(handle, username).await.unwrap();
    user.id
}

#[tokio::test]
async fn sweep_completes_matching_task_and_notifies() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;
    store
        .add_assignment(user_id, "two-sum", Difficulty::Easy, "Array")
        .await
        .unwrap();

    let activity = Arc::new(ScriptedActivitySource::with_recent(
        "alice_lc",
        &["two-sum", "unrelated-problem"],
    ));
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(
        store.clone(),
        activity,
        notifier.clone(),
        fast_config(),
    );

    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.users_checked, 1);
    assert_eq!(report.tasks_completed, 1);
    assert_eq!(report.achievements_unlocked, 0);

    assert_eq!(store.total_completed(user_id).await.unwrap(), 1);
    assert!(store.list_pending(user_id).await.unwrap().is_empty());

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "alice");
    assert!(messages[0].1.contains("two-sum"));
}

#[tokio::test]
async fn second_sweep_with_no_new_activity_is_a_no_op() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;
    store
        .add_assignment(user_id, "coin-change", Difficulty::Medium, "Dynamic Programming")
        .await
        .unwrap();

    let activity = Arc::new(ScriptedActivitySource::with_recent(
        "alice_lc",
        &["coin-change"],
    ));
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(store.clone(), activity, notifier.clone(), fast_config());

    let first = reconciler.sweep().await.unwrap();
    assert_eq!(first.tasks_completed, 1);
    // Completing one Medium task satisfies the 1-Medium rule, exactly once.
    assert_eq!(first.achievements_unlocked, 1);

    let second = reconciler.sweep().await.unwrap();
    assert_eq!(second.users_checked, 0);
    assert_eq!(second.tasks_completed, 0);
    assert_eq!(second.achievements_unlocked, 0);

    // One completion notification plus one unlock notification, total.
    assert_eq!(notifier.messages().len(), 2);
    assert_eq!(store.total_completed(user_id).await.unwrap(), 1);
}

#[tokio::test]
async fn unmatched_slugs_cause_no_state_change() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;
    store
        .add_assignment(user_id, "two-sum", Difficulty::Easy, "Array")
        .await
        .unwrap();

    let activity = Arc::new(ScriptedActivitySource::with_recent(
        "alice_lc",
        &["totally-different-problem"],
    ));
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(store.clone(), activity, notifier.clone(), fast_config());

    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.tasks_completed, 0);
    assert_eq!(store.total_completed(user_id).await.unwrap(), 0);
    assert_eq!(store.list_pending(user_id).await.unwrap().len(), 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn one_failing_user_does_not_abort_the_sweep() {
    let (_pool, store) = setup_test_store().await;

    let alice_id = registered_user(&store, "alice", "alice_lc").await;
    store
        .add_assignment(alice_id, "two-sum", Difficulty::Easy, "Array")
        .await
        .unwrap();

    let bob_id = registered_user(&store, "bob", "bob_lc").await;
    store
        .add_assignment(bob_id, "three-sum", Difficulty::Medium, "Array")
        .await
        .unwrap();

    // Alice's upstream calls fail; Bob's succeed.
    let activity = ScriptedActivitySource::with_recent("bob_lc", &["three-sum"]).failing_for("alice_lc");
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(
        store.clone(),
        Arc::new(activity),
        notifier.clone(),
        fast_config(),
    );

    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.users_checked, 2);
    assert_eq!(report.users_failed, 1);
    assert_eq!(report.tasks_completed, 1);

    assert_eq!(store.total_completed(alice_id).await.unwrap(), 0);
    assert_eq!(store.total_completed(bob_id).await.unwrap(), 1);
    // Alice is still pending, so the next sweep retries her.
    let retry = store.list_users_with_pending_work().await.unwrap();
    assert!(retry.iter().any(|u| u.handle == "alice"));
}

#[tokio::test]
async fn achievement_unlocks_exactly_once_across_sweeps() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;

    let activity = Arc::new(ScriptedActivitySource::default());
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(
        store.clone(),
        activity.clone(),
        notifier.clone(),
        fast_config(),
    );

    // First Hard completion unlocks hard_1.
    store
        .add_assignment(user_id, "word-ladder", Difficulty::Hard, "Graph")
        .await
        .unwrap();
    activity.set_recent("alice_lc", &["word-ladder"]);
    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.achievements_unlocked, 1);

    // A second Hard completion satisfies the rule again but must not re-unlock.
    store
        .add_assignment(user_id, "sliding-window-maximum", Difficulty::Hard, "Heap")
        .await
        .unwrap();
    activity.set_recent("alice_lc", &["word-ladder", "sliding-window-maximum"]);
    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.tasks_completed, 1);
    assert_eq!(report.achievements_unlocked, 0);

    let unlock_messages: Vec<_> = notifier
        .messages()
        .into_iter()
        .filter(|(_, text)| text.contains("Achievement Unlocked"))
        .collect();
    assert_eq!(unlock_messages.len(), 1);
    assert!(unlock_messages[0].1.contains("Hard Hitter"));
}

#[tokio::test]
async fn duplicate_slug_marks_only_first_pending_task() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;

    let first = store
        .add_assignment(user_id, "two-sum", Difficulty::Easy, "Array")
        .await
        .unwrap();
    let second = store
        .add_assignment(user_id, "two-sum", Difficulty::Easy, "Array")
        .await
        .unwrap();

    let activity = Arc::new(ScriptedActivitySource::with_recent("alice_lc", &["two-sum"]));
    let notifier = Arc::new(CollectingNotifier::default());
    let reconciler = Reconciler::new(store.clone(), activity, notifier, fast_config());

    let report = reconciler.sweep().await.unwrap();
    assert_eq!(report.tasks_completed, 1);

    let pending = store.list_pending(user_id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
    let completed = store.list_completed(user_id).await.unwrap();
    assert_eq!(completed[0].id, first.id);
}

#[tokio::test]
async fn stop_during_delivery_still_finishes_the_completion_step() {
    let (_pool, store) = setup_test_store().await;
    let user_id = registered_user(&store, "alice", "alice_lc").await;
    store
        .add_assignment(user_id, "word-ladder", Difficulty::Hard, "Graph")
        .await
        .unwrap();

    let activity = Arc::new(ScriptedActivitySource::with_recent("alice_lc", &["word-ladder"]));
    let notifier = Arc::new(GatedNotifier::default());
    let reconciler = Reconciler::new(store.clone(), activity, notifier.clone(), fast_config());
    let handle = reconciler.handle();
    let join = tokio::spawn(reconciler.run());

    // Hold the loop inside the completion delivery, then request shutdown
    // while the task is already marked but its achievements are not yet
    // evaluated.
    notifier.delivery_started().await;
    handle.stop();
    // Completion message plus the hard_1 unlock message.
    notifier.release(2);

    tokio::time::timeout(std::time::Duration::from_secs(5), join)
        .await
        .expect("reconciler did not stop in time")
        .expect("reconciler task panicked");

    // The completion and its achievement evaluation land together even when
    // shutdown was requested mid-step.
    assert_eq!(store.total_completed(user_id).await.unwrap(), 1);
    let unlocked = store.list_achievements(user_id).await.unwrap();
    assert!(unlocked.iter().any(|a| a.rule_key == "hard_1"));
    assert!(notifier
        .messages()
        .iter()
        .any(|(_, text)| text.contains("Achievement Unlocked")));
}

#[tokio::test]
async fn running_reconciler_stops_via_handle() {
    let (_pool, store) = setup_test_store().await;
    let activity = Arc::new(ScriptedActivitySource::default());
    let notifier = Arc::new(CollectingNotifier::default());

    let reconciler = Reconciler::new(
        store,
        activity,
        notifier,
        TrackerConfig {
            interval_secs: 1,
            lookback_limit: 30,
            user_pause_ms: 0,
        },
    );
    let handle = reconciler.handle();
    let join = tokio::spawn(reconciler.run());

    handle.stop();
    tokio::time::timeout(std::time::Duration::from_secs(5), join)
        .await
        .expect("reconciler did not stop in time")
        .expect("reconciler task panicked");
    assert!(handle.is_stop_requested());
}
