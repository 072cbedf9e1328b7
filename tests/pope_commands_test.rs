//! End-to-end pope queue scenarios through the dispatcher
//! Run with: cargo test --test pope_commands_test

mod common;

use std::sync::Arc;

use common::{FailingStore, Harness, ReadOnlyStore};
use pope_bot::application::messaging::DispatchOutcome;
use pope_bot::domain::entities::{InboundMessage, MessageContext};

const ADMIN: &str = "UADMIN";

fn dm(text: &str) -> InboundMessage {
    InboundMessage::direct(ADMIN, text).with_channel("DADMIN")
}

#[tokio::test]
async fn test_add_pope_by_name() {
    let h = Harness::with_roster(&["U1"]).await;

    let outcome = h.dispatcher.dispatch(dm("addPope @newuser")).await;

    assert_eq!(outcome, DispatchOutcome::Completed { command: "addPope".to_string() });
    assert_eq!(h.roster_ids().await, ["U1", "U9"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec!["Pope successfully added to end of queue."]
    );
    assert_eq!(h.notifier.messages_to("U9").len(), 1);
}

#[tokio::test]
async fn test_add_pope_by_mention() {
    let h = Harness::with_roster(&["U1"]).await;
    h.dispatcher.dispatch(dm("addPope <@U9>")).await;
    assert_eq!(h.roster_ids().await, ["U1", "U9"]);
}

#[tokio::test]
async fn test_add_unknown_user() {
    let h = Harness::with_roster(&["U1"]).await;

    let outcome = h.dispatcher.dispatch(dm("addPope ghost")).await;

    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert_eq!(h.roster_ids().await, ["U1"]);
    assert_eq!(h.notifier.messages_to(ADMIN), vec!["User not found - no user added."]);
}

#[tokio::test]
async fn test_add_existing_pope() {
    let h = Harness::with_roster(&["U1", "U2"]).await;

    h.dispatcher.dispatch(dm("addPope bob")).await;

    assert_eq!(h.roster_ids().await, ["U1", "U2"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec!["That user is already in the pope queue!"]
    );
    assert!(h.notifier.messages_to("U2").is_empty());
}

#[tokio::test]
async fn test_remove_current_pope() {
    let h = Harness::with_roster(&["U1", "U2", "U3"]).await;

    h.dispatcher.dispatch(dm("removePope ann")).await;

    assert_eq!(h.roster_ids().await, ["U2", "U3"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec!["Pope successfully removed from queue."]
    );
    assert_eq!(h.notifier.messages_to("U1").len(), 1);
    // The new current pope is not told
    assert!(h.notifier.messages_to("U2").is_empty());
}

#[tokio::test]
async fn test_remove_absent_pope() {
    let h = Harness::with_roster(&["U1"]).await;
    h.dispatcher.dispatch(dm("removePope cat")).await;
    assert_eq!(h.roster_ids().await, ["U1"]);
    assert_eq!(h.notifier.messages_to(ADMIN), vec!["That user is not in the pope queue!"]);
}

#[tokio::test]
async fn test_cycle_pope() {
    let h = Harness::with_roster(&["U1", "U2", "U3"]).await;

    h.dispatcher.dispatch(dm("cyclePope")).await;

    assert_eq!(h.roster_ids().await, ["U2", "U3", "U1"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec!["Popes cycled. ann has been replaced by bob as pope."]
    );
    assert_eq!(h.notifier.messages_to("U1"), vec!["You are no longer pope."]);
    let to_new = h.notifier.messages_to("U2");
    assert_eq!(to_new.len(), 1);
    assert!(to_new[0].starts_with("You are now pope."));
    assert!(h.notifier.channel_messages().is_empty());
}

#[tokio::test]
async fn test_defer_pope() {
    let h = Harness::with_roster(&["U1", "U2", "U3"]).await;

    h.dispatcher.dispatch(dm("deferPope")).await;

    assert_eq!(h.roster_ids().await, ["U2", "U1", "U3"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec!["ann will now be pope _next_. The current pope is now bob."]
    );
    assert_eq!(h.notifier.messages_to("U1"), vec!["You are no longer pope."]);
    assert!(h.notifier.messages_to("U3").is_empty());
}

#[tokio::test]
async fn test_rotation_with_one_pope() {
    let h = Harness::with_roster(&["U1"]).await;

    h.dispatcher.dispatch(dm("cyclePope")).await;
    h.dispatcher.dispatch(dm("deferPope")).await;

    assert_eq!(h.roster_ids().await, ["U1"]);
    assert_eq!(
        h.notifier.messages_to(ADMIN),
        vec![
            "There must be at least two popes to cycle to the next one!",
            "There must be at least two popes to defer the current one for a week!",
        ]
    );
    assert!(h.notifier.messages_to("U1").is_empty());
}

#[tokio::test]
async fn test_rotation_announcements() {
    let h = Harness::announcing(&["U1", "U2"]).await;
    h.dispatcher.dispatch(dm("cyclePope")).await;
    assert_eq!(
        h.notifier.channel_messages(),
        vec!["bob is now pope, taking over from ann."]
    );
}

#[tokio::test]
async fn test_list_shapes() {
    let cases: [(&[&str], &str); 4] = [
        (&[], "There are no popes registered! Use `addPope user-name` to add one."),
        (&["U1"], "The only registered pope is ann."),
        (&["U1", "U2"], "The current pope is ann.\nThe off-duty pope is bob"),
        (
            &["U1", "U2", "U3", "U4"],
            "The current pope is ann.\nThe upcoming popes, in order, are bob, cat, and dan",
        ),
    ];

    for (ids, expected) in cases {
        let h = Harness::with_roster(ids).await;
        h.dispatcher.dispatch(dm("list")).await;
        assert_eq!(h.notifier.messages_to(ADMIN), vec![expected]);
        assert_eq!(h.roster_ids().await, ids);
    }
}

#[tokio::test]
async fn test_help_describes_commands() {
    let h = Harness::with_roster(&[]).await;
    h.dispatcher.dispatch(dm("help")).await;

    let replies = h.notifier.messages_to(ADMIN);
    assert_eq!(replies.len(), 1);
    for usage in ["`list`", "`cyclePope`", "`deferPope`", "`addPope user-name`", "`removePope user-name`"] {
        assert!(replies[0].contains(usage), "help is missing {}", usage);
    }
}

#[tokio::test]
async fn test_unmatched_message_is_relayed_to_current_pope() {
    let h = Harness::with_roster(&["U2", "U1"]).await;

    let outcome = h.dispatcher.dispatch(dm("is the build broken?")).await;

    assert_eq!(outcome, DispatchOutcome::Completed { command: "relay".to_string() });
    assert_eq!(
        h.notifier.messages_to("U2"),
        vec!["admin (Private messaged me): is the build broken?"]
    );
}

#[tokio::test]
async fn test_mention_is_relayed_with_channel() {
    let h = Harness::with_roster(&["U2"]).await;

    let message = InboundMessage::new("U3", MessageContext::Mention, "deploy is stuck")
        .with_channel("CGENERAL");
    h.dispatcher.dispatch(message).await;

    assert_eq!(
        h.notifier.messages_to("U2"),
        vec!["cat (In channel `CGENERAL`): deploy is stuck"]
    );
}

#[tokio::test]
async fn test_relay_without_popes() {
    let h = Harness::with_roster(&[]).await;
    h.dispatcher.dispatch(dm("hello?")).await;
    assert_eq!(h.notifier.messages_to(ADMIN), vec!["There are no registered popes!"]);
}

#[tokio::test]
async fn test_channel_chatter_is_ignored() {
    let h = Harness::with_roster(&["U1"]).await;
    let message = InboundMessage::new("U3", MessageContext::ChannelMessage, "cyclePope")
        .with_channel("CGENERAL");

    assert_eq!(h.dispatcher.dispatch(message).await, DispatchOutcome::Ignored);
    assert_eq!(h.roster_ids().await, ["U1"]);
    assert!(h.notifier.private_messages().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_reported_generically() {
    let h = Harness::build(Arc::new(FailingStore), &[], false).await;

    let outcome = h.dispatcher.dispatch(dm("addPope bob")).await;

    let DispatchOutcome::Failed { message, .. } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert!(!message.contains("denied"));
    assert_eq!(h.notifier.messages_to(ADMIN), vec![message]);
}

#[tokio::test]
async fn test_failed_write_leaves_roster_untouched() {
    let store = ReadOnlyStore::seeded("popes", r#"{"popes":["U1","U2"]}"#).await;
    let h = Harness::build(Arc::new(store), &[], false).await;

    let outcome = h.dispatcher.dispatch(dm("cyclePope")).await;

    let DispatchOutcome::Failed { message, .. } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert!(!message.contains("disk full"));
    assert_eq!(h.notifier.messages_to(ADMIN), vec![message]);
    assert_eq!(h.roster_ids().await, ["U1", "U2"]);
    assert!(h.notifier.messages_to("U1").is_empty());
    assert!(h.notifier.messages_to("U2").is_empty());
}

#[tokio::test]
async fn test_lost_acknowledgement_does_not_fail_saved_rotation() {
    let h = Harness::with_roster(&["U1", "U2", "U3"]).await;
    h.notifier.fail_next_message_to(ADMIN);

    let outcome = h.dispatcher.dispatch(dm("cyclePope")).await;

    assert_eq!(outcome, DispatchOutcome::Completed { command: "cyclePope".to_string() });
    assert_eq!(h.roster_ids().await, ["U2", "U3", "U1"]);
    assert!(h.notifier.messages_to(ADMIN).is_empty());
    assert_eq!(h.notifier.messages_to("U1"), vec!["You are no longer pope."]);
    assert_eq!(h.notifier.messages_to("U2").len(), 1);
}

#[tokio::test]
async fn test_lost_acknowledgement_still_notifies_added_user() {
    let h = Harness::with_roster(&["U1"]).await;
    h.notifier.fail_next_message_to(ADMIN);

    let outcome = h.dispatcher.dispatch(dm("addPope newuser")).await;

    assert_eq!(outcome, DispatchOutcome::Completed { command: "addPope".to_string() });
    assert_eq!(h.roster_ids().await, ["U1", "U9"]);
    assert_eq!(h.notifier.messages_to("U9").len(), 1);
}

#[tokio::test]
async fn test_lone_sigil_is_a_missing_subject() {
    let h = Harness::with_roster(&["U1"]).await;

    h.dispatcher.dispatch(dm("addPope @ bob")).await;

    assert_eq!(h.roster_ids().await, ["U1"]);
    assert_eq!(h.notifier.messages_to(ADMIN), vec!["You must provide a user name!"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_not_lost() {
    let h = Harness::with_roster(&[]).await;

    let mut tasks = Vec::new();
    for i in 0..32 {
        let roster = h.roster.clone();
        tasks.push(tokio::spawn(async move { roster.add(&format!("U{}", 100 + i)).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let ids = h.roster_ids().await;
    assert_eq!(ids.len(), 32);
    for i in 0..32 {
        assert!(ids.contains(&format!("U{}", 100 + i)));
    }
}
