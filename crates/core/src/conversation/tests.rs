use std::num::NonZeroU32;
use std::time::Duration;

use palaver_model::{ErrorKind, Message, ModelProviderError, Role};
use palaver_test_model::{PresetReply, TestModelProvider};
use tokio::time::timeout;

use crate::ConversationBuilder;

#[tokio::test]
async fn test_echo_turn() {
    let mut conversation =
        ConversationBuilder::with_model_provider(TestModelProvider::echo())
            .build();
    assert!(conversation.is_empty());

    let reply = conversation.send_message("hi").await.unwrap();
    assert_eq!(reply, "echo:hi");
    assert_eq!(
        conversation.history(),
        vec![Message::user("hi"), Message::assistant("echo:hi")]
    );
}

#[tokio::test]
async fn test_transcript_alternates() {
    let mut conversation =
        ConversationBuilder::with_model_provider(TestModelProvider::echo())
            .build();

    for n in 1..=5 {
        conversation.send_message(&format!("turn {n}")).await.unwrap();
        assert_eq!(conversation.len(), 2 * n);
    }

    let history = conversation.history();
    for (idx, msg) in history.iter().enumerate() {
        let expected = if idx % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        assert_eq!(msg.role, expected, "entry {idx}");
    }
}

#[tokio::test]
async fn test_full_transcript_is_replayed() {
    let provider = TestModelProvider::echo();
    let observer = provider.clone();
    let max = NonZeroU32::new(1234).unwrap();
    let mut conversation = ConversationBuilder::with_model_provider(provider)
        .with_max_output_tokens(max)
        .build();
    assert_eq!(conversation.max_output_tokens(), max);

    conversation.send_message("one").await.unwrap();
    conversation.send_message("two").await.unwrap();

    let requests = observer.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages, vec![Message::user("one")]);
    assert_eq!(
        requests[1].messages,
        vec![
            Message::user("one"),
            Message::assistant("echo:one"),
            Message::user("two"),
        ]
    );
    assert!(requests.iter().all(|req| req.max_output_tokens == max));
}

#[tokio::test]
async fn test_failure_keeps_user_entry() {
    let mut provider = TestModelProvider::default();
    provider.add_reply(PresetReply::Fail(ErrorKind::Transport));
    let mut conversation =
        ConversationBuilder::with_model_provider(provider).build();

    let err = conversation.send_message("x").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.provider_error().kind(), ErrorKind::Transport);
    assert_eq!(conversation.history(), vec![Message::user("x")]);
}

#[tokio::test]
async fn test_retry_after_failure_duplicates_user_entry() {
    let mut provider = TestModelProvider::default();
    provider.add_reply(PresetReply::Fail(ErrorKind::Overloaded));
    provider.add_reply(PresetReply::text("finally"));
    let mut conversation =
        ConversationBuilder::with_model_provider(provider).build();

    conversation.send_message("x").await.unwrap_err();
    let reply = conversation.send_message("x").await.unwrap();
    assert_eq!(reply, "finally");
    assert_eq!(
        conversation.history(),
        vec![
            Message::user("x"),
            Message::user("x"),
            Message::assistant("finally"),
        ]
    );
}

#[tokio::test]
async fn test_clear_history() {
    let mut conversation =
        ConversationBuilder::with_model_provider(TestModelProvider::echo())
            .build();
    conversation.clear_history();
    assert!(conversation.history().is_empty());

    conversation.send_message("a").await.unwrap();
    conversation.send_message("b").await.unwrap();
    conversation.clear_history();
    assert!(conversation.history().is_empty());

    // The next turn starts from scratch.
    conversation.send_message("c").await.unwrap();
    assert_eq!(
        conversation.history(),
        vec![Message::user("c"), Message::assistant("echo:c")]
    );
}

#[tokio::test]
async fn test_history_is_a_copy() {
    let mut conversation =
        ConversationBuilder::with_model_provider(TestModelProvider::echo())
            .build();
    conversation.send_message("hi").await.unwrap();

    let mut copy = conversation.history();
    copy.clear();
    copy.push(Message::user("tampered"));

    assert_eq!(
        conversation.history(),
        vec![Message::user("hi"), Message::assistant("echo:hi")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_turn_keeps_user_entry() {
    let mut provider = TestModelProvider::default();
    provider.add_reply(PresetReply::Pending);
    let mut conversation =
        ConversationBuilder::with_model_provider(provider).build();

    let res = timeout(
        Duration::from_secs(30),
        conversation.send_message("hello?"),
    )
    .await;
    assert!(res.is_err());
    assert_eq!(conversation.history(), vec![Message::user("hello?")]);
}
