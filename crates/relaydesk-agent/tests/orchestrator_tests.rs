// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visitor turns: eligibility, tool dispatch, handoff and failure handling.

use chrono::TimeDelta;
use relaydesk_agent::TurnDisposition;
use relaydesk_core::RelaydeskError;
use relaydesk_core::traits::generator::{ChatMessage, GenerationResponse};
use relaydesk_core::types::{ConversationStatus, MessageRole, PageRequest};
use relaydesk_core::StorageAdapter;
use relaydesk_test_utils::TestHarness;
use serde_json::json;

async fn feed(h: &TestHarness, thread_id: &str, exclude_tools: bool) -> Vec<(MessageRole, String)> {
    h.storage
        .list_messages(thread_id, &PageRequest::first(100), exclude_tools)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|m| (m.role, m.text))
        .collect()
}

#[tokio::test]
async fn inactive_subscription_queues_the_message_for_a_human() {
    let h = TestHarness::new().await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "hi")
        .await
        .unwrap();

    assert_eq!(outcome.disposition, TurnDisposition::Queued);
    assert_eq!(outcome.status, ConversationStatus::Unresolved);
    assert!(outcome.reply.is_none());
    assert_eq!(h.generator.call_count().await, 0);
    let messages = feed(&h, &conversation.thread_id, false).await;
    assert_eq!(messages.last().unwrap(), &(MessageRole::User, "hi".to_string()));
}

#[tokio::test]
async fn expired_subscription_is_not_eligible() {
    let h = TestHarness::new().await.unwrap();
    let subscription = h.activate_subscription("org_1").await.unwrap();
    h.clock
        .set(subscription.current_period_end + TimeDelta::milliseconds(1));
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "hello?")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::Queued);
}

#[tokio::test]
async fn plain_reply_hands_off_to_a_human_by_default() {
    let h = TestHarness::builder()
        .with_responses(vec![GenerationResponse::text("Our hours are 9 to 5.")])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "When are you open?")
        .await
        .unwrap();

    assert_eq!(outcome.disposition, TurnDisposition::Answered);
    assert_eq!(outcome.reply.as_deref(), Some("Our hours are 9 to 5."));
    assert_eq!(outcome.status, ConversationStatus::Escalated);

    let stored = h.conversation(&conversation.id).await.unwrap();
    let last = stored.last_message.unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.text, "Our hours are 9 to 5.");
}

#[tokio::test]
async fn handoff_can_be_disabled() {
    let h = TestHarness::builder()
        .with_config(|c| c.agent.handoff_after_reply = false)
        .with_responses(vec![GenerationResponse::text("Sure!")])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "Can you help?")
        .await
        .unwrap();
    assert_eq!(outcome.status, ConversationStatus::Unresolved);
}

#[tokio::test]
async fn resolve_tool_closes_the_conversation() {
    let h = TestHarness::builder()
        .with_responses(vec![
            GenerationResponse::tool_call("call_1", "resolve_conversation", json!({})),
            GenerationResponse::text("Glad I could help. Goodbye!"),
        ])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "That's all, thanks")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::Answered);
    assert_eq!(outcome.status, ConversationStatus::Resolved);

    let err = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "one more thing")
        .await
        .unwrap_err();
    assert!(matches!(err, RelaydeskError::ConversationClosed { .. }));
}

#[tokio::test]
async fn tool_messages_are_stored_but_hidden_from_feeds() {
    let h = TestHarness::builder()
        .with_responses(vec![
            GenerationResponse::tool_call(
                "call_1",
                "search_knowledge",
                json!({"query": "refund policy"}),
            ),
            GenerationResponse::text("Refunds take five days."),
        ])
        .build()
        .await
        .unwrap();
    h.knowledge
        .insert("org_1", "Refunds", "Refunds are processed within 5 days.")
        .await;
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    h.orchestrator
        .send_visitor_message(&session.id, &conversation.id, "How do refunds work?")
        .await
        .unwrap();

    assert_eq!(
        h.knowledge.searches().await,
        [("org_1".to_string(), "refund policy".to_string())]
    );

    let all = feed(&h, &conversation.thread_id, false).await;
    let roles: Vec<MessageRole> = all.iter().map(|(r, _)| *r).collect();
    assert_eq!(
        roles,
        [
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Tool,
            MessageRole::Assistant
        ]
    );
    assert!(all[2].1.contains("Refunds are processed within 5 days."));

    let visible = feed(&h, &conversation.thread_id, true).await;
    assert_eq!(visible.len(), 3);

    let second_request = &h.generator.requests().await[1];
    assert!(matches!(
        second_request.messages.last(),
        Some(ChatMessage::Tool { call_id, .. }) if call_id == "call_1"
    ));
}

#[tokio::test]
async fn tools_outside_the_allow_list_are_not_executed() {
    let h = TestHarness::builder()
        .with_responses(vec![
            GenerationResponse::tool_call("call_1", "delete_account", json!({})),
            GenerationResponse::text("I can't do that, sorry."),
        ])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "Delete my account")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::Answered);

    let all = feed(&h, &conversation.thread_id, false).await;
    let tool = all.iter().find(|(r, _)| *r == MessageRole::Tool).unwrap();
    assert!(tool.1.contains("unknown tool"));
}

#[tokio::test]
async fn generation_failure_keeps_the_prompt_and_applies_no_effects() {
    let h = TestHarness::builder()
        .with_responses(vec![GenerationResponse::tool_call(
            "call_1",
            "escalate_conversation",
            json!({}),
        )])
        .build()
        .await
        .unwrap();
    h.generator.push_failure("upstream timeout").await;
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "Is anyone there?")
        .await
        .unwrap();

    assert_eq!(outcome.disposition, TurnDisposition::GenerationFailed);
    assert_eq!(outcome.status, ConversationStatus::Unresolved);
    let all = feed(&h, &conversation.thread_id, false).await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[1], (MessageRole::User, "Is anyone there?".to_string()));
}

#[tokio::test]
async fn exhausting_tool_rounds_is_a_generation_failure() {
    let h = TestHarness::builder()
        .with_config(|c| c.agent.max_tool_rounds = 1)
        .with_responses(vec![
            GenerationResponse::tool_call("c1", "search_knowledge", json!({"query": "a"})),
            GenerationResponse::tool_call("c2", "search_knowledge", json!({"query": "b"})),
        ])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "hmm")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::GenerationFailed);
    assert_eq!(h.generator.call_count().await, 2);
    let all = feed(&h, &conversation.thread_id, false).await;
    assert!(all.iter().all(|(r, _)| *r != MessageRole::Tool));
}

#[tokio::test]
async fn missing_generator_degrades_to_generation_failed() {
    let h = TestHarness::builder().without_generator().build().await.unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "hi")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::GenerationFailed);
}

#[tokio::test]
async fn escalated_conversation_is_queued_without_generation() {
    let h = TestHarness::new().await.unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();
    h.conversations
        .advance_status(&h.operator("org_1"), &conversation.id)
        .await
        .unwrap();

    let outcome = h
        .orchestrator
        .send_visitor_message(&session.id, &conversation.id, "still waiting")
        .await
        .unwrap();
    assert_eq!(outcome.disposition, TurnDisposition::Queued);
    assert_eq!(outcome.status, ConversationStatus::Escalated);
    assert_eq!(h.generator.call_count().await, 0);
}

#[tokio::test]
async fn history_is_sent_to_the_generator() {
    let h = TestHarness::builder()
        .with_config(|c| c.agent.handoff_after_reply = false)
        .with_responses(vec![
            GenerationResponse::text("first answer"),
            GenerationResponse::text("second answer"),
        ])
        .build()
        .await
        .unwrap();
    h.activate_subscription("org_1").await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    for prompt in ["question one", "question two"] {
        h.clock.advance(TimeDelta::seconds(1));
        h.orchestrator
            .send_visitor_message(&session.id, &conversation.id, prompt)
            .await
            .unwrap();
    }

    let requests = h.generator.requests().await;
    assert_eq!(
        requests[1].messages,
        [
            ChatMessage::assistant(h.config.widget.default_greeting.clone()),
            ChatMessage::user("question one"),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("question two"),
        ]
    );
    assert_eq!(requests[1].tools.len(), 3);
    assert!(requests[1].system.contains("Support Agent"));
}

#[tokio::test]
async fn visitor_message_refreshes_the_session() {
    let h = TestHarness::new().await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();

    h.clock.advance(TimeDelta::hours(23));
    h.orchestrator
        .send_visitor_message(&session.id, &conversation.id, "still here")
        .await
        .unwrap();

    h.clock.advance(TimeDelta::hours(23));
    assert!(h.sessions.validate(&session.id).await.is_ok());
}

#[tokio::test]
async fn expired_session_cannot_send() {
    let h = TestHarness::new().await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();
    h.clock.advance(TimeDelta::days(2));

    assert!(matches!(
        h.orchestrator
            .send_visitor_message(&session.id, &conversation.id, "hello")
            .await,
        Err(RelaydeskError::Expired { .. })
    ));
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let (session, conversation) = h.start_conversation("org_1").await.unwrap();
    assert!(matches!(
        h.orchestrator
            .send_visitor_message(&session.id, &conversation.id, "   ")
            .await,
        Err(RelaydeskError::Validation(_))
    ));
}
