// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pull-based conversation watching.
//!
//! Dashboards subscribe to a conversation and receive a snapshot whenever its
//! status, last message or message count changes. The stream polls storage at
//! a fixed interval and ends after the first error.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;

use relaydesk_core::types::{ConversationStatus, LastMessage};
use relaydesk_core::{RelaydeskError, StorageAdapter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub conversation_id: String,
    pub status: ConversationStatus,
    pub last_message: Option<LastMessage>,
    /// Visible messages only; tool messages are not counted.
    pub message_count: u64,
}

/// Reads the current snapshot of one conversation.
pub async fn snapshot(
    storage: &dyn StorageAdapter,
    conversation_id: &str,
) -> Result<ConversationSnapshot, RelaydeskError> {
    let conversation = storage
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| RelaydeskError::not_found("conversation", conversation_id))?;
    let message_count = storage
        .count_messages(&conversation.thread_id, true)
        .await?;
    Ok(ConversationSnapshot {
        conversation_id: conversation.id,
        status: conversation.status,
        last_message: conversation.last_message,
        message_count,
    })
}

struct WatchState {
    storage: Arc<dyn StorageAdapter>,
    conversation_id: String,
    interval: Duration,
    last: Option<ConversationSnapshot>,
    done: bool,
}

/// Yields the current snapshot immediately, then only changed ones.
pub fn snapshots(
    storage: Arc<dyn StorageAdapter>,
    conversation_id: String,
    interval: Duration,
) -> impl Stream<Item = Result<ConversationSnapshot, RelaydeskError>> + Send + 'static {
    let state = WatchState {
        storage,
        conversation_id,
        interval,
        last: None,
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            if state.last.is_some() {
                tokio::time::sleep(state.interval).await;
            }
            match snapshot(state.storage.as_ref(), &state.conversation_id).await {
                Ok(current) if state.last.as_ref() == Some(&current) => continue,
                Ok(current) => {
                    state.last = Some(current.clone());
                    return Some((Ok(current), state));
                }
                Err(e) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
            }
        }
    })
}
