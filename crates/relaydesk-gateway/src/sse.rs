// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events for GET /v1/conversations/{id}/watch.
//!
//! Event format:
//! ```text
//! event: snapshot
//! data: {"conversation_id":"...","status":"escalated","last_message":{...},"message_count":4}
//! ```
//! A storage failure emits one `error` event and ends the stream.

use std::convert::Infallible;

use axum::{
    Extension,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};

use relaydesk_agent::ConversationSnapshot;
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::OperatorIdentity;

use crate::error::ApiError;
use crate::server::AppState;

fn to_event(item: Result<ConversationSnapshot, RelaydeskError>) -> Event {
    match item {
        Ok(snapshot) => Event::default()
            .event("snapshot")
            .json_data(&snapshot)
            .unwrap_or_else(|e| error_event(&e.to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "conversation watch ended");
            error_event("watch failed")
        }
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(serde_json::json!({ "error": message }).to_string())
}

pub async fn watch_conversation(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let snapshots = state.conversations.watch(&operator, &id).await?;
    let events = snapshots.map(|item| Ok(to_event(item)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
