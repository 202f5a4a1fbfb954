// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation records and their status transitions.

use chrono::{DateTime, Utc};
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::{
    Conversation, ConversationStatus, NewMessage, Page, PageRequest, TurnCommit,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use crate::cursor::Cursor;
use crate::database::{Database, TxError};
use crate::queries::messages;
use crate::rows::{self, CONVERSATION_COLUMNS, millis};

fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<Conversation>> {
    conn.query_row(
        &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
        params![id],
        rows::conversation,
    )
    .optional()
}

fn load_existing(conn: &Connection, id: &str) -> Result<Conversation, TxError> {
    load(conn, id)?.ok_or_else(|| RelaydeskError::not_found("conversation", id).into())
}

fn set_status(
    conn: &Connection,
    id: &str,
    status: ConversationStatus,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE conversations SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status.to_string(), millis(now)],
    )?;
    Ok(())
}

/// Insert a conversation and optionally its first message, atomically.
pub async fn create(
    db: &Database,
    conversation: &Conversation,
    first_message: Option<NewMessage>,
) -> Result<Conversation, RelaydeskError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| -> Result<Conversation, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO conversations
                 (id, tenant_id, contact_session_id, thread_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    conversation.id,
                    conversation.tenant_id,
                    conversation.contact_session_id,
                    conversation.thread_id,
                    conversation.status.to_string(),
                    millis(conversation.created_at),
                    millis(conversation.updated_at),
                ],
            )?;
            if let Some(message) = &first_message {
                messages::append(&tx, &conversation.thread_id, message)?;
            }
            let stored = load_existing(&tx, &conversation.id)?;
            tx.commit()?;
            Ok(stored)
        })
        .await
        .map_err(crate::database::map_tx_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<Conversation>, RelaydeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| load(conn, &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Newest first by `(created_at, id)`, optionally filtered by status.
pub async fn list(
    db: &Database,
    tenant_id: &str,
    status: Option<ConversationStatus>,
    page: &PageRequest,
) -> Result<Page<Conversation>, RelaydeskError> {
    let before = page.cursor.as_deref().map(Cursor::decode).transpose()?;
    let limit = page.effective_limit();
    let tenant_id = tenant_id.to_string();
    let status = status.map(|s| s.to_string());

    let mut items = db
        .connection()
        .call(move |conn| {
            let (before_ms, before_id) = before
                .map(|c| (c.created_ms, c.tiebreak))
                .unwrap_or((i64::MAX, String::new()));
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE tenant_id = ?1
                   AND (?2 IS NULL OR status = ?2)
                   AND (created_at < ?3 OR (created_at = ?3 AND (?4 = '' OR id < ?4)))
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?5"
            ))?;
            let rows = stmt.query_map(
                params![tenant_id, status, before_ms, before_id, (limit + 1) as i64],
                rows::conversation,
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let is_done = items.len() <= limit;
    items.truncate(limit);
    let next_cursor = items
        .last()
        .map(|c| Cursor::new(millis(c.created_at), c.id.clone()).encode());

    Ok(Page {
        items,
        next_cursor,
        is_done,
    })
}

/// Step `unresolved -> escalated -> resolved -> unresolved`.
pub async fn advance_status(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Conversation, RelaydeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Conversation, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let current = load_existing(&tx, &id)?;
            set_status(&tx, &id, current.status.next(), now)?;
            let updated = load_existing(&tx, &id)?;
            tx.commit()?;
            debug!(conversation_id = %id, from = %current.status, to = %updated.status, "status advanced");
            Ok(updated)
        })
        .await
        .map_err(crate::database::map_tx_err)
}

/// Append a turn's messages and apply its status effect in one transaction.
pub async fn commit_turn(db: &Database, turn: TurnCommit) -> Result<Conversation, RelaydeskError> {
    db.connection()
        .call(move |conn| -> Result<Conversation, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let current = load_existing(&tx, &turn.conversation_id)?;
            if current.status == ConversationStatus::Resolved {
                return Err(RelaydeskError::ConversationClosed {
                    conversation_id: turn.conversation_id,
                }
                .into());
            }

            for message in &turn.messages {
                messages::append(&tx, &current.thread_id, message)?;
            }

            let status = turn.status.apply(current.status);
            set_status(&tx, &current.id, status, turn.now)?;
            let updated = load_existing(&tx, &current.id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(crate::database::map_tx_err)
}
