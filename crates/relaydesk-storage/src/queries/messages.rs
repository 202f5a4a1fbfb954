// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message ledger.
//!
//! Messages are ordered by `(created_at, seq)`; `seq` is the SQLite
//! AUTOINCREMENT rowid and therefore the insertion sequence.

use relaydesk_core::RelaydeskError;
use relaydesk_core::types::{Message, MessageRole, NewMessage, Page, PageRequest};
use rusqlite::{Connection, params};

use crate::cursor::Cursor;
use crate::database::Database;
use crate::rows::{self, MESSAGE_COLUMNS, millis};

/// Append one message inside the caller's transaction and refresh the
/// owning conversation's last-message cache for user/assistant messages.
pub(crate) fn append(
    conn: &Connection,
    thread_id: &str,
    message: &NewMessage,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO messages (id, thread_id, role, text, author_name, tool_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            message.id,
            thread_id,
            message.role.to_string(),
            message.text,
            message.author_name,
            message.tool_name,
            millis(message.created_at),
        ],
    )?;
    let seq = conn.last_insert_rowid();

    if message.role != MessageRole::Tool {
        conn.execute(
            "UPDATE conversations
             SET last_message_text = ?2, last_message_role = ?3, last_message_at = ?4
             WHERE thread_id = ?1",
            params![
                thread_id,
                message.text,
                message.role.to_string(),
                millis(message.created_at),
            ],
        )?;
    }
    Ok(seq)
}

/// One page of a thread, oldest first.
pub async fn list(
    db: &Database,
    thread_id: &str,
    page: &PageRequest,
    exclude_tool_messages: bool,
) -> Result<Page<Message>, RelaydeskError> {
    let after = match &page.cursor {
        Some(raw) => {
            let cursor = Cursor::decode(raw)?;
            Some((cursor.created_ms, cursor.seq()?))
        }
        None => None,
    };
    let limit = page.effective_limit();
    let thread_id = thread_id.to_string();

    let mut items = db
        .connection()
        .call(move |conn| {
            let (after_ms, after_seq) = after.unwrap_or((i64::MIN, i64::MIN));
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE thread_id = ?1
                   AND (created_at > ?2 OR (created_at = ?2 AND seq > ?3))
                   AND (?4 = 0 OR role != 'tool')
                 ORDER BY created_at ASC, seq ASC
                 LIMIT ?5"
            ))?;
            let rows = stmt.query_map(
                params![
                    thread_id,
                    after_ms,
                    after_seq,
                    exclude_tool_messages,
                    (limit + 1) as i64
                ],
                rows::message,
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let is_done = items.len() <= limit;
    items.truncate(limit);
    let next_cursor = items
        .last()
        .map(|m| Cursor::new(millis(m.created_at), m.seq.to_string()).encode());

    Ok(Page {
        items,
        next_cursor,
        is_done,
    })
}

/// The newest `limit` messages of a thread, returned oldest first.
pub async fn recent(
    db: &Database,
    thread_id: &str,
    limit: usize,
    exclude_tool_messages: bool,
) -> Result<Vec<Message>, RelaydeskError> {
    let thread_id = thread_id.to_string();
    let mut items = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE thread_id = ?1 AND (?2 = 0 OR role != 'tool')
                 ORDER BY created_at DESC, seq DESC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(
                params![thread_id, exclude_tool_messages, limit as i64],
                rows::message,
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    items.reverse();
    Ok(items)
}

pub async fn count(
    db: &Database,
    thread_id: &str,
    exclude_tool_messages: bool,
) -> Result<u64, RelaydeskError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE thread_id = ?1 AND (?2 = 0 OR role != 'tool')",
                params![thread_id, exclude_tool_messages],
                |row| row.get::<_, i64>(0),
            )
        })
        .await
        .map(|n| n as u64)
        .map_err(crate::database::map_tr_err)
}
