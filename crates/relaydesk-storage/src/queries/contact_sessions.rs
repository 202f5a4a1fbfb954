// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact session CRUD operations.

use chrono::{DateTime, Utc};
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::ContactSession;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, TxError};
use crate::rows::{self, CONTACT_SESSION_COLUMNS, millis};

pub async fn create(db: &Database, session: &ContactSession) -> Result<(), RelaydeskError> {
    let session = session.clone();
    let metadata = serde_json::to_string(&session.metadata).map_err(|e| {
        RelaydeskError::Storage {
            source: Box::new(e),
        }
    })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO contact_sessions (id, tenant_id, name, email, metadata, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.id,
                    session.tenant_id,
                    session.name,
                    session.email,
                    metadata,
                    millis(session.created_at),
                    millis(session.expires_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<ContactSession>, RelaydeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CONTACT_SESSION_COLUMNS} FROM contact_sessions WHERE id = ?1"),
                params![id],
                rows::contact_session,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Raise the expiry to `expires_at` unless it is already later.
pub async fn extend(
    db: &Database,
    id: &str,
    expires_at: DateTime<Utc>,
) -> Result<ContactSession, RelaydeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<ContactSession, TxError> {
            let updated = conn.execute(
                "UPDATE contact_sessions SET expires_at = MAX(expires_at, ?2) WHERE id = ?1",
                params![id, millis(expires_at)],
            )?;
            if updated == 0 {
                return Err(RelaydeskError::not_found("contact session", id).into());
            }
            Ok(conn.query_row(
                &format!("SELECT {CONTACT_SESSION_COLUMNS} FROM contact_sessions WHERE id = ?1"),
                params![id],
                rows::contact_session,
            )?)
        })
        .await
        .map_err(crate::database::map_tx_err)
}
