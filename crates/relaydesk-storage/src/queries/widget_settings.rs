// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant widget settings.

use relaydesk_core::RelaydeskError;
use relaydesk_core::types::WidgetSettings;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::rows::{self, WIDGET_SETTINGS_COLUMNS, millis};

pub async fn upsert(db: &Database, settings: &WidgetSettings) -> Result<(), RelaydeskError> {
    let settings = settings.clone();
    let suggestions =
        serde_json::to_string(&settings.suggestions).map_err(|e| RelaydeskError::Storage {
            source: Box::new(e),
        })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO widget_settings (tenant_id, greeting_message, suggestions, theme, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(tenant_id) DO UPDATE SET
                     greeting_message = excluded.greeting_message,
                     suggestions = excluded.suggestions,
                     theme = excluded.theme,
                     updated_at = excluded.updated_at",
                params![
                    settings.tenant_id,
                    settings.greeting_message,
                    suggestions,
                    settings.theme,
                    millis(settings.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get(db: &Database, tenant_id: &str) -> Result<Option<WidgetSettings>, RelaydeskError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {WIDGET_SETTINGS_COLUMNS} FROM widget_settings WHERE tenant_id = ?1"),
                params![tenant_id],
                rows::widget_settings,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
