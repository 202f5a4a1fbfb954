// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row decoding and column encoding shared by the query modules.
//!
//! Instants are stored as epoch milliseconds; enums as their snake_case names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use relaydesk_core::types::{
    ContactSession, Conversation, LastMessage, Message, PaymentIntent, Subscription,
    WidgetSettings,
};
use rusqlite::Row;
use rusqlite::types::Type;

pub(crate) fn millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

fn instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {ms}").into(),
        )
    })
}

fn optional_instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(_) => instant(row, idx).map(Some),
        None => Ok(None),
    }
}

fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) const CONTACT_SESSION_COLUMNS: &str =
    "id, tenant_id, name, email, metadata, created_at, expires_at";

pub(crate) fn contact_session(row: &Row<'_>) -> rusqlite::Result<ContactSession> {
    Ok(ContactSession {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        metadata: json(row, 4)?,
        created_at: instant(row, 5)?,
        expires_at: instant(row, 6)?,
    })
}

pub(crate) const CONVERSATION_COLUMNS: &str = "id, tenant_id, contact_session_id, thread_id, status, \
     last_message_text, last_message_role, last_message_at, created_at, updated_at";

pub(crate) fn conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let last_message = match row.get::<_, Option<String>>(5)? {
        Some(text) => Some(LastMessage {
            text,
            role: parsed(row, 6)?,
            created_at: instant(row, 7)?,
        }),
        None => None,
    };
    Ok(Conversation {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        contact_session_id: row.get(2)?,
        thread_id: row.get(3)?,
        status: parsed(row, 4)?,
        last_message,
        created_at: instant(row, 8)?,
        updated_at: instant(row, 9)?,
    })
}

pub(crate) const MESSAGE_COLUMNS: &str =
    "seq, id, thread_id, role, text, author_name, tool_name, created_at";

pub(crate) fn message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        seq: row.get(0)?,
        id: row.get(1)?,
        thread_id: row.get(2)?,
        role: parsed(row, 3)?,
        text: row.get(4)?,
        author_name: row.get(5)?,
        tool_name: row.get(6)?,
        created_at: instant(row, 7)?,
    })
}

pub(crate) const PAYMENT_INTENT_COLUMNS: &str = "id, tenant_id, code, amount, currency, \
     payment_type, method, status, plan, interval, created_at, paid_at";

pub(crate) fn payment_intent(row: &Row<'_>) -> rusqlite::Result<PaymentIntent> {
    Ok(PaymentIntent {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        code: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        payment_type: parsed(row, 5)?,
        method: parsed(row, 6)?,
        status: parsed(row, 7)?,
        plan: row.get(8)?,
        interval: parsed(row, 9)?,
        created_at: instant(row, 10)?,
        paid_at: optional_instant(row, 11)?,
    })
}

pub(crate) const SUBSCRIPTION_COLUMNS: &str = "id, tenant_id, plan, status, interval, \
     current_period_start, current_period_end, cancel_at_period_end, created_at, updated_at";

pub(crate) fn subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        plan: row.get(2)?,
        status: parsed(row, 3)?,
        interval: parsed(row, 4)?,
        current_period_start: instant(row, 5)?,
        current_period_end: instant(row, 6)?,
        cancel_at_period_end: row.get(7)?,
        created_at: instant(row, 8)?,
        updated_at: instant(row, 9)?,
    })
}

pub(crate) const WIDGET_SETTINGS_COLUMNS: &str =
    "tenant_id, greeting_message, suggestions, theme, updated_at";

pub(crate) fn widget_settings(row: &Row<'_>) -> rusqlite::Result<WidgetSettings> {
    Ok(WidgetSettings {
        tenant_id: row.get(0)?,
        greeting_message: row.get(1)?,
        suggestions: json(row, 2)?,
        theme: row.get(3)?,
        updated_at: instant(row, 4)?,
    })
}
