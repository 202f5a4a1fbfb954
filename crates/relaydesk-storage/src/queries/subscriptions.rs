// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription lookups and in-transaction mutations used by reconciliation.

use chrono::{DateTime, Utc};
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::{Subscription, SubscriptionStatus};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::database::{Database, TxError};
use crate::rows::{self, SUBSCRIPTION_COLUMNS, millis};

pub(crate) fn load(conn: &Connection, tenant_id: &str) -> rusqlite::Result<Option<Subscription>> {
    conn.query_row(
        &format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE tenant_id = ?1"),
        params![tenant_id],
        rows::subscription,
    )
    .optional()
}

pub(crate) fn insert(conn: &Connection, subscription: &Subscription) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO subscriptions
         (id, tenant_id, plan, status, interval, current_period_start, current_period_end,
          cancel_at_period_end, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            subscription.id,
            subscription.tenant_id,
            subscription.plan,
            subscription.status.to_string(),
            subscription.interval.to_string(),
            millis(subscription.current_period_start),
            millis(subscription.current_period_end),
            subscription.cancel_at_period_end,
            millis(subscription.created_at),
            millis(subscription.updated_at),
        ],
    )?;
    Ok(())
}

/// Reactivate with a new period end and clear any pending cancellation.
pub(crate) fn renew(
    conn: &Connection,
    tenant_id: &str,
    period_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE subscriptions
         SET status = ?2, current_period_end = ?3, cancel_at_period_end = 0, updated_at = ?4
         WHERE tenant_id = ?1",
        params![
            tenant_id,
            SubscriptionStatus::Active.to_string(),
            millis(period_end),
            millis(now),
        ],
    )?;
    Ok(())
}

pub async fn get(db: &Database, tenant_id: &str) -> Result<Option<Subscription>, RelaydeskError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| load(conn, &tenant_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag the subscription to lapse at period end.
pub async fn cancel(
    db: &Database,
    tenant_id: &str,
    now: DateTime<Utc>,
) -> Result<Subscription, RelaydeskError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Subscription, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let updated = tx.execute(
                "UPDATE subscriptions SET cancel_at_period_end = 1, updated_at = ?2
                 WHERE tenant_id = ?1",
                params![tenant_id, millis(now)],
            )?;
            if updated == 0 {
                return Err(RelaydeskError::not_found("subscription", tenant_id).into());
            }
            let subscription = load(&tx, &tenant_id)?
                .ok_or_else(|| RelaydeskError::not_found("subscription", tenant_id.clone()))?;
            tx.commit()?;
            Ok(subscription)
        })
        .await
        .map_err(crate::database::map_tx_err)
}
