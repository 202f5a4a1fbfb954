// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment intents and exactly-once settlement.

use chrono::{DateTime, Utc};
use relaydesk_core::RelaydeskError;
use relaydesk_core::period::{initial_period, renewed_period_end};
use relaydesk_core::types::{
    PaymentIntent, PaymentStatus, PaymentType, Reconciliation, Subscription, SubscriptionStatus,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info};

use crate::database::{Database, TxError, is_unique_violation};
use crate::queries::subscriptions;
use crate::rows::{self, PAYMENT_INTENT_COLUMNS, millis};

fn load(conn: &Connection, code: &str) -> rusqlite::Result<Option<PaymentIntent>> {
    conn.query_row(
        &format!("SELECT {PAYMENT_INTENT_COLUMNS} FROM payment_intents WHERE code = ?1"),
        params![code],
        rows::payment_intent,
    )
    .optional()
}

/// Insert a pending intent. A taken code is `AlreadyExists`.
pub async fn create(db: &Database, intent: &PaymentIntent) -> Result<(), RelaydeskError> {
    let intent = intent.clone();
    db.connection()
        .call(move |conn| -> Result<(), TxError> {
            let result = conn.execute(
                "INSERT INTO payment_intents
                 (id, tenant_id, code, amount, currency, payment_type, method, status, plan,
                  interval, created_at, paid_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    intent.id,
                    intent.tenant_id,
                    intent.code,
                    intent.amount,
                    intent.currency,
                    intent.payment_type.to_string(),
                    intent.method.to_string(),
                    intent.status.to_string(),
                    intent.plan,
                    intent.interval.to_string(),
                    millis(intent.created_at),
                    intent.paid_at.map(millis),
                ],
            );
            match result {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(RelaydeskError::AlreadyExists(format!(
                    "payment code {}",
                    intent.code
                ))
                .into()),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tx_err)
}

pub async fn get(db: &Database, code: &str) -> Result<Option<PaymentIntent>, RelaydeskError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| load(conn, &code))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Newest first.
pub async fn list(db: &Database, tenant_id: &str) -> Result<Vec<PaymentIntent>, RelaydeskError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_INTENT_COLUMNS} FROM payment_intents
                 WHERE tenant_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![tenant_id], rows::payment_intent)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a pending intent to `failed`. Settled intents are left alone.
pub async fn fail(
    db: &Database,
    tenant_id: &str,
    code: &str,
) -> Result<PaymentIntent, RelaydeskError> {
    let tenant_id = tenant_id.to_string();
    let code = code.to_string();
    db.connection()
        .call(move |conn| -> Result<PaymentIntent, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let intent = load(&tx, &code)?
                .filter(|i| i.tenant_id == tenant_id)
                .ok_or_else(|| RelaydeskError::not_found("payment intent", code.clone()))?;
            if intent.status != PaymentStatus::Pending {
                return Err(RelaydeskError::Validation(format!(
                    "payment {code} is {} and cannot be marked failed",
                    intent.status
                ))
                .into());
            }
            tx.execute(
                "UPDATE payment_intents SET status = ?2 WHERE code = ?1",
                params![code, PaymentStatus::Failed.to_string()],
            )?;
            tx.commit()?;
            Ok(PaymentIntent {
                status: PaymentStatus::Failed,
                ..intent
            })
        })
        .await
        .map_err(crate::database::map_tx_err)
}

/// Settle the intent with `code` and apply its subscription effect.
///
/// Runs as one IMMEDIATE transaction; any failure rolls back every write.
pub async fn reconcile(
    db: &Database,
    code: &str,
    observed_amount: i64,
    now: DateTime<Utc>,
) -> Result<Reconciliation, RelaydeskError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| -> Result<Reconciliation, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let intent = load(&tx, &code)?
                .ok_or_else(|| RelaydeskError::not_found("payment intent", code.clone()))?;

            if observed_amount != intent.amount {
                return Err(RelaydeskError::AmountMismatch {
                    code,
                    expected: intent.amount,
                    observed: observed_amount,
                }
                .into());
            }

            match intent.status {
                PaymentStatus::Success => {
                    debug!(code = %code, "payment already settled");
                    let subscription = subscriptions::load(&tx, &intent.tenant_id)?;
                    return Ok(Reconciliation {
                        intent,
                        subscription,
                        applied: false,
                    });
                }
                PaymentStatus::Pending => {}
                other => {
                    return Err(RelaydeskError::Validation(format!(
                        "payment {code} is {other} and cannot be settled"
                    ))
                    .into());
                }
            }

            tx.execute(
                "UPDATE payment_intents SET status = ?2, paid_at = ?3 WHERE code = ?1",
                params![code, PaymentStatus::Success.to_string(), millis(now)],
            )?;

            let existing = subscriptions::load(&tx, &intent.tenant_id)?;
            match intent.payment_type {
                PaymentType::SubscriptionCreation => {
                    if existing.is_some() {
                        return Err(RelaydeskError::AlreadyExists(format!(
                            "subscription for tenant {}",
                            intent.tenant_id
                        ))
                        .into());
                    }
                    let (start, end) = initial_period(now, intent.interval);
                    subscriptions::insert(
                        &tx,
                        &Subscription {
                            id: uuid::Uuid::new_v4().to_string(),
                            tenant_id: intent.tenant_id.clone(),
                            plan: intent.plan.clone(),
                            status: SubscriptionStatus::Active,
                            interval: intent.interval,
                            current_period_start: start,
                            current_period_end: end,
                            cancel_at_period_end: false,
                            created_at: now,
                            updated_at: now,
                        },
                    )?;
                }
                PaymentType::SubscriptionRenewal => {
                    let current = existing.ok_or_else(|| {
                        RelaydeskError::not_found("subscription", intent.tenant_id.clone())
                    })?;
                    // The subscription's own interval sets the period, not the intent's.
                    let end = renewed_period_end(current.current_period_end, now, current.interval);
                    subscriptions::renew(&tx, &intent.tenant_id, end, now)?;
                }
            }

            let settled = load(&tx, &code)?
                .ok_or_else(|| RelaydeskError::not_found("payment intent", code.clone()))?;
            let subscription = subscriptions::load(&tx, &settled.tenant_id)?;
            tx.commit()?;

            info!(
                code = %code,
                tenant_id = %settled.tenant_id,
                payment_type = %settled.payment_type,
                "payment settled"
            );
            Ok(Reconciliation {
                intent: settled,
                subscription,
                applied: true,
            })
        })
        .await
        .map_err(crate::database::map_tx_err)
}
