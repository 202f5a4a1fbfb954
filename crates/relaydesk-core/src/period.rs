// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription period arithmetic.

use chrono::{DateTime, Utc};

use crate::types::BillingInterval;

/// Period of a freshly created subscription: `[now, now + period)`.
pub fn initial_period(
    now: DateTime<Utc>,
    interval: BillingInterval,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + interval.period())
}

/// New period end after a renewal payment.
///
/// An expired period restarts from `now`; a running one is extended so
/// unused prepaid time is kept.
pub fn renewed_period_end(
    current_end: DateTime<Utc>,
    now: DateTime<Utc>,
    interval: BillingInterval,
) -> DateTime<Utc> {
    if current_end < now {
        now + interval.period()
    } else {
        current_end + interval.period()
    }
}
