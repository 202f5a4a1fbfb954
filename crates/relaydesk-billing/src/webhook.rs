// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bank-transfer notification payloads.
//!
//! The notifier posts one JSON object per transfer and authenticates with an
//! `Authorization: Apikey <secret>` header. Delivery is at-least-once, so the
//! ledger's reconcile step must tolerate replays.

use serde::{Deserialize, Deserializer};

/// A transfer notification as posted by the bank notifier.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferNotification {
    pub id: Option<i64>,
    pub gateway: Option<String>,
    pub transaction_date: Option<String>,
    pub account_number: Option<String>,
    /// Payment code extracted by the notifier, when it recognized one.
    pub code: Option<String>,
    /// Raw transfer description.
    pub content: Option<String>,
    /// `in` for incoming transfers, `out` for outgoing.
    pub transfer_type: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub transfer_amount: i64,
    pub accumulated: Option<f64>,
    pub sub_account: Option<String>,
    pub reference_code: Option<String>,
    pub description: Option<String>,
}

impl TransferNotification {
    pub fn is_incoming(&self) -> bool {
        self.transfer_type.eq_ignore_ascii_case("in")
    }

    /// The code to settle: `code` when present, otherwise the description.
    pub fn payment_code(&self) -> Option<&str> {
        [self.code.as_deref(), self.content.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Amounts arrive as integers, floats with no fraction, or numeric strings.
fn lenient_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let amount = match &value {
        serde_json::Value::Null => Some(0),
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    amount.ok_or_else(|| D::Error::custom(format!("transferAmount is not an integer: {value}")))
}

/// Checks an `Authorization` header of the form `Apikey <secret>`.
///
/// Fails closed when no secret is configured.
pub fn verify_apikey(header: Option<&str>, expected: Option<&str>) -> bool {
    let (Some(header), Some(expected)) = (header, expected) else {
        return false;
    };
    if expected.is_empty() {
        return false;
    }
    match header.trim().split_once(' ') {
        Some((scheme, token)) => {
            scheme.eq_ignore_ascii_case("apikey") && token.trim() == expected
        }
        None => false,
    }
}
