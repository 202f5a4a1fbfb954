// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing for the Relaydesk support desk.
//!
//! Tenants pay by bank transfer: a payment intent is registered under a
//! unique code, the payer puts that code in the transfer description, and the
//! bank's webhook later settles the intent by code. Settlement creates or
//! renews the tenant's subscription exactly once.

pub mod code;
pub mod ledger;
pub mod plans;
pub mod qr;
pub mod webhook;

pub use ledger::{Checkout, IntentRequest, PaymentLedger};
pub use plans::{Plan, PlanCatalog};
pub use webhook::TransferNotification;
