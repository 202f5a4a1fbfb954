// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Relaydesk.
//!
//! Three audiences share one axum router:
//! - the embeddable widget, authenticated by a contact session id,
//! - the operator console, behind a bearer token and identity headers set by
//!   the identity proxy,
//! - the bank-transfer notifier, which posts to `/sepay-webhook` with an
//!   `Apikey` header.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::OperatorAuth;
pub use error::ApiError;
pub use server::{AppState, build_router, serve};
