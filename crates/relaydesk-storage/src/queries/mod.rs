// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for each stored entity.

pub mod contact_sessions;
pub mod conversations;
pub mod messages;
pub mod payments;
pub mod subscriptions;
pub mod widget_settings;
