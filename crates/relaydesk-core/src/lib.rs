// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaydesk support desk.
//!
//! This crate provides the error taxonomy, the domain records shared by every
//! service, the subscription period arithmetic, and the adapter traits that
//! storage, text generation and knowledge search backends implement.

pub mod clock;
pub mod error;
pub mod period;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RelaydeskError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{KnowledgeBase, PluginAdapter, StorageAdapter, TextGenerator};
