// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Relaydesk integration tests.
//!
//! # Components
//!
//! - [`MockGenerator`] - scripted text generator that records its requests
//! - [`StaticKnowledgeBase`] - in-memory passages per tenant namespace
//! - [`TestHarness`] - temp SQLite database with every service wired to a
//!   manual clock

pub mod harness;
pub mod mock_generator;
pub mod static_knowledge;

pub use harness::TestHarness;
pub use mock_generator::MockGenerator;
pub use static_knowledge::StaticKnowledgeBase;
