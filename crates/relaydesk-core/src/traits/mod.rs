// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the services and their backends.
//!
//! Services hold `Arc<dyn Trait>` handles, so each trait is object safe via
//! `#[async_trait]`.

pub mod adapter;
pub mod generator;
pub mod knowledge;
pub mod storage;

pub use adapter::PluginAdapter;
pub use generator::TextGenerator;
pub use knowledge::KnowledgeBase;
pub use storage::StorageAdapter;
