// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base trait for the external document index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelaydeskError;
use crate::traits::adapter::PluginAdapter;

/// A passage returned by a knowledge search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub title: Option<String>,
    pub text: String,
    pub score: f32,
}

/// Read-only access to a tenant-partitioned document index.
#[async_trait]
pub trait KnowledgeBase: PluginAdapter {
    /// Searches the index restricted to `namespace` (the tenant id).
    async fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, RelaydeskError>;
}
