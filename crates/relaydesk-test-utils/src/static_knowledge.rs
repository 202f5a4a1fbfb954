// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory knowledge base keyed by tenant namespace.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::traits::knowledge::Passage;
use relaydesk_core::{AdapterType, HealthStatus, KnowledgeBase, PluginAdapter, RelaydeskError};

/// Returns the passages registered for a namespace, ignoring the query
/// text, and records every search.
#[derive(Default)]
pub struct StaticKnowledgeBase {
    passages: Mutex<HashMap<String, Vec<Passage>>>,
    searches: Mutex<Vec<(String, String)>>,
}

impl StaticKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, namespace: &str, title: &str, text: &str) {
        self.passages
            .lock()
            .await
            .entry(namespace.to_string())
            .or_default()
            .push(Passage {
                title: Some(title.to_string()),
                text: text.to_string(),
                score: 1.0,
            });
    }

    /// `(namespace, query)` pairs, oldest first.
    pub async fn searches(&self) -> Vec<(String, String)> {
        self.searches.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for StaticKnowledgeBase {
    fn name(&self) -> &str {
        "static-knowledge"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Knowledge
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaydeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaydeskError> {
        Ok(())
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    async fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, RelaydeskError> {
        self.searches
            .lock()
            .await
            .push((namespace.to_string(), query.to_string()));
        let passages = self.passages.lock().await;
        Ok(passages
            .get(namespace)
            .map(|p| p.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
