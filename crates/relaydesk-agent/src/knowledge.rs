// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base used when no document index is configured.

use async_trait::async_trait;

use relaydesk_core::traits::knowledge::Passage;
use relaydesk_core::{AdapterType, HealthStatus, KnowledgeBase, PluginAdapter, RelaydeskError};

/// Answers every search with no passages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKnowledgeBase;

#[async_trait]
impl PluginAdapter for NullKnowledgeBase {
    fn name(&self) -> &str {
        "null-knowledge"
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
impl KnowledgeBase for NullKnowledgeBase {
    async fn search(
        &self,
        _namespace: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<Passage>, RelaydeskError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_index_finds_nothing() {
        let kb = NullKnowledgeBase;
        assert_eq!(kb.adapter_type(), AdapterType::Knowledge);
        assert!(kb.search("org_1", "refund policy", 5).await.unwrap().is_empty());
    }
}
