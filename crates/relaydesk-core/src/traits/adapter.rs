// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every pluggable backend.

use async_trait::async_trait;

use crate::error::RelaydeskError;
use crate::types::{AdapterType, HealthStatus};

/// Supertrait of [`StorageAdapter`](crate::StorageAdapter),
/// [`TextGenerator`](crate::TextGenerator) and
/// [`KnowledgeBase`](crate::KnowledgeBase).
///
/// `/health` reports through [`health_check`](Self::health_check) and the
/// binary calls [`shutdown`](Self::shutdown) once the gateway has drained.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short identifier used in logs, e.g. `sqlite` or `groq`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    async fn health_check(&self) -> Result<HealthStatus, RelaydeskError>;

    /// Flushes and releases held resources. Safe to call more than once.
    async fn shutdown(&self) -> Result<(), RelaydeskError>;
}
