// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generator for deterministic testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::traits::generator::{GenerationRequest, GenerationResponse};
use relaydesk_core::{AdapterType, HealthStatus, PluginAdapter, RelaydeskError, TextGenerator};

enum Scripted {
    Respond(GenerationResponse),
    Fail(String),
}

/// A generator that replays scripted responses in FIFO order.
///
/// When the script is empty, a plain "mock reply" text is returned.
#[derive(Default)]
pub struct MockGenerator {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<GenerationResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Scripted::Respond).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_response(&self, response: GenerationResponse) {
        self.script.lock().await.push_back(Scripted::Respond(response));
    }

    /// The next call fails with `GenerationFailed`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaydeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaydeskError> {
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, RelaydeskError> {
        self.requests.lock().await.push(request);
        match self.script.lock().await.pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(RelaydeskError::generation(message)),
            None => Ok(GenerationResponse::text("mock reply")),
        }
    }
}
