// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite database and wires every Relaydesk
//! service to it, a [`ManualClock`], a [`MockGenerator`] and a
//! [`StaticKnowledgeBase`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use relaydesk_agent::{
    AgentOrchestrator, ConversationService, OperatorService, SessionStore, VisitorInfo,
    WidgetSettingsService,
};
use relaydesk_billing::PaymentLedger;
use relaydesk_config::model::{RelaydeskConfig, StorageConfig};
use relaydesk_core::traits::generator::GenerationResponse;
use relaydesk_core::types::{
    ContactSession, Conversation, DeviceMetadata, OperatorIdentity, PaymentMethod, Subscription,
};
use relaydesk_core::{
    Clock, KnowledgeBase, ManualClock, RelaydeskError, StorageAdapter, TextGenerator,
};
use relaydesk_storage::SqliteStorage;

use crate::mock_generator::MockGenerator;
use crate::static_knowledge::StaticKnowledgeBase;

/// 2026-01-01T00:00:00Z.
const DEFAULT_START_MS: i64 = 1_767_225_600_000;

pub struct TestHarnessBuilder {
    responses: Vec<GenerationResponse>,
    config: RelaydeskConfig,
    with_generator: bool,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            config: RelaydeskConfig::default(),
            with_generator: true,
            start: DateTime::from_timestamp_millis(DEFAULT_START_MS).unwrap_or_default(),
        }
    }

    pub fn with_responses(mut self, responses: Vec<GenerationResponse>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_config(mut self, edit: impl FnOnce(&mut RelaydeskConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Services get no generator, as when `groq.api_key` is unset.
    pub fn without_generator(mut self) -> Self {
        self.with_generator = false;
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub async fn build(self) -> Result<TestHarness, RelaydeskError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RelaydeskError::Storage { source: e.into() })?;
        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let clock = Arc::new(ManualClock::new(self.start));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let generator = Arc::new(MockGenerator::with_responses(self.responses));
        let dyn_generator: Option<Arc<dyn TextGenerator>> = if self.with_generator {
            Some(generator.clone() as Arc<dyn TextGenerator>)
        } else {
            None
        };
        let knowledge = Arc::new(StaticKnowledgeBase::new());
        let dyn_knowledge: Arc<dyn KnowledgeBase> = knowledge.clone();

        let sessions = Arc::new(SessionStore::new(
            storage.clone(),
            dyn_clock.clone(),
            &config.session,
        ));
        let widget = Arc::new(WidgetSettingsService::new(
            storage.clone(),
            dyn_clock.clone(),
            &config.widget,
        ));
        let conversations = Arc::new(ConversationService::new(
            storage.clone(),
            dyn_clock.clone(),
            sessions.clone(),
            widget.clone(),
            &config.agent,
        ));
        let orchestrator = Arc::new(
            AgentOrchestrator::new(
                storage.clone(),
                dyn_generator.clone(),
                dyn_knowledge,
                sessions.clone(),
                dyn_clock.clone(),
                config.agent.clone(),
            )
            .with_generation_limits(&config.groq),
        );
        let operators = Arc::new(OperatorService::new(
            storage.clone(),
            dyn_generator,
            dyn_clock.clone(),
        ));
        let ledger = Arc::new(PaymentLedger::new(
            storage.clone(),
            dyn_clock,
            &config.billing,
        )?);

        Ok(TestHarness {
            storage,
            clock,
            generator,
            knowledge,
            sessions,
            widget,
            conversations,
            orchestrator,
            operators,
            ledger,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// Every service over one temp database.
pub struct TestHarness {
    pub storage: Arc<dyn StorageAdapter>,
    pub clock: Arc<ManualClock>,
    pub generator: Arc<MockGenerator>,
    pub knowledge: Arc<StaticKnowledgeBase>,
    pub sessions: Arc<SessionStore>,
    pub widget: Arc<WidgetSettingsService>,
    pub conversations: Arc<ConversationService>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub operators: Arc<OperatorService>,
    pub ledger: Arc<PaymentLedger>,
    pub config: RelaydeskConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, RelaydeskError> {
        Self::builder().build().await
    }

    pub fn operator(&self, tenant_id: &str) -> OperatorIdentity {
        OperatorIdentity {
            tenant_id: tenant_id.to_string(),
            operator_id: format!("op_{tenant_id}"),
            display_name: "Linh".to_string(),
        }
    }

    pub async fn visitor(&self, tenant_id: &str) -> Result<ContactSession, RelaydeskError> {
        self.sessions
            .create(
                tenant_id,
                VisitorInfo {
                    name: "Ann".to_string(),
                    email: "ann@example.com".to_string(),
                },
                DeviceMetadata::default(),
            )
            .await
    }

    /// A new visitor session and a conversation opened from it.
    pub async fn start_conversation(
        &self,
        tenant_id: &str,
    ) -> Result<(ContactSession, Conversation), RelaydeskError> {
        let session = self.visitor(tenant_id).await?;
        let conversation = self.conversations.start(&session.id).await?;
        Ok((session, conversation))
    }

    /// Pays for the first configured plan through checkout and webhook.
    pub async fn activate_subscription(
        &self,
        tenant_id: &str,
    ) -> Result<Subscription, RelaydeskError> {
        let plan = self
            .config
            .billing
            .plans
            .first()
            .map(|p| p.name.clone())
            .ok_or_else(|| RelaydeskError::Config("no billing plans configured".into()))?;
        let checkout = self
            .ledger
            .checkout(tenant_id, &plan, PaymentMethod::Qr)
            .await?;
        let settled = self
            .ledger
            .reconcile(&checkout.intent.code, checkout.intent.amount)
            .await?;
        settled
            .subscription
            .ok_or_else(|| RelaydeskError::Internal("settlement produced no subscription".into()))
    }

    pub async fn conversation(&self, id: &str) -> Result<Conversation, RelaydeskError> {
        self.storage
            .get_conversation(id)
            .await?
            .ok_or_else(|| RelaydeskError::not_found("conversation", id))
    }
}
