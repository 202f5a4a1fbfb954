// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` command: wires storage, services and the HTTP gateway, then
//! runs until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use relaydesk_agent::{
    AgentOrchestrator, ConversationService, NullKnowledgeBase, OperatorService, SessionStore,
    WidgetSettingsService,
};
use relaydesk_billing::PaymentLedger;
use relaydesk_config::RelaydeskConfig;
use relaydesk_core::{
    Clock, KnowledgeBase, PluginAdapter, RelaydeskError, StorageAdapter, SystemClock,
    TextGenerator,
};
use relaydesk_gateway::{AppState, OperatorAuth};
use relaydesk_groq::GroqGenerator;
use relaydesk_storage::SqliteStorage;

use crate::shutdown;

pub async fn run_serve(config: RelaydeskConfig) -> Result<(), RelaydeskError> {
    init_tracing(&config.server.log_level);

    info!("starting relaydesk serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let state = build_state(&config, storage.clone(), Arc::new(SystemClock))?;

    let cancel = shutdown::install_signal_handler();
    let result = relaydesk_gateway::serve(&config.server, state, async move {
        cancel.cancelled().await;
    })
    .await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed during shutdown");
    }
    storage.shutdown().await?;

    result?;
    info!("relaydesk serve shutdown complete");
    Ok(())
}

/// Builds every service over an initialized storage backend.
pub fn build_state(
    config: &RelaydeskConfig,
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
) -> Result<AppState, RelaydeskError> {
    let generator: Option<Arc<dyn TextGenerator>> = match GroqGenerator::from_config(&config.groq)?
    {
        Some(generator) => {
            info!(model = generator.model(), "groq text generator enabled");
            Some(Arc::new(generator) as Arc<dyn TextGenerator>)
        }
        None => {
            warn!("no Groq API key configured -- AI replies are disabled");
            None
        }
    };
    let knowledge: Arc<dyn KnowledgeBase> = Arc::new(NullKnowledgeBase);

    let sessions = Arc::new(SessionStore::new(
        storage.clone(),
        clock.clone(),
        &config.session,
    ));
    let widget = Arc::new(WidgetSettingsService::new(
        storage.clone(),
        clock.clone(),
        &config.widget,
    ));
    let conversations = Arc::new(ConversationService::new(
        storage.clone(),
        clock.clone(),
        sessions.clone(),
        widget.clone(),
        &config.agent,
    ));
    let orchestrator = Arc::new(
        AgentOrchestrator::new(
            storage.clone(),
            generator.clone(),
            knowledge,
            sessions.clone(),
            clock.clone(),
            config.agent.clone(),
        )
        .with_generation_limits(&config.groq),
    );
    let operators = Arc::new(OperatorService::new(
        storage.clone(),
        generator,
        clock.clone(),
    ));
    let ledger = Arc::new(PaymentLedger::new(storage.clone(), clock, &config.billing)?);

    if config.server.operator_token.is_none() {
        warn!("server.operator_token is unset -- operator API will reject all requests");
    }
    if config.webhook.api_key.is_none() {
        warn!("webhook.api_key is unset -- payment notifications will be rejected");
    }

    Ok(AppState {
        storage,
        sessions,
        widget,
        conversations,
        orchestrator,
        operators,
        ledger,
        auth: OperatorAuth {
            bearer_token: config.server.operator_token.clone(),
        },
        webhook_key: config.webhook.api_key.clone(),
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        started_at: Instant::now(),
    })
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("relaydesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
