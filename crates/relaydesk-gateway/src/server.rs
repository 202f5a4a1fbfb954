// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use relaydesk_agent::{
    AgentOrchestrator, ConversationService, OperatorService, SessionStore, WidgetSettingsService,
};
use relaydesk_billing::PaymentLedger;
use relaydesk_config::model::ServerConfig;
use relaydesk_core::{RelaydeskError, StorageAdapter};

use crate::auth::{OperatorAuth, operator_auth};
use crate::handlers::{self, billing, operator, webhook, widget};
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageAdapter>,
    pub sessions: Arc<SessionStore>,
    pub widget: Arc<WidgetSettingsService>,
    pub conversations: Arc<ConversationService>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub operators: Arc<OperatorService>,
    pub ledger: Arc<PaymentLedger>,
    pub auth: OperatorAuth,
    /// Secret expected in the webhook's `Apikey` header. `None` rejects all
    /// notifications.
    pub webhook_key: Option<String>,
    pub request_timeout: Duration,
    pub started_at: Instant,
}

/// Builds the full router:
/// - public: `GET /health`, `POST /sepay-webhook`
/// - widget: `/v1/widget/*`, authenticated per request by contact session
/// - operator: everything else under `/v1`, behind [`operator_auth`]
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/sepay-webhook", post(webhook::sepay_webhook))
        .with_state(state.clone());

    let widget_routes = Router::new()
        .route("/v1/widget/sessions", post(widget::create_session))
        .route("/v1/widget/sessions/{id}", get(widget::get_session))
        .route("/v1/widget/tenants/{tenant}", get(widget::bootstrap))
        .route("/v1/widget/conversations", post(widget::start_conversation))
        .route("/v1/widget/conversations/{id}", get(widget::get_conversation))
        .route(
            "/v1/widget/conversations/{id}/messages",
            get(widget::list_messages).post(widget::send_message),
        )
        .with_state(state.clone());

    let operator_routes = Router::new()
        .route("/v1/conversations", get(operator::list_conversations))
        .route("/v1/conversations/{id}", get(operator::get_conversation))
        .route(
            "/v1/conversations/{id}/status/advance",
            post(operator::advance_status),
        )
        .route(
            "/v1/conversations/{id}/messages",
            get(operator::list_messages).post(operator::reply),
        )
        .route(
            "/v1/conversations/{id}/contact-session",
            get(operator::contact_session),
        )
        .route("/v1/operator/enhance", post(operator::enhance))
        .route(
            "/v1/widget-settings",
            get(operator::get_widget_settings).put(operator::put_widget_settings),
        )
        .route("/v1/billing/subscription", get(billing::get_subscription))
        .route(
            "/v1/billing/subscription/cancel",
            post(billing::cancel_subscription),
        )
        .route(
            "/v1/billing/payments",
            get(billing::list_payments).post(billing::create_payment),
        )
        .layer(TimeoutLayer::new(state.request_timeout))
        .route("/v1/conversations/{id}/watch", get(sse::watch_conversation))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            operator_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(widget_routes.layer(TimeoutLayer::new(state.request_timeout)))
        .merge(operator_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RelaydeskError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RelaydeskError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RelaydeskError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
