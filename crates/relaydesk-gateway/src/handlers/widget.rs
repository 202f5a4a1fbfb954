// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visitor-facing widget routes. Callers are identified by contact session.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use relaydesk_agent::{TurnOutcome, VisitorInfo, WidgetBootstrap};
use relaydesk_core::types::{ContactSession, Conversation, DeviceMetadata, Message, Page};

use crate::auth::contact_session_id;
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub metadata: DeviceMetadata,
}

/// Body for routes that accept the session id inline.
#[derive(Debug, Default, Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub prompt: String,
}

/// POST /v1/widget/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ContactSession>), ApiError> {
    let visitor = VisitorInfo {
        name: body.name,
        email: body.email,
    };
    let session = state
        .sessions
        .create(&body.tenant_id, visitor, body.metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /v1/widget/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactSession>, ApiError> {
    Ok(Json(state.sessions.validate(&id).await?))
}

/// GET /v1/widget/tenants/{tenant}
pub async fn bootstrap(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<WidgetBootstrap>, ApiError> {
    Ok(Json(state.widget.bootstrap(&tenant_id).await?))
}

/// POST /v1/widget/conversations
pub async fn start_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<SessionBody>>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let session_id = contact_session_id(&headers, body.session_id.as_deref())?;
    let conversation = state.conversations.start(&session_id).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /v1/widget/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Conversation>, ApiError> {
    let session_id = contact_session_id(&headers, None)?;
    Ok(Json(
        state.conversations.get_for_visitor(&session_id, &id).await?,
    ))
}

/// POST /v1/widget/conversations/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let session_id = contact_session_id(&headers, body.session_id.as_deref())?;
    let outcome = state
        .orchestrator
        .send_visitor_message(&session_id, &id, &body.prompt)
        .await?;
    Ok(Json(outcome))
}

/// GET /v1/widget/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Message>>, ApiError> {
    let session_id = contact_session_id(&headers, None)?;
    let messages = state
        .conversations
        .visitor_messages(&session_id, &id, &page.into_request())
        .await?;
    Ok(Json(messages))
}
