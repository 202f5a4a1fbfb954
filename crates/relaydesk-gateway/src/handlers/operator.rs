// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator console routes. The auth middleware supplies the
//! [`OperatorIdentity`] extension.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use relaydesk_agent::WidgetSettingsUpdate;
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::{
    ContactSession, Conversation, ConversationStatus, ConversationWithContact, Message,
    OperatorIdentity, Page, WidgetSettings,
};

use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListConversationsQuery {
    #[serde(default)]
    pub status: Option<ConversationStatus>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub draft: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub text: String,
}

/// GET /v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Json<Page<ConversationWithContact>>, ApiError> {
    let page = PageQuery {
        cursor: query.cursor,
        limit: query.limit,
    }
    .into_request();
    let conversations = state
        .conversations
        .list(&operator, query.status, &page)
        .await?;
    Ok(Json(conversations))
}

/// GET /v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
) -> Result<Json<ConversationWithContact>, ApiError> {
    Ok(Json(state.conversations.get(&operator, &id).await?))
}

/// POST /v1/conversations/{id}/status/advance
pub async fn advance_status(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.conversations.advance_status(&operator, &id).await?))
}

/// GET /v1/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Message>>, ApiError> {
    let messages = state
        .conversations
        .messages(&operator, &id, &page.into_request())
        .await?;
    Ok(Json(messages))
}

/// POST /v1/conversations/{id}/messages
pub async fn reply(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.operators.reply(&operator, &id, &body.text).await?))
}

/// GET /v1/conversations/{id}/contact-session
pub async fn contact_session(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(id): Path<String>,
) -> Result<Json<ContactSession>, ApiError> {
    Ok(Json(state.conversations.contact_session(&operator, &id).await?))
}

/// POST /v1/operator/enhance
pub async fn enhance(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Json(body): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, ApiError> {
    let text = state
        .operators
        .enhance_response(&operator, &body.draft)
        .await?;
    Ok(Json(EnhanceResponse { text }))
}

/// GET /v1/widget-settings
pub async fn get_widget_settings(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> Result<Json<WidgetSettings>, ApiError> {
    let settings = state
        .widget
        .get(&operator)
        .await?
        .ok_or_else(|| RelaydeskError::not_found("widget settings", operator.tenant_id))?;
    Ok(Json(settings))
}

/// PUT /v1/widget-settings
pub async fn put_widget_settings(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Json(update): Json<WidgetSettingsUpdate>,
) -> Result<Json<WidgetSettings>, ApiError> {
    Ok(Json(state.widget.upsert(&operator, update).await?))
}
