// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! POST /sepay-webhook
//!
//! Status codes drive the notifier's retry policy: 200 stops delivery, 500
//! asks for a retry. A replayed notification for a settled code is a 200.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{info, warn};

use relaydesk_billing::TransferNotification;
use relaydesk_billing::webhook::verify_apikey;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn failure(error: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(WebhookResponse {
            success: false,
            message: None,
            error: Some(error.into()),
        }),
    )
        .into_response()
}

fn processed(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(WebhookResponse {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }),
    )
        .into_response()
}

pub async fn sepay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());
    if !verify_apikey(authorization, state.webhook_key.as_deref()) {
        warn!("webhook rejected: bad or missing api key");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let notification: TransferNotification = match serde_json::from_slice(&body) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "webhook rejected: malformed payload");
            return failure(format!("malformed payload: {e}"));
        }
    };

    if notification.is_incoming() && notification.payment_code().is_none() {
        warn!(transfer_id = ?notification.id, "webhook rejected: missing payment code");
        return (StatusCode::BAD_REQUEST, "Missing payment code").into_response();
    }

    match state.ledger.reconcile_notification(&notification).await {
        Ok(None) => processed("Ignored non-incoming transfer"),
        Ok(Some(settled)) => {
            info!(
                code = %settled.intent.code,
                applied = settled.applied,
                "webhook processed"
            );
            processed("Webhook processed")
        }
        Err(e) => {
            warn!(error = %e, "webhook settlement failed");
            failure(e.to_string())
        }
    }
}
