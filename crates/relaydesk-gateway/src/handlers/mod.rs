// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers, grouped by audience.

pub mod billing;
pub mod operator;
pub mod webhook;
pub mod widget;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use relaydesk_core::types::PageRequest;

use crate::server::AppState;

/// `?cursor=..&limit=..` on paginated routes.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn into_request(self) -> PageRequest {
        PageRequest {
            cursor: self.cursor.filter(|c| !c.is_empty()),
            limit: self.limit.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when storage is unreachable.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.storage.health_check().await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.started_at.elapsed().as_secs(),
        }),
    )
}
