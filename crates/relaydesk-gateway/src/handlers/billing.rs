// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator billing routes: subscription state and payment intents.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use relaydesk_billing::Checkout;
use relaydesk_core::RelaydeskError;
use relaydesk_core::types::{OperatorIdentity, PaymentIntent, PaymentMethod, Subscription};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan: String,
    #[serde(default)]
    pub method: PaymentMethod,
}

/// GET /v1/billing/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> Result<Json<Subscription>, ApiError> {
    let subscription = state
        .ledger
        .subscription(&operator.tenant_id)
        .await?
        .ok_or_else(|| RelaydeskError::not_found("subscription", operator.tenant_id))?;
    Ok(Json(subscription))
}

/// POST /v1/billing/subscription/cancel
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> Result<Json<Subscription>, ApiError> {
    Ok(Json(state.ledger.cancel(&operator.tenant_id).await?))
}

/// GET /v1/billing/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> Result<Json<Vec<PaymentIntent>>, ApiError> {
    Ok(Json(state.ledger.list_intents(&operator.tenant_id).await?))
}

/// POST /v1/billing/payments
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Checkout>), ApiError> {
    let checkout = state
        .ledger
        .checkout(&operator.tenant_id, &body.plan, body.method)
        .await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}
