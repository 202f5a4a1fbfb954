// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment ledger service.
//!
//! Wraps the storage adapter with intent validation, plan pricing, code
//! generation and the webhook reconciliation entry point.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use relaydesk_config::model::BillingConfig;
use relaydesk_core::types::{
    BillingInterval, PaymentIntent, PaymentMethod, PaymentStatus, PaymentType, Reconciliation,
    Subscription,
};
use relaydesk_core::{Clock, RelaydeskError, StorageAdapter};

use crate::code::{generate_code, is_valid_code};
use crate::plans::PlanCatalog;
use crate::qr::QrImageBuilder;
use crate::webhook::TransferNotification;

/// Attempts at drawing an unused random code before giving up.
const CODE_ATTEMPTS: usize = 3;

/// An explicit payment intent registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    pub code: String,
    pub amount: i64,
    pub payment_type: PaymentType,
    pub plan: String,
    pub interval: BillingInterval,
    pub method: PaymentMethod,
}

/// A freshly created intent plus the transfer QR image the payer scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkout {
    pub intent: PaymentIntent,
    pub qr_url: Option<String>,
}

pub struct PaymentLedger {
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    catalog: PlanCatalog,
    qr: QrImageBuilder,
    code_prefix: String,
    currency: String,
}

impl PaymentLedger {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: &BillingConfig,
    ) -> Result<Self, RelaydeskError> {
        Ok(Self {
            storage,
            clock,
            catalog: PlanCatalog::from_config(config)?,
            qr: QrImageBuilder::from_config(config)?,
            code_prefix: config.code_prefix.clone(),
            currency: config.currency.clone(),
        })
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Registers a pending intent under a caller-chosen code.
    pub async fn create_intent(
        &self,
        tenant_id: &str,
        request: IntentRequest,
    ) -> Result<PaymentIntent, RelaydeskError> {
        if request.amount <= 0 {
            return Err(RelaydeskError::Validation(format!(
                "payment amount must be positive, got {}",
                request.amount
            )));
        }
        if !is_valid_code(&request.code) {
            return Err(RelaydeskError::Validation(format!(
                "payment code `{}` must be 1-64 ASCII alphanumerics",
                request.code
            )));
        }

        let intent = PaymentIntent {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            code: request.code,
            amount: request.amount,
            currency: self.currency.clone(),
            payment_type: request.payment_type,
            method: request.method,
            status: PaymentStatus::Pending,
            plan: request.plan,
            interval: request.interval,
            created_at: self.clock.now(),
            paid_at: None,
        };
        self.storage.create_payment_intent(&intent).await?;
        info!(
            tenant_id,
            code = %intent.code,
            amount = intent.amount,
            payment_type = %intent.payment_type,
            "payment intent created"
        );
        Ok(intent)
    }

    /// Prices `plan` from the catalog and registers an intent for it.
    ///
    /// The intent renews when the tenant already has a subscription and
    /// creates one otherwise.
    pub async fn checkout(
        &self,
        tenant_id: &str,
        plan: &str,
        method: PaymentMethod,
    ) -> Result<Checkout, RelaydeskError> {
        let plan = self.catalog.get(plan)?.clone();
        let payment_type = match self.storage.get_subscription(tenant_id).await? {
            Some(_) => PaymentType::SubscriptionRenewal,
            None => PaymentType::SubscriptionCreation,
        };

        let mut attempt = 0;
        let intent = loop {
            attempt += 1;
            let request = IntentRequest {
                code: generate_code(&self.code_prefix, self.clock.now()),
                amount: plan.amount,
                payment_type,
                plan: plan.name.clone(),
                interval: plan.interval,
                method,
            };
            match self.create_intent(tenant_id, request).await {
                Err(RelaydeskError::AlreadyExists(_)) if attempt < CODE_ATTEMPTS => continue,
                other => break other?,
            }
        };

        let qr_url = match intent.method {
            PaymentMethod::Qr => self.qr.image_url(intent.amount, &intent.code),
            PaymentMethod::CreditCard => None,
        };
        Ok(Checkout { intent, qr_url })
    }

    /// Settles the intent with `code`. Replays return `applied: false`.
    pub async fn reconcile(
        &self,
        code: &str,
        observed_amount: i64,
    ) -> Result<Reconciliation, RelaydeskError> {
        let result = self
            .storage
            .reconcile_payment(code, observed_amount, self.clock.now())
            .await;
        match &result {
            Ok(r) if !r.applied => info!(code, "payment already settled, replay ignored"),
            Ok(_) => {}
            Err(e) => warn!(code, observed_amount, error = %e, "payment reconciliation failed"),
        }
        result
    }

    /// Webhook entry point. Outgoing transfers are ignored and yield `None`.
    pub async fn reconcile_notification(
        &self,
        notification: &TransferNotification,
    ) -> Result<Option<Reconciliation>, RelaydeskError> {
        if !notification.is_incoming() {
            info!(
                transfer_type = %notification.transfer_type,
                "ignoring non-incoming transfer"
            );
            return Ok(None);
        }
        let code = notification
            .payment_code()
            .ok_or_else(|| RelaydeskError::Validation("missing payment code".into()))?;
        self.reconcile(code, notification.transfer_amount)
            .await
            .map(Some)
    }

    pub async fn fail_intent(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> Result<PaymentIntent, RelaydeskError> {
        let intent = self.storage.fail_payment_intent(tenant_id, code).await?;
        info!(tenant_id, code, "payment intent failed");
        Ok(intent)
    }

    pub async fn list_intents(&self, tenant_id: &str) -> Result<Vec<PaymentIntent>, RelaydeskError> {
        self.storage.list_payment_intents(tenant_id).await
    }

    pub async fn subscription(
        &self,
        tenant_id: &str,
    ) -> Result<Option<Subscription>, RelaydeskError> {
        self.storage.get_subscription(tenant_id).await
    }

    /// Stops renewal at the end of the current period.
    pub async fn cancel(&self, tenant_id: &str) -> Result<Subscription, RelaydeskError> {
        let subscription = self
            .storage
            .cancel_subscription(tenant_id, self.clock.now())
            .await?;
        info!(
            tenant_id,
            period_end = %subscription.current_period_end,
            "subscription set to cancel at period end"
        );
        Ok(subscription)
    }
}
