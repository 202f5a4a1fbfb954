// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant widget settings and the public widget bootstrap.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use relaydesk_config::model::WidgetConfig;
use relaydesk_core::types::{OperatorIdentity, WidgetSettings};
use relaydesk_core::{Clock, RelaydeskError, StorageAdapter};

pub const MAX_SUGGESTIONS: usize = 3;

/// Operator-supplied replacement for a tenant's widget settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WidgetSettingsUpdate {
    pub greeting_message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

/// What the widget needs before a visitor signs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetBootstrap {
    pub tenant_id: String,
    pub greeting_message: String,
    pub suggestions: Vec<String>,
    pub theme: Option<String>,
    /// False when the tenant never saved settings and defaults are shown.
    pub customized: bool,
}

pub struct WidgetSettingsService {
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    default_greeting: String,
}

impl WidgetSettingsService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: &WidgetConfig,
    ) -> Self {
        Self {
            storage,
            clock,
            default_greeting: config.default_greeting.clone(),
        }
    }

    pub async fn get(
        &self,
        operator: &OperatorIdentity,
    ) -> Result<Option<WidgetSettings>, RelaydeskError> {
        self.storage.get_widget_settings(&operator.tenant_id).await
    }

    pub async fn upsert(
        &self,
        operator: &OperatorIdentity,
        update: WidgetSettingsUpdate,
    ) -> Result<WidgetSettings, RelaydeskError> {
        let greeting = update.greeting_message.trim();
        if greeting.is_empty() {
            return Err(RelaydeskError::Validation(
                "greeting message must not be empty".into(),
            ));
        }
        let suggestions: Vec<String> = update
            .suggestions
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if suggestions.len() > MAX_SUGGESTIONS {
            return Err(RelaydeskError::Validation(format!(
                "at most {MAX_SUGGESTIONS} suggestions are allowed, got {}",
                suggestions.len()
            )));
        }

        let settings = WidgetSettings {
            tenant_id: operator.tenant_id.clone(),
            greeting_message: greeting.to_string(),
            suggestions,
            theme: update.theme.filter(|t| !t.trim().is_empty()),
            updated_at: self.clock.now(),
        };
        self.storage.upsert_widget_settings(&settings).await?;
        info!(
            tenant_id = %operator.tenant_id,
            operator_id = %operator.operator_id,
            "widget settings saved"
        );
        Ok(settings)
    }

    pub async fn bootstrap(&self, tenant_id: &str) -> Result<WidgetBootstrap, RelaydeskError> {
        let bootstrap = match self.storage.get_widget_settings(tenant_id).await? {
            Some(settings) => WidgetBootstrap {
                tenant_id: settings.tenant_id,
                greeting_message: settings.greeting_message,
                suggestions: settings.suggestions,
                theme: settings.theme,
                customized: true,
            },
            None => WidgetBootstrap {
                tenant_id: tenant_id.to_string(),
                greeting_message: self.default_greeting.clone(),
                suggestions: Vec::new(),
                theme: None,
                customized: false,
            },
        };
        Ok(bootstrap)
    }

    /// Greeting saved as the first message of a new conversation.
    pub async fn greeting_for(&self, tenant_id: &str) -> Result<String, RelaydeskError> {
        Ok(self.bootstrap(tenant_id).await?.greeting_message)
    }
}
