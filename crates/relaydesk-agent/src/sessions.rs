// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anonymous visitor sessions.
//!
//! A contact session is the only credential a widget visitor holds. It lives
//! for `session.ttl_secs` and is pushed forward on every visitor message.

use std::sync::Arc;

use chrono::TimeDelta;
use serde::Deserialize;
use tracing::{debug, info};

use relaydesk_config::model::SessionConfig;
use relaydesk_core::types::{ContactSession, DeviceMetadata};
use relaydesk_core::{Clock, RelaydeskError, StorageAdapter};

/// Details the visitor types into the widget before chatting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VisitorInfo {
    pub name: String,
    pub email: String,
}

/// Ten years; keeps `now + ttl` far from the representable range.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

pub struct SessionStore {
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Self {
        let ttl = TimeDelta::seconds(config.ttl_secs.min(MAX_TTL_SECS) as i64);
        Self {
            storage,
            clock,
            ttl,
        }
    }

    pub async fn create(
        &self,
        tenant_id: &str,
        visitor: VisitorInfo,
        metadata: DeviceMetadata,
    ) -> Result<ContactSession, RelaydeskError> {
        if tenant_id.trim().is_empty() {
            return Err(RelaydeskError::Validation("tenant id is required".into()));
        }

        let now = self.clock.now();
        let session = ContactSession {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: visitor.name.trim().to_string(),
            email: visitor.email.trim().to_string(),
            metadata,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.storage.create_contact_session(&session).await?;
        info!(
            tenant_id,
            session_id = %session.id,
            expires_at = %session.expires_at,
            "contact session created"
        );
        Ok(session)
    }

    /// `NotFound` when unknown, `Expired` once `expires_at` has passed.
    pub async fn validate(&self, session_id: &str) -> Result<ContactSession, RelaydeskError> {
        let session = self
            .storage
            .get_contact_session(session_id)
            .await?
            .ok_or_else(|| RelaydeskError::not_found("contact session", session_id))?;
        if !session.is_valid_at(self.clock.now()) {
            return Err(RelaydeskError::Expired {
                session_id: session.id,
            });
        }
        Ok(session)
    }

    /// Pushes expiry to `now + ttl` unless it is already later.
    pub async fn refresh(&self, session_id: &str) -> Result<ContactSession, RelaydeskError> {
        let expires_at = self.clock.now() + self.ttl;
        let session = self
            .storage
            .extend_contact_session(session_id, expires_at)
            .await?;
        debug!(session_id, expires_at = %session.expires_at, "contact session refreshed");
        Ok(session)
    }
}
