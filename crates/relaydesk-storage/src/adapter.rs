// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use relaydesk_config::model::StorageConfig;
use relaydesk_core::types::{
    ContactSession, Conversation, ConversationStatus, Message, NewMessage, Page, PageRequest,
    PaymentIntent, Reconciliation, Subscription, TurnCommit, WidgetSettings,
};
use relaydesk_core::{AdapterType, HealthStatus, PluginAdapter, RelaydeskError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RelaydeskError> {
        self.db.get().ok_or_else(|| RelaydeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), RelaydeskError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaydeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelaydeskError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RelaydeskError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RelaydeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RelaydeskError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Contact sessions ---

    async fn create_contact_session(
        &self,
        session: &ContactSession,
    ) -> Result<(), RelaydeskError> {
        queries::contact_sessions::create(self.db()?, session).await
    }

    async fn get_contact_session(
        &self,
        id: &str,
    ) -> Result<Option<ContactSession>, RelaydeskError> {
        queries::contact_sessions::get(self.db()?, id).await
    }

    async fn extend_contact_session(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ContactSession, RelaydeskError> {
        queries::contact_sessions::extend(self.db()?, id, expires_at).await
    }

    // --- Conversations ---

    async fn create_conversation(
        &self,
        conversation: &Conversation,
        first_message: Option<NewMessage>,
    ) -> Result<Conversation, RelaydeskError> {
        queries::conversations::create(self.db()?, conversation, first_message).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RelaydeskError> {
        queries::conversations::get(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        tenant_id: &str,
        status: Option<ConversationStatus>,
        page: &PageRequest,
    ) -> Result<Page<Conversation>, RelaydeskError> {
        queries::conversations::list(self.db()?, tenant_id, status, page).await
    }

    async fn advance_conversation_status(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, RelaydeskError> {
        queries::conversations::advance_status(self.db()?, id, now).await
    }

    async fn commit_turn(&self, turn: TurnCommit) -> Result<Conversation, RelaydeskError> {
        queries::conversations::commit_turn(self.db()?, turn).await
    }

    // --- Message ledger ---

    async fn list_messages(
        &self,
        thread_id: &str,
        page: &PageRequest,
        exclude_tool_messages: bool,
    ) -> Result<Page<Message>, RelaydeskError> {
        queries::messages::list(self.db()?, thread_id, page, exclude_tool_messages).await
    }

    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: usize,
        exclude_tool_messages: bool,
    ) -> Result<Vec<Message>, RelaydeskError> {
        queries::messages::recent(self.db()?, thread_id, limit, exclude_tool_messages).await
    }

    async fn count_messages(
        &self,
        thread_id: &str,
        exclude_tool_messages: bool,
    ) -> Result<u64, RelaydeskError> {
        queries::messages::count(self.db()?, thread_id, exclude_tool_messages).await
    }

    // --- Payments and subscriptions ---

    async fn create_payment_intent(&self, intent: &PaymentIntent) -> Result<(), RelaydeskError> {
        queries::payments::create(self.db()?, intent).await
    }

    async fn get_payment_intent(
        &self,
        code: &str,
    ) -> Result<Option<PaymentIntent>, RelaydeskError> {
        queries::payments::get(self.db()?, code).await
    }

    async fn list_payment_intents(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<PaymentIntent>, RelaydeskError> {
        queries::payments::list(self.db()?, tenant_id).await
    }

    async fn fail_payment_intent(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> Result<PaymentIntent, RelaydeskError> {
        queries::payments::fail(self.db()?, tenant_id, code).await
    }

    async fn reconcile_payment(
        &self,
        code: &str,
        observed_amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Reconciliation, RelaydeskError> {
        queries::payments::reconcile(self.db()?, code, observed_amount, now).await
    }

    async fn get_subscription(
        &self,
        tenant_id: &str,
    ) -> Result<Option<Subscription>, RelaydeskError> {
        queries::subscriptions::get(self.db()?, tenant_id).await
    }

    async fn cancel_subscription(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, RelaydeskError> {
        queries::subscriptions::cancel(self.db()?, tenant_id, now).await
    }

    // --- Widget settings ---

    async fn upsert_widget_settings(
        &self,
        settings: &WidgetSettings,
    ) -> Result<(), RelaydeskError> {
        queries::widget_settings::upsert(self.db()?, settings).await
    }

    async fn get_widget_settings(
        &self,
        tenant_id: &str,
    ) -> Result<Option<WidgetSettings>, RelaydeskError> {
        queries::widget_settings::get(self.db()?, tenant_id).await
    }
}
