// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RelaydeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ContactSession, Conversation, ConversationStatus, Message, NewMessage, Page, PageRequest,
    PaymentIntent, Reconciliation, Subscription, TurnCommit, WidgetSettings,
};

/// Adapter for storage and persistence backends.
///
/// Every read-modify-write method is atomic as observed by concurrent callers.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RelaydeskError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RelaydeskError>;

    // --- Contact sessions ---

    async fn create_contact_session(&self, session: &ContactSession)
    -> Result<(), RelaydeskError>;

    async fn get_contact_session(&self, id: &str)
    -> Result<Option<ContactSession>, RelaydeskError>;

    /// Raises `expires_at` to `expires_at` if later; never lowers it.
    async fn extend_contact_session(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ContactSession, RelaydeskError>;

    // --- Conversations ---

    /// Inserts a conversation, optionally seeding its thread with one message.
    async fn create_conversation(
        &self,
        conversation: &Conversation,
        first_message: Option<NewMessage>,
    ) -> Result<Conversation, RelaydeskError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RelaydeskError>;

    /// Newest first, optionally filtered by status.
    async fn list_conversations(
        &self,
        tenant_id: &str,
        status: Option<ConversationStatus>,
        page: &PageRequest,
    ) -> Result<Page<Conversation>, RelaydeskError>;

    /// Moves the conversation one step along the operator status cycle.
    async fn advance_conversation_status(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, RelaydeskError>;

    /// Appends messages and applies the status effect in one transaction.
    ///
    /// Fails with `ConversationClosed` if the conversation is resolved when
    /// the transaction starts.
    async fn commit_turn(&self, turn: TurnCommit) -> Result<Conversation, RelaydeskError>;

    // --- Message ledger ---

    /// Oldest first, ties broken by insertion sequence.
    async fn list_messages(
        &self,
        thread_id: &str,
        page: &PageRequest,
        exclude_tool_messages: bool,
    ) -> Result<Page<Message>, RelaydeskError>;

    /// The most recent `limit` messages, returned oldest first.
    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: usize,
        exclude_tool_messages: bool,
    ) -> Result<Vec<Message>, RelaydeskError>;

    async fn count_messages(
        &self,
        thread_id: &str,
        exclude_tool_messages: bool,
    ) -> Result<u64, RelaydeskError>;

    // --- Payments and subscriptions ---

    /// Fails with `AlreadyExists` if the code is taken.
    async fn create_payment_intent(&self, intent: &PaymentIntent) -> Result<(), RelaydeskError>;

    async fn get_payment_intent(&self, code: &str)
    -> Result<Option<PaymentIntent>, RelaydeskError>;

    async fn list_payment_intents(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<PaymentIntent>, RelaydeskError>;

    /// Marks a pending intent failed.
    async fn fail_payment_intent(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> Result<PaymentIntent, RelaydeskError>;

    /// Settles the intent with this code and applies its subscription effect.
    ///
    /// Idempotent: an already-settled intent returns `applied: false` and
    /// writes nothing.
    async fn reconcile_payment(
        &self,
        code: &str,
        observed_amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Reconciliation, RelaydeskError>;

    async fn get_subscription(&self, tenant_id: &str)
    -> Result<Option<Subscription>, RelaydeskError>;

    /// Sets `cancel_at_period_end`; status and period are untouched.
    async fn cancel_subscription(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, RelaydeskError>;

    // --- Widget settings ---

    async fn upsert_widget_settings(&self, settings: &WidgetSettings)
    -> Result<(), RelaydeskError>;

    async fn get_widget_settings(
        &self,
        tenant_id: &str,
    ) -> Result<Option<WidgetSettings>, RelaydeskError>;
}
