// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation access for visitors and operators.
//!
//! Visitors reach a conversation through their contact session; operators
//! through their tenant. Every read checks ownership before returning data.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tracing::info;

use relaydesk_config::model::AgentConfig;
use relaydesk_core::types::{
    ContactSession, Conversation, ConversationStatus, ConversationWithContact, Message,
    MessageRole, NewMessage, OperatorIdentity, Page, PageRequest,
};
use relaydesk_core::{Clock, RelaydeskError, StorageAdapter};

use crate::sessions::SessionStore;
use crate::watch::{self, ConversationSnapshot};
use crate::widget::WidgetSettingsService;

pub struct ConversationService {
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    sessions: Arc<SessionStore>,
    widget: Arc<WidgetSettingsService>,
    agent_name: String,
    watch_interval: Duration,
}

impl ConversationService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        sessions: Arc<SessionStore>,
        widget: Arc<WidgetSettingsService>,
        config: &AgentConfig,
    ) -> Self {
        Self {
            storage,
            clock,
            sessions,
            widget,
            agent_name: config.name.clone(),
            watch_interval: Duration::from_millis(config.watch_interval_ms),
        }
    }

    // --- Visitor side ---

    /// Opens a conversation for the session's visitor, seeded with the
    /// tenant's greeting.
    pub async fn start(&self, session_id: &str) -> Result<Conversation, RelaydeskError> {
        let session = self.sessions.validate(session_id).await?;
        let greeting = self.widget.greeting_for(&session.tenant_id).await?;
        let now = self.clock.now();

        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: session.tenant_id.clone(),
            contact_session_id: session.id.clone(),
            thread_id: uuid::Uuid::new_v4().to_string(),
            status: ConversationStatus::Unresolved,
            last_message: None,
            created_at: now,
            updated_at: now,
        };
        let first = NewMessage::new(MessageRole::Assistant, greeting, now)
            .authored_by(self.agent_name.clone());
        let conversation = self
            .storage
            .create_conversation(&conversation, Some(first))
            .await?;
        info!(
            tenant_id = %conversation.tenant_id,
            conversation_id = %conversation.id,
            session_id,
            "conversation started"
        );
        Ok(conversation)
    }

    pub async fn get_for_visitor(
        &self,
        session_id: &str,
        conversation_id: &str,
    ) -> Result<Conversation, RelaydeskError> {
        let session = self.sessions.validate(session_id).await?;
        let conversation = self.load(conversation_id).await?;
        ensure_visitor_owns(&session, &conversation)?;
        Ok(conversation)
    }

    /// The visitor's feed; tool messages are never shown.
    pub async fn visitor_messages(
        &self,
        session_id: &str,
        conversation_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Message>, RelaydeskError> {
        let conversation = self.get_for_visitor(session_id, conversation_id).await?;
        self.storage
            .list_messages(&conversation.thread_id, page, true)
            .await
    }

    // --- Operator side ---

    /// Tenant conversations, newest first, each joined with its visitor.
    pub async fn list(
        &self,
        operator: &OperatorIdentity,
        status: Option<ConversationStatus>,
        page: &PageRequest,
    ) -> Result<Page<ConversationWithContact>, RelaydeskError> {
        let conversations = self
            .storage
            .list_conversations(&operator.tenant_id, status, page)
            .await?;

        let mut items = Vec::with_capacity(conversations.items.len());
        for conversation in conversations.items {
            let contact_session = self
                .storage
                .get_contact_session(&conversation.contact_session_id)
                .await?;
            items.push(ConversationWithContact {
                conversation,
                contact_session,
            });
        }
        Ok(Page {
            items,
            next_cursor: conversations.next_cursor,
            is_done: conversations.is_done,
        })
    }

    pub async fn get(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
    ) -> Result<ConversationWithContact, RelaydeskError> {
        let conversation = self.load_for_operator(operator, conversation_id).await?;
        let contact_session = self
            .storage
            .get_contact_session(&conversation.contact_session_id)
            .await?;
        Ok(ConversationWithContact {
            conversation,
            contact_session,
        })
    }

    pub async fn contact_session(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
    ) -> Result<ContactSession, RelaydeskError> {
        let conversation = self.load_for_operator(operator, conversation_id).await?;
        self.storage
            .get_contact_session(&conversation.contact_session_id)
            .await?
            .ok_or_else(|| {
                RelaydeskError::not_found("contact session", conversation.contact_session_id)
            })
    }

    /// Operator feed; tool messages are excluded like on the visitor side.
    pub async fn messages(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Message>, RelaydeskError> {
        let conversation = self.load_for_operator(operator, conversation_id).await?;
        self.storage
            .list_messages(&conversation.thread_id, page, true)
            .await
    }

    /// Steps `unresolved -> escalated -> resolved -> unresolved`.
    pub async fn advance_status(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
    ) -> Result<Conversation, RelaydeskError> {
        let before = self.load_for_operator(operator, conversation_id).await?;
        let after = self
            .storage
            .advance_conversation_status(conversation_id, self.clock.now())
            .await?;
        info!(
            tenant_id = %operator.tenant_id,
            operator_id = %operator.operator_id,
            conversation_id,
            from = %before.status,
            to = %after.status,
            "conversation status advanced"
        );
        Ok(after)
    }

    /// Polls the conversation and yields a snapshot whenever it changes.
    pub async fn watch(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
    ) -> Result<
        impl Stream<Item = Result<ConversationSnapshot, RelaydeskError>> + Send + 'static + use<>,
        RelaydeskError,
    > {
        let conversation = self.load_for_operator(operator, conversation_id).await?;
        Ok(watch::snapshots(
            self.storage.clone(),
            conversation.id,
            self.watch_interval,
        ))
    }

    pub(crate) async fn load_for_operator(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
    ) -> Result<Conversation, RelaydeskError> {
        load_for_operator(self.storage.as_ref(), operator, conversation_id).await
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, RelaydeskError> {
        self.storage
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| RelaydeskError::not_found("conversation", conversation_id))
    }
}

/// Loads a conversation, rejecting callers from another tenant.
pub(crate) async fn load_for_operator(
    storage: &dyn StorageAdapter,
    operator: &OperatorIdentity,
    conversation_id: &str,
) -> Result<Conversation, RelaydeskError> {
    let conversation = storage
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| RelaydeskError::not_found("conversation", conversation_id))?;
    if conversation.tenant_id != operator.tenant_id {
        return Err(RelaydeskError::Unauthorized(format!(
            "conversation {conversation_id} belongs to another tenant"
        )));
    }
    Ok(conversation)
}

/// The session must belong to the conversation's tenant and visitor.
pub(crate) fn ensure_visitor_owns(
    session: &ContactSession,
    conversation: &Conversation,
) -> Result<(), RelaydeskError> {
    if session.tenant_id != conversation.tenant_id || session.id != conversation.contact_session_id
    {
        return Err(RelaydeskError::Unauthorized(format!(
            "conversation {} is not owned by this session",
            conversation.id
        )));
    }
    Ok(())
}
