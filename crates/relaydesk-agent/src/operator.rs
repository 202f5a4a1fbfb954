// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator replies and draft enhancement.

use std::sync::Arc;

use tracing::info;

use relaydesk_core::traits::generator::{ChatMessage, GenerationRequest};
use relaydesk_core::types::{
    Conversation, MessageRole, NewMessage, OperatorIdentity, StatusChange, TurnCommit,
};
use relaydesk_core::{Clock, RelaydeskError, StorageAdapter, TextGenerator};

use crate::conversations::load_for_operator;
use crate::prompt::ENHANCEMENT_PROMPT;

pub struct OperatorService {
    storage: Arc<dyn StorageAdapter>,
    generator: Option<Arc<dyn TextGenerator>>,
    clock: Arc<dyn Clock>,
}

impl OperatorService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        generator: Option<Arc<dyn TextGenerator>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            generator,
            clock,
        }
    }

    /// Posts an assistant message under the operator's name. An unresolved
    /// conversation becomes escalated in the same write.
    pub async fn reply(
        &self,
        operator: &OperatorIdentity,
        conversation_id: &str,
        text: &str,
    ) -> Result<Conversation, RelaydeskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RelaydeskError::Validation("reply must not be empty".into()));
        }
        load_for_operator(self.storage.as_ref(), operator, conversation_id).await?;

        let now = self.clock.now();
        let message = NewMessage::new(MessageRole::Assistant, text, now)
            .authored_by(operator.display_name.clone());
        let conversation = self
            .storage
            .commit_turn(TurnCommit {
                conversation_id: conversation_id.to_string(),
                messages: vec![message],
                status: StatusChange::EscalateIfUnresolved,
                now,
            })
            .await?;
        info!(
            tenant_id = %operator.tenant_id,
            operator_id = %operator.operator_id,
            conversation_id,
            status = %conversation.status,
            "operator replied"
        );
        Ok(conversation)
    }

    /// Rewrites a draft reply. Touches no conversation.
    pub async fn enhance_response(
        &self,
        operator: &OperatorIdentity,
        draft: &str,
    ) -> Result<String, RelaydeskError> {
        let draft = draft.trim();
        if draft.is_empty() {
            return Err(RelaydeskError::Validation("draft must not be empty".into()));
        }
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| RelaydeskError::generation("no text generator configured"))?;

        let response = generator
            .generate(GenerationRequest {
                system: ENHANCEMENT_PROMPT.to_string(),
                messages: vec![ChatMessage::user(draft)],
                tools: Vec::new(),
                max_tokens: None,
            })
            .await?;
        let enhanced = response
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RelaydeskError::generation("model returned an empty rewrite"))?;
        info!(operator_id = %operator.operator_id, "draft enhanced");
        Ok(enhanced)
    }
}
