// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visitor turn handling and the AI/human handoff.
//!
//! A visitor message is answered by the AI only while the conversation is
//! unresolved and the tenant's subscription is active; otherwise it is
//! stored for a human. Generation runs outside any transaction. Its tool
//! messages, reply and status effect are buffered and committed together
//! with the visitor's message in a single [`TurnCommit`].

use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use relaydesk_config::model::{AgentConfig, GroqConfig};
use relaydesk_core::traits::generator::{ChatMessage, GenerationRequest, ToolCall};
use relaydesk_core::types::{
    Conversation, ConversationStatus, MessageRole, NewMessage, StatusChange, TurnCommit,
};
use relaydesk_core::{Clock, KnowledgeBase, RelaydeskError, StorageAdapter, TextGenerator};

use crate::conversations::ensure_visitor_owns;
use crate::prompt;
use crate::sessions::SessionStore;
use crate::tools::{SearchArgs, SupportTool, ToolAllowList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TurnDisposition {
    /// The AI replied.
    Answered,
    /// Stored for a human; the AI was not eligible.
    Queued,
    /// The AI was eligible but produced no reply; the prompt was stored.
    GenerationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub disposition: TurnDisposition,
    pub status: ConversationStatus,
    pub reply: Option<String>,
}

/// Buffered result of a successful generation.
struct GeneratedTurn {
    tool_messages: Vec<NewMessage>,
    reply: String,
    explicit_status: Option<StatusChange>,
}

pub struct AgentOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    generator: Option<Arc<dyn TextGenerator>>,
    knowledge: Arc<dyn KnowledgeBase>,
    sessions: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    config: AgentConfig,
    max_tokens: Option<u32>,
}

impl AgentOrchestrator {
    /// Without a generator every eligible turn degrades to
    /// [`TurnDisposition::GenerationFailed`].
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        generator: Option<Arc<dyn TextGenerator>>,
        knowledge: Arc<dyn KnowledgeBase>,
        sessions: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        config: AgentConfig,
    ) -> Self {
        Self {
            storage,
            generator,
            knowledge,
            sessions,
            clock,
            config,
            max_tokens: None,
        }
    }

    pub fn with_generation_limits(mut self, groq: &GroqConfig) -> Self {
        self.max_tokens = Some(groq.max_tokens);
        self
    }

    pub async fn send_visitor_message(
        &self,
        session_id: &str,
        conversation_id: &str,
        prompt: &str,
    ) -> Result<TurnOutcome, RelaydeskError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RelaydeskError::Validation("message must not be empty".into()));
        }

        let session = self.sessions.validate(session_id).await?;
        let conversation = self
            .storage
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| RelaydeskError::not_found("conversation", conversation_id))?;
        ensure_visitor_owns(&session, &conversation)?;
        if conversation.status == ConversationStatus::Resolved {
            return Err(RelaydeskError::ConversationClosed {
                conversation_id: conversation.id,
            });
        }
        self.sessions.refresh(session_id).await?;

        let user_message = NewMessage::new(MessageRole::User, prompt, self.clock.now());

        if !self.is_eligible(&conversation).await? {
            let updated = self
                .commit(&conversation, vec![user_message], StatusChange::Keep)
                .await?;
            info!(
                conversation_id = %updated.id,
                status = %updated.status,
                "visitor message queued for a human"
            );
            return Ok(TurnOutcome {
                disposition: TurnDisposition::Queued,
                status: updated.status,
                reply: None,
            });
        }

        match self.generate(&conversation, prompt).await {
            Ok(turn) => {
                let status = match turn.explicit_status {
                    Some(change) => change,
                    None if self.config.handoff_after_reply => StatusChange::EscalateIfUnresolved,
                    None => StatusChange::Keep,
                };
                let replied_at = self.clock.now().max(user_message.created_at);
                let mut messages = Vec::with_capacity(turn.tool_messages.len() + 2);
                messages.push(user_message);
                messages.extend(turn.tool_messages);
                messages.push(
                    NewMessage::new(MessageRole::Assistant, turn.reply.clone(), replied_at)
                        .authored_by(self.config.name.clone()),
                );
                let updated = self.commit(&conversation, messages, status).await?;
                info!(
                    conversation_id = %updated.id,
                    status = %updated.status,
                    "agent replied"
                );
                Ok(TurnOutcome {
                    disposition: TurnDisposition::Answered,
                    status: updated.status,
                    reply: Some(turn.reply),
                })
            }
            Err(e) => {
                warn!(
                    conversation_id = %conversation.id,
                    error = %e,
                    "generation failed, leaving message for a human"
                );
                let updated = self
                    .commit(&conversation, vec![user_message], StatusChange::Keep)
                    .await?;
                Ok(TurnOutcome {
                    disposition: TurnDisposition::GenerationFailed,
                    status: updated.status,
                    reply: None,
                })
            }
        }
    }

    async fn is_eligible(&self, conversation: &Conversation) -> Result<bool, RelaydeskError> {
        if conversation.status != ConversationStatus::Unresolved {
            return Ok(false);
        }
        let active = self
            .storage
            .get_subscription(&conversation.tenant_id)
            .await?
            .is_some_and(|s| s.is_active_at(self.clock.now()));
        if !active {
            debug!(tenant_id = %conversation.tenant_id, "no active subscription, agent skipped");
        }
        Ok(active)
    }

    async fn commit(
        &self,
        conversation: &Conversation,
        messages: Vec<NewMessage>,
        status: StatusChange,
    ) -> Result<Conversation, RelaydeskError> {
        self.storage
            .commit_turn(TurnCommit {
                conversation_id: conversation.id.clone(),
                messages,
                status,
                now: self.clock.now(),
            })
            .await
    }

    /// Runs the bounded tool loop. Errors mean no reply was produced.
    async fn generate(
        &self,
        conversation: &Conversation,
        prompt: &str,
    ) -> Result<GeneratedTurn, RelaydeskError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| RelaydeskError::generation("no text generator configured"))?;

        let history = self
            .storage
            .recent_messages(&conversation.thread_id, self.config.history_limit, true)
            .await?;
        let mut transcript = prompt::history_to_chat(&history);
        transcript.push(ChatMessage::user(prompt));

        let allow = ToolAllowList::all();
        let system = prompt::system_prompt(&self.config.name, self.config.system_prompt.as_deref());
        let mut tool_messages = Vec::new();
        let mut explicit_status = None;

        for round in 0..=self.config.max_tool_rounds {
            let request = GenerationRequest {
                system: system.clone(),
                messages: transcript.clone(),
                tools: allow.definitions(),
                max_tokens: self.max_tokens,
            };
            let response = generator.generate(request).await?;

            if response.tool_calls.is_empty() {
                let reply = response
                    .text
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| RelaydeskError::generation("model returned an empty reply"))?;
                return Ok(GeneratedTurn {
                    tool_messages,
                    reply,
                    explicit_status,
                });
            }

            if round == self.config.max_tool_rounds {
                break;
            }

            transcript.push(ChatMessage::Assistant {
                content: response.text.clone(),
                tool_calls: response.tool_calls.clone(),
            });
            for call in &response.tool_calls {
                let (content, effect) = self.dispatch(&allow, conversation, call).await;
                debug!(
                    conversation_id = %conversation.id,
                    tool = %call.name,
                    round,
                    "tool call dispatched"
                );
                if let Some(effect) = effect {
                    explicit_status = Some(effect);
                }
                tool_messages.push(
                    NewMessage::new(MessageRole::Tool, content.clone(), self.clock.now())
                        .with_tool(call.name.clone()),
                );
                transcript.push(ChatMessage::Tool {
                    call_id: call.id.clone(),
                    content,
                });
            }
        }

        Err(RelaydeskError::generation(format!(
            "no reply after {} tool rounds",
            self.config.max_tool_rounds
        )))
    }

    /// Executes one tool call and returns its result text and status effect.
    async fn dispatch(
        &self,
        allow: &ToolAllowList,
        conversation: &Conversation,
        call: &ToolCall,
    ) -> (String, Option<StatusChange>) {
        let tool = match allow.resolve(&call.name) {
            Ok(tool) => tool,
            Err(refusal) => {
                warn!(
                    conversation_id = %conversation.id,
                    tool = %call.name,
                    "model requested a tool outside the allow-list"
                );
                return (refusal, None);
            }
        };

        match tool {
            SupportTool::ResolveConversation => (
                "Conversation resolved.".to_string(),
                Some(tool.status_effect()),
            ),
            SupportTool::EscalateConversation => (
                "Conversation escalated to a human operator.".to_string(),
                Some(tool.status_effect()),
            ),
            SupportTool::SearchKnowledge => {
                let args: SearchArgs = match serde_json::from_value(call.arguments.clone()) {
                    Ok(args) => args,
                    Err(e) => return (format!("Error: invalid arguments: {e}"), None),
                };
                let result = self
                    .knowledge
                    .search(&conversation.tenant_id, &args.query, self.config.search_limit)
                    .await;
                match result {
                    Ok(passages) => (prompt::format_passages(&passages), None),
                    Err(e) => {
                        warn!(
                            conversation_id = %conversation.id,
                            error = %e,
                            "knowledge search failed"
                        );
                        ("Error: the knowledge base is unavailable.".to_string(), None)
                    }
                }
            }
        }
    }
}
