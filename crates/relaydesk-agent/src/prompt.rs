// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt text and transcript assembly for the support agent.

use relaydesk_core::traits::generator::ChatMessage;
use relaydesk_core::traits::knowledge::Passage;
use relaydesk_core::types::{Message, MessageRole};

pub const SUPPORT_AGENT_PROMPT: &str = "\
You are a customer support assistant embedded in a company's website chat.

Answer briefly and politely in the customer's language. Before answering a \
product or policy question, call `search_knowledge` and base your answer only \
on what it returns. Never invent prices, policies or features.

Call `escalate_conversation` when the customer asks for a human, is upset, or \
the knowledge base has no answer, and tell the customer a team member will \
follow up. Call `resolve_conversation` when the customer confirms their issue \
is solved or says goodbye.";

pub const ENHANCEMENT_PROMPT: &str = "\
You polish replies written by customer support operators. Rewrite the draft \
to be clear, friendly and professional while keeping its meaning, facts and \
language. Do not add information, greetings or signatures the draft does not \
contain. Reply with the rewritten message only.";

/// The system prompt for a turn: the configured prompt or the built-in one,
/// with the agent's display name.
pub fn system_prompt(agent_name: &str, configured: Option<&str>) -> String {
    let body = configured
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(SUPPORT_AGENT_PROMPT);
    format!("Your name is {agent_name}.\n\n{body}")
}

/// Converts stored history into chat turns. Tool messages are skipped.
pub fn history_to_chat(history: &[Message]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::User => Some(ChatMessage::user(m.text.clone())),
            MessageRole::Assistant => Some(ChatMessage::assistant(m.text.clone())),
            MessageRole::Tool => None,
        })
        .collect()
}

/// Tool result text for a knowledge search.
pub fn format_passages(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return "No relevant information was found in the knowledge base.".to_string();
    }
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| match &p.title {
            Some(title) => format!("[{}] {title}\n{}", i + 1, p.text),
            None => format!("[{}] {}", i + 1, p.text),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
