// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The support agent's closed tool set.
//!
//! The model sees each tool as a JSON-schema function definition. A call is
//! only executed when its name parses to a [`SupportTool`] that is present in
//! the turn's [`ToolAllowList`]; anything else becomes an error tool result.

use serde::Deserialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use relaydesk_core::traits::generator::ToolDefinition;
use relaydesk_core::types::{ConversationStatus, StatusChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SupportTool {
    ResolveConversation,
    EscalateConversation,
    SearchKnowledge,
}

/// Arguments of `search_knowledge`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

impl SupportTool {
    pub fn description(self) -> &'static str {
        match self {
            Self::ResolveConversation => {
                "Mark the conversation as resolved when the customer's issue is fully \
                 answered or the customer says they are done."
            }
            Self::EscalateConversation => {
                "Hand the conversation to a human operator when the customer asks for a \
                 person, is frustrated, or the question cannot be answered from the \
                 knowledge base."
            }
            Self::SearchKnowledge => {
                "Search the company knowledge base for information relevant to the \
                 customer's question."
            }
        }
    }

    pub fn input_schema(self) -> serde_json::Value {
        match self {
            Self::ResolveConversation | Self::EscalateConversation => serde_json::json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            Self::SearchKnowledge => serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look up, phrased as a search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Status effect of a successful call.
    pub fn status_effect(self) -> StatusChange {
        match self {
            Self::ResolveConversation => StatusChange::Set(ConversationStatus::Resolved),
            Self::EscalateConversation => StatusChange::Set(ConversationStatus::Escalated),
            Self::SearchKnowledge => StatusChange::Keep,
        }
    }
}

/// Tools the model may call during one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAllowList {
    tools: Vec<SupportTool>,
}

impl ToolAllowList {
    /// Every support tool; the standard visitor turn.
    pub fn all() -> Self {
        Self {
            tools: SupportTool::iter().collect(),
        }
    }

    pub fn only(tools: &[SupportTool]) -> Self {
        Self {
            tools: tools.to_vec(),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Maps a requested name to an allowed tool, or the error text returned
    /// to the model instead of executing it.
    pub fn resolve(&self, name: &str) -> Result<SupportTool, String> {
        match name.parse::<SupportTool>() {
            Ok(tool) if self.tools.contains(&tool) => Ok(tool),
            Ok(_) => Err(format!("Error: tool `{name}` is not available in this turn.")),
            Err(_) => Err(format!("Error: unknown tool `{name}`.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_cover_the_three_tools() {
        let defs = ToolAllowList::all().definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["resolve_conversation", "escalate_conversation", "search_knowledge"]
        );
        assert_eq!(defs[2].input_schema["required"][0], "query");
        assert_eq!(defs[0].input_schema["type"], "object");
    }

    #[test]
    fn unknown_and_disallowed_tools_are_refused() {
        let list = ToolAllowList::only(&[SupportTool::SearchKnowledge]);
        assert_eq!(list.resolve("search_knowledge"), Ok(SupportTool::SearchKnowledge));
        assert!(list.resolve("resolve_conversation").unwrap_err().contains("not available"));
        assert!(list.resolve("delete_everything").unwrap_err().contains("unknown tool"));
    }

    #[test]
    fn status_effects_match_tool_intent() {
        assert_eq!(
            SupportTool::ResolveConversation.status_effect(),
            StatusChange::Set(ConversationStatus::Resolved)
        );
        assert_eq!(
            SupportTool::EscalateConversation.status_effect(),
            StatusChange::Set(ConversationStatus::Escalated)
        );
        assert_eq!(SupportTool::SearchKnowledge.status_effect(), StatusChange::Keep);
    }

    #[test]
    fn search_args_require_a_query() {
        assert!(serde_json::from_value::<SearchArgs>(serde_json::json!({})).is_err());
        let args: SearchArgs =
            serde_json::from_value(serde_json::json!({"query": "refunds"})).unwrap();
        assert_eq!(args.query, "refunds");
    }
}
