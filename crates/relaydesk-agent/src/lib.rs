// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation services and the AI support agent.
//!
//! Visitors authenticate with a short-lived contact session, start
//! conversations and send messages. The [`AgentOrchestrator`] decides whether
//! the AI answers a message or leaves it for a human operator, and commits
//! every turn atomically. Operators list, read, reply to and advance
//! conversations for their own tenant only.

pub mod conversations;
pub mod knowledge;
pub mod operator;
pub mod orchestrator;
pub mod prompt;
pub mod sessions;
pub mod tools;
pub mod watch;
pub mod widget;

pub use conversations::ConversationService;
pub use knowledge::NullKnowledgeBase;
pub use operator::OperatorService;
pub use orchestrator::{AgentOrchestrator, TurnDisposition, TurnOutcome};
pub use sessions::{SessionStore, VisitorInfo};
pub use tools::{SupportTool, ToolAllowList};
pub use watch::ConversationSnapshot;
pub use widget::{WidgetBootstrap, WidgetSettingsService, WidgetSettingsUpdate};
