// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaydesk support desk.

use thiserror::Error;

/// The primary error type used across all Relaydesk services and adapters.
#[derive(Debug, Error)]
pub enum RelaydeskError {
    /// Session or operator identity missing, or tenant mismatch.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A conversation, session, payment intent or subscription does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The contact session is past its expiry.
    #[error("contact session {session_id} has expired")]
    Expired { session_id: String },

    /// A message write was attempted on a resolved conversation.
    #[error("conversation {conversation_id} is resolved")]
    ConversationClosed { conversation_id: String },

    /// The transferred amount does not equal the payment intent amount.
    #[error("amount mismatch for payment {code}: expected {expected}, observed {observed}")]
    AmountMismatch {
        code: String,
        expected: i64,
        observed: i64,
    },

    /// A record with the same unique key already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The external text generator failed or produced no reply.
    #[error("generation failed: {message}")]
    GenerationFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed caller input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelaydeskError {
    /// Shorthand for [`RelaydeskError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a [`RelaydeskError::GenerationFailed`] without a source.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// True for errors that are the caller's fault and must not be retried.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::NotFound { .. }
                | Self::Expired { .. }
                | Self::ConversationClosed { .. }
                | Self::Validation(_)
        )
    }
}
