// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opaque keyset cursors: `<created_at millis>.<tiebreaker>`.

use relaydesk_core::RelaydeskError;

/// Position after which a page resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub created_ms: i64,
    pub tiebreak: String,
}

impl Cursor {
    pub fn new(created_ms: i64, tiebreak: impl Into<String>) -> Self {
        Self {
            created_ms,
            tiebreak: tiebreak.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}.{}", self.created_ms, self.tiebreak)
    }

    pub fn decode(raw: &str) -> Result<Self, RelaydeskError> {
        let invalid = || RelaydeskError::Validation(format!("invalid cursor `{raw}`"));
        let (ms, tiebreak) = raw.split_once('.').ok_or_else(invalid)?;
        if tiebreak.is_empty() {
            return Err(invalid());
        }
        let created_ms = ms.parse().map_err(|_| invalid())?;
        Ok(Self::new(created_ms, tiebreak))
    }

    /// Decodes the tiebreaker as a message sequence number.
    pub fn seq(&self) -> Result<i64, RelaydeskError> {
        self.tiebreak.parse().map_err(|_| {
            RelaydeskError::Validation(format!("invalid cursor `{}`", self.encode()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_it_encodes() {
        let cursor = Cursor::new(1_700_000_000_123, "42");
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
        assert_eq!(cursor.seq().unwrap(), 42);
    }

    #[test]
    fn uuid_tiebreakers_survive() {
        let cursor = Cursor::new(5, "3f2b-aa.x");
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn garbage_is_a_validation_error() {
        for raw in ["", "abc", "12.", "x.1"] {
            assert!(matches!(
                Cursor::decode(raw),
                Err(RelaydeskError::Validation(_))
            ));
        }
    }
}
