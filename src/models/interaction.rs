use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-text entry logged against a contact. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionLog {
    pub id: i64,
    pub contact_id: i64,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl InteractionLog {
    /// True when the note has something other than whitespace in it
    pub fn is_loggable(note: &str) -> bool {
        !note.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_loggable() {
        assert!(InteractionLog::is_loggable("called, left voicemail"));
        assert!(InteractionLog::is_loggable("  x  "));
        assert!(!InteractionLog::is_loggable(""));
        assert!(!InteractionLog::is_loggable(" \t\n "));
    }
}
