use serde::{Deserialize, Serialize};
use std::fmt;

/// The three persisted record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Contact,
    InteractionLog,
    FollowUpTask,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::InteractionLog => "interaction_log",
            Self::FollowUpTask => "follow_up_task",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::InteractionLog => "interaction",
            Self::FollowUpTask => "task",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
