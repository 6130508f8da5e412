use serde::{Deserialize, Serialize};

use super::{Contact, FollowUpTask, InteractionLog, TagSet};

/// Full contact detail - a contact with its logs and tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetail {
    pub contact: Contact,
    /// Newest first
    pub interactions: Vec<InteractionLog>,
    /// Open tasks first, then by due date
    pub tasks: Vec<FollowUpTask>,
}

impl ContactDetail {
    pub fn open_tasks(&self) -> impl Iterator<Item = &FollowUpTask> {
        self.tasks.iter().filter(|t| !t.completed)
    }
}

/// Result of a listing query: filtered contacts plus every known tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactListing {
    pub contacts: Vec<Contact>,
    pub tags: TagSet,
}
