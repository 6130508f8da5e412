use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tag::parse_tags;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Comma-separated labels, stored exactly as entered
    pub tags: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Parsed tag labels in entry order (duplicates kept)
    pub fn tag_list(&self) -> Vec<&str> {
        parse_tags(&self.tags).collect()
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "(unnamed)"
        } else {
            &self.name
        }
    }
}

/// Field values for a contact that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tags: String,
    pub notes: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn into_contact(self, id: i64, created_at: DateTime<Utc>) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            tags: self.tags,
            notes: self.notes,
            created_at,
        }
    }
}
