use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::{CrmError, Result};
use crate::models::{collect_tags, Contact, ContactDetail, NewContact, RecordKind, TagSet};
use crate::query::ContactFilter;

const CONTACT_COLUMNS: &str = "id, name, email, phone, tags, notes, created_at";

impl Database {
    // ==================== CONTACT CREATE ====================

    pub fn insert_contact(&self, contact: &NewContact, created_at: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            r#"INSERT INTO contact (name, email, phone, tags, notes, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                contact.name,
                contact.email,
                contact.phone,
                contact.tags,
                contact.notes,
                format_timestamp(created_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ==================== CONTACT READ ====================

    pub fn get_contact(&self, id: i64) -> Result<Contact> {
        let sql = format!("SELECT {} FROM contact WHERE id = ?", CONTACT_COLUMNS);
        self.conn
            .query_row(&sql, [id], Self::row_to_contact)
            .optional()?
            .ok_or_else(|| CrmError::not_found(RecordKind::Contact, id))
    }

    /// Contacts matching `filter`, newest first. Ties on `created_at` fall
    /// back to the higher id first.
    pub fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let (where_sql, patterns) = match filter.where_clause() {
            Some((clause, patterns)) => (format!("WHERE {}", clause), patterns),
            None => (String::new(), Vec::new()),
        };

        let sql = format!(
            "SELECT {} FROM contact {} ORDER BY created_at DESC, id DESC",
            CONTACT_COLUMNS, where_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(rusqlite::params_from_iter(patterns.iter()), Self::row_to_contact)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(contacts)
    }

    /// Every distinct tag across all contacts, regardless of any filter
    pub fn all_tags(&self) -> Result<TagSet> {
        let mut stmt = self.conn.prepare("SELECT tags FROM contact")?;
        let fields = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(collect_tags(fields.iter().map(String::as_str)))
    }

    pub fn count_contacts(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contact", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get a contact together with its logs and tasks
    pub fn get_contact_detail(&self, id: i64) -> Result<ContactDetail> {
        let contact = self.get_contact(id)?;
        let interactions = self.interactions_for_contact(id)?;
        let tasks = self.tasks_for_contact(id)?;

        Ok(ContactDetail {
            contact,
            interactions,
            tasks,
        })
    }

    // ==================== CONTACT DELETE ====================

    /// Hard delete a contact and all related records (via CASCADE).
    pub fn delete_contact(&self, id: i64) -> Result<()> {
        self.delete_record(RecordKind::Contact, id)
    }

    fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
        let created_at: String = row.get(6)?;
        Ok(Contact {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            tags: row.get(4)?,
            notes: row.get(5)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
