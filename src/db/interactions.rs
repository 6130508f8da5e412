use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database};
use crate::error::{CrmError, Result};
use crate::models::{InteractionLog, RecordKind};

impl Database {
    /// Append a log entry. Fails with `ConstraintViolation` when the contact
    /// does not exist.
    pub fn insert_interaction(
        &self,
        contact_id: i64,
        note: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO interaction_log (contact_id, note, timestamp) VALUES (?, ?, ?)",
            params![contact_id, note, format_timestamp(timestamp)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_interaction(&self, id: i64) -> Result<InteractionLog> {
        self.conn
            .query_row(
                "SELECT id, contact_id, note, timestamp FROM interaction_log WHERE id = ?",
                [id],
                Self::row_to_interaction,
            )
            .optional()?
            .ok_or_else(|| CrmError::not_found(RecordKind::InteractionLog, id))
    }

    /// Log entries for a contact, most recent first
    pub fn interactions_for_contact(&self, contact_id: i64) -> Result<Vec<InteractionLog>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, contact_id, note, timestamp FROM interaction_log
               WHERE contact_id = ?
               ORDER BY timestamp DESC, id DESC"#,
        )?;

        let logs = stmt
            .query_map([contact_id], Self::row_to_interaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }

    fn row_to_interaction(row: &Row) -> rusqlite::Result<InteractionLog> {
        let timestamp: String = row.get(3)?;
        Ok(InteractionLog {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            note: row.get(2)?,
            timestamp: parse_timestamp(&timestamp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContact;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 13, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_and_get_interaction() {
        let db = Database::open_memory().unwrap();
        let contact_id = db.insert_contact(&NewContact::new("Ann"), t0()).unwrap();

        let id = db.insert_interaction(contact_id, "Lunch at noon", t0()).unwrap();
        let log = db.get_interaction(id).unwrap();

        assert_eq!(log.contact_id, contact_id);
        assert_eq!(log.note, "Lunch at noon");
        assert_eq!(log.timestamp, t0());
    }

    #[test]
    fn test_orphan_interaction_is_rejected() {
        let db = Database::open_memory().unwrap();
        let err = db.insert_interaction(404, "nobody home", t0()).unwrap_err();
        assert!(matches!(err, CrmError::ConstraintViolation(_)));
    }

    #[test]
    fn test_interactions_newest_first() {
        let db = Database::open_memory().unwrap();
        let ann = db.insert_contact(&NewContact::new("Ann"), t0()).unwrap();
        let ben = db.insert_contact(&NewContact::new("Ben"), t0()).unwrap();

        db.insert_interaction(ann, "older", t0()).unwrap();
        db.insert_interaction(ann, "newer", t0() + Duration::hours(1)).unwrap();
        db.insert_interaction(ben, "other contact", t0()).unwrap();

        let logs = db.interactions_for_contact(ann).unwrap();
        let notes: Vec<&str> = logs.iter().map(|l| l.note.as_str()).collect();
        assert_eq!(notes, vec!["newer", "older"]);
    }
}
