//! Command handlers and the contact listing query.
//!
//! Every operation runs in exactly one store transaction, so a command and
//! its side effects (such as a cascading delete) either all apply or none do.

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::db::Database;
use crate::error::{CrmError, Result};
use crate::models::{ContactDetail, ContactListing, InteractionLog, NewContact, RecordKind, TagSet};
use crate::query::ContactFilter;

/// CRM operations over an injected store and clock.
pub struct CrmService<'a, C: Clock = SystemClock> {
    db: &'a Database,
    clock: C,
}

impl<'a> CrmService<'a, SystemClock> {
    pub fn new(db: &'a Database) -> Self {
        Self::with_clock(db, SystemClock)
    }
}

impl<'a, C: Clock> CrmService<'a, C> {
    pub fn with_clock(db: &'a Database, clock: C) -> Self {
        Self { db, clock }
    }

    // ==================== QUERIES ====================

    /// Filtered contacts (newest first) plus the tag set of all contacts.
    pub fn listing(&self, search: Option<&str>, tag: Option<&str>) -> Result<ContactListing> {
        let filter = ContactFilter::new(search, tag);
        self.db.read(|db| {
            let contacts = db.list_contacts(&filter)?;
            let tags = db.all_tags()?;
            log::debug!(
                "Listed {} contact(s) (search={:?}, tag={:?})",
                contacts.len(),
                filter.search(),
                filter.tag()
            );
            Ok(ContactListing { contacts, tags })
        })
    }

    pub fn all_tags(&self) -> Result<TagSet> {
        self.db.all_tags()
    }

    pub fn contact_detail(&self, id: i64) -> Result<ContactDetail> {
        self.db.read(|db| db.get_contact_detail(id))
    }

    // ==================== COMMANDS ====================

    pub fn add_contact(&self, contact: NewContact) -> Result<i64> {
        let created_at = self.clock.now();
        let id = self
            .db
            .transaction(|db| db.insert_contact(&contact, created_at))?;
        log::info!("Added contact {} ({})", id, contact.name);
        Ok(id)
    }

    /// Delete a contact with all of its logs and tasks.
    pub fn delete_contact(&self, id: i64) -> Result<()> {
        self.db.transaction(|db| db.delete_contact(id))?;
        log::info!("Deleted contact {}", id);
        Ok(())
    }

    /// Log a note against a contact. A blank note is accepted and ignored:
    /// returns `Ok(None)` without writing anything.
    pub fn add_note(&self, contact_id: i64, note: &str) -> Result<Option<i64>> {
        let timestamp = self.clock.now();
        let id = self.db.transaction(|db| {
            require(db, RecordKind::Contact, contact_id)?;
            if !InteractionLog::is_loggable(note) {
                return Ok(None);
            }
            db.insert_interaction(contact_id, note, timestamp).map(Some)
        })?;

        match id {
            Some(id) => log::info!("Logged interaction {} for contact {}", id, contact_id),
            None => log::debug!("Ignored blank note for contact {}", contact_id),
        }
        Ok(id)
    }

    pub fn add_task(&self, contact_id: i64, task: &str, due_date: Option<NaiveDate>) -> Result<i64> {
        let id = self.db.transaction(|db| {
            require(db, RecordKind::Contact, contact_id)?;
            db.insert_task(contact_id, task, due_date)
        })?;
        log::info!("Added task {} for contact {}", id, contact_id);
        Ok(id)
    }

    /// Mark a task completed. Completing an already completed task is fine.
    pub fn complete_task(&self, task_id: i64) -> Result<()> {
        self.db.transaction(|db| {
            let mut task = db.get_task(task_id)?;
            if task.completed {
                return Ok(());
            }
            task.complete();
            db.update_task(&task)
        })?;
        log::info!("Completed task {}", task_id);
        Ok(())
    }

    pub fn delete_task(&self, task_id: i64) -> Result<()> {
        self.db.transaction(|db| db.delete_task(task_id))?;
        log::info!("Deleted task {}", task_id);
        Ok(())
    }
}

fn require(db: &Database, kind: RecordKind, id: i64) -> Result<()> {
    if db.exists(kind, id)? {
        Ok(())
    } else {
        Err(CrmError::not_found(kind, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 4, 13, 12, 0, 0).unwrap())
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_add_contact_uses_clock() {
        let db = Database::open_memory().unwrap();
        let clock = clock();
        let crm = CrmService::with_clock(&db, &clock);

        let id = crm.add_contact(NewContact::new("Ada")).unwrap();
        assert_eq!(db.get_contact(id).unwrap().created_at, clock.now());
    }

    #[test]
    fn test_listing_newest_first() {
        let db = Database::open_memory().unwrap();
        let clock = clock();
        let crm = CrmService::with_clock(&db, &clock);

        let older = crm.add_contact(NewContact::new("Older")).unwrap();
        clock.advance(Duration::seconds(1));
        let newer = crm.add_contact(NewContact::new("Newer")).unwrap();

        let listing = crm.listing(None, None).unwrap();
        let ids: Vec<i64> = listing.contacts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[test]
    fn test_listing_search_is_case_insensitive() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        crm.add_contact(NewContact::new("ACME Corp")).unwrap();
        crm.add_contact(NewContact::new("Zed").with_email("zed@Acme.com")).unwrap();
        crm.add_contact(NewContact::new("Yan").with_tags("friend, ACME")).unwrap();
        crm.add_contact(NewContact::new("Xi").with_notes("acme in notes only")).unwrap();

        let listing = crm.listing(Some("acme"), None).unwrap();
        assert_eq!(listing.contacts.len(), 3);
        assert!(listing.contacts.iter().all(|c| c.name != "Xi"));
    }

    #[test]
    fn test_listing_search_and_tag_intersect() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        crm.add_contact(NewContact::new("Acme Lead").with_tags("lead")).unwrap();
        crm.add_contact(NewContact::new("Acme Other").with_tags("vendor")).unwrap();
        crm.add_contact(NewContact::new("Not Them").with_tags("lead")).unwrap();

        let listing = crm.listing(Some("acme"), Some("lead")).unwrap();
        let names: Vec<&str> = listing.contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Lead"]);
    }

    #[test]
    fn test_listing_tags_cover_all_contacts() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        crm.add_contact(NewContact::new("A").with_tags("vip, lead")).unwrap();
        crm.add_contact(NewContact::new("B").with_tags("lead,  ")).unwrap();

        let listing = crm.listing(Some("no such contact"), None).unwrap();
        assert!(listing.contacts.is_empty());

        let expected: TagSet = ["vip", "lead"].iter().map(|s| s.to_string()).collect();
        assert_eq!(listing.tags, expected);
        assert_eq!(crm.all_tags().unwrap(), expected);
    }

    #[test]
    fn test_delete_contact_cascades() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Parent")).unwrap();
        let keep = crm.add_contact(NewContact::new("Sibling")).unwrap();
        crm.add_note(keep, "unrelated").unwrap();

        let logs: Vec<i64> = (0..2)
            .map(|i| crm.add_note(id, &format!("note {}", i)).unwrap().unwrap())
            .collect();
        let tasks: Vec<i64> = (0..3)
            .map(|i| crm.add_task(id, &format!("task {}", i), None).unwrap())
            .collect();

        crm.delete_contact(id).unwrap();

        for log_id in logs {
            assert!(db.get_interaction(log_id).unwrap_err().is_not_found());
        }
        for task_id in tasks {
            assert!(db.get_task(task_id).unwrap_err().is_not_found());
        }
        assert_eq!(count(&db, "interaction_log"), 1);
        assert_eq!(count(&db, "follow_up_task"), 0);
    }

    #[test]
    fn test_delete_missing_contact_is_not_found_and_changes_nothing() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Stays")).unwrap();
        crm.add_task(id, "still here", None).unwrap();

        let err = crm.delete_contact(999).unwrap_err();
        assert!(matches!(
            err,
            CrmError::NotFound { kind: RecordKind::Contact, id: 999 }
        ));
        assert_eq!(count(&db, "contact"), 1);
        assert_eq!(count(&db, "follow_up_task"), 1);
    }

    #[test]
    fn test_add_note() {
        let db = Database::open_memory().unwrap();
        let clock = clock();
        let crm = CrmService::with_clock(&db, &clock);

        let id = crm.add_contact(NewContact::new("Ann")).unwrap();
        let log_id = crm.add_note(id, "  coffee chat  ").unwrap().unwrap();

        let log = db.get_interaction(log_id).unwrap();
        assert_eq!(log.note, "  coffee chat  ");
        assert_eq!(log.timestamp, clock.now());
    }

    #[test]
    fn test_blank_note_is_a_no_op() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Ann")).unwrap();
        assert_eq!(crm.add_note(id, "   ").unwrap(), None);
        assert_eq!(crm.add_note(id, "").unwrap(), None);
        assert_eq!(count(&db, "interaction_log"), 0);
    }

    #[test]
    fn test_note_for_missing_contact_is_not_found() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        assert!(crm.add_note(12, "hello").unwrap_err().is_not_found());
        assert!(crm.add_note(12, "   ").unwrap_err().is_not_found());
    }

    #[test]
    fn test_add_task_without_due_date() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Cal")).unwrap();
        let task_id = crm.add_task(id, "call back", None).unwrap();

        let task = db.get_task(task_id).unwrap();
        assert_eq!(task.task, "call back");
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
    }

    #[test]
    fn test_add_task_for_missing_contact_is_not_found() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let err = crm.add_task(55, "orphan", None).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(count(&db, "follow_up_task"), 0);
    }

    #[test]
    fn test_complete_task_twice() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Dee")).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 6, 1);
        let task_id = crm.add_task(id, "renewal", due).unwrap();

        crm.complete_task(task_id).unwrap();
        crm.complete_task(task_id).unwrap();

        let task = db.get_task(task_id).unwrap();
        assert!(task.completed);
        assert_eq!(task.task, "renewal");
        assert_eq!(task.due_date, due);
    }

    #[test]
    fn test_missing_task_operations_are_not_found() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        assert!(crm.complete_task(3).unwrap_err().is_not_found());
        assert!(crm.delete_task(3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_task() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);

        let id = crm.add_contact(NewContact::new("Eve")).unwrap();
        let a = crm.add_task(id, "a", None).unwrap();
        let b = crm.add_task(id, "b", None).unwrap();

        crm.delete_task(a).unwrap();

        let detail = crm.contact_detail(id).unwrap();
        let ids: Vec<i64> = detail.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn test_contact_detail_missing() {
        let db = Database::open_memory().unwrap();
        let crm = CrmService::new(&db);
        assert!(crm.contact_detail(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_concurrent_deletes_leave_no_partial_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crm.db");
        Database::migrate_at(&path).unwrap();

        let contact_id = {
            let db = Database::open_at(&path).unwrap();
            let crm = CrmService::new(&db);
            let id = crm.add_contact(NewContact::new("Contested")).unwrap();
            for i in 0..5 {
                crm.add_note(id, &format!("log {}", i)).unwrap();
                crm.add_task(id, &format!("task {}", i), None).unwrap();
            }
            id
        };

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let db = Database::open_at(&path).unwrap();
                    CrmService::new(&db).delete_contact(contact_id)
                })
            })
            .collect();

        let results: Vec<Result<()>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(CrmError::is_not_found));

        let db = Database::open_at(&path).unwrap();
        assert_eq!(count(&db, "contact"), 0);
        assert_eq!(count(&db, "interaction_log"), 0);
        assert_eq!(count(&db, "follow_up_task"), 0);
    }
}
