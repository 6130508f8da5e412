use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{CrmError, Result};
use crate::models::{FollowUpTask, RecordKind};

const TASK_COLUMNS: &str = "id, contact_id, task, due_date, completed";

impl Database {
    // ==================== TASK CRUD ====================

    pub fn insert_task(&self, contact_id: i64, task: &str, due_date: Option<NaiveDate>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO follow_up_task (contact_id, task, due_date, completed) VALUES (?, ?, ?, 0)",
            params![contact_id, task, due_date.map(|d| d.to_string())],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_task(&self, id: i64) -> Result<FollowUpTask> {
        let sql = format!("SELECT {} FROM follow_up_task WHERE id = ?", TASK_COLUMNS);
        self.conn
            .query_row(&sql, [id], Self::row_to_task)
            .optional()?
            .ok_or_else(|| CrmError::not_found(RecordKind::FollowUpTask, id))
    }

    /// Open tasks first, then by due date (undated last)
    pub fn tasks_for_contact(&self, contact_id: i64) -> Result<Vec<FollowUpTask>> {
        let sql = format!(
            r#"SELECT {} FROM follow_up_task
               WHERE contact_id = ?
               ORDER BY completed ASC, due_date IS NULL, due_date ASC, id ASC"#,
            TASK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let tasks = stmt
            .query_map([contact_id], Self::row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }

    pub fn update_task(&self, task: &FollowUpTask) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE follow_up_task SET task = ?, due_date = ?, completed = ? WHERE id = ?",
            params![
                task.task,
                task.due_date.map(|d| d.to_string()),
                task.completed as i32,
                task.id,
            ],
        )?;
        if rows == 0 {
            return Err(CrmError::not_found(RecordKind::FollowUpTask, task.id));
        }
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.delete_record(RecordKind::FollowUpTask, id)
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<FollowUpTask> {
        let due_date: Option<String> = row.get(3)?;
        let due_date = due_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?;

        Ok(FollowUpTask {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            task: row.get(2)?,
            due_date,
            completed: row.get::<_, i32>(4)? == 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContact;
    use chrono::Utc;

    fn contact(db: &Database) -> i64 {
        db.insert_contact(&NewContact::new("Tess"), Utc::now()).unwrap()
    }

    #[test]
    fn test_task_crud() {
        let db = Database::open_memory().unwrap();
        let contact_id = contact(&db);
        let due = NaiveDate::from_ymd_opt(2025, 5, 1);

        // Create
        let id = db.insert_task(contact_id, "send proposal", due).unwrap();

        // Read
        let mut task = db.get_task(id).unwrap();
        assert_eq!(task.task, "send proposal");
        assert_eq!(task.due_date, due);
        assert!(!task.completed);

        // Update
        task.complete();
        db.update_task(&task).unwrap();
        assert!(db.get_task(id).unwrap().completed);

        // Delete
        db.delete_task(id).unwrap();
        assert!(db.get_task(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_task_without_due_date() {
        let db = Database::open_memory().unwrap();
        let contact_id = contact(&db);

        let id = db.insert_task(contact_id, "call back", None).unwrap();
        assert_eq!(db.get_task(id).unwrap().due_date, None);
    }

    #[test]
    fn test_orphan_task_is_rejected() {
        let db = Database::open_memory().unwrap();
        let err = db.insert_task(77, "ghost", None).unwrap_err();
        assert!(matches!(err, CrmError::ConstraintViolation(_)));
    }

    #[test]
    fn test_update_missing_task_is_not_found() {
        let db = Database::open_memory().unwrap();
        let task = FollowUpTask {
            id: 5,
            contact_id: 1,
            task: "nothing".to_string(),
            due_date: None,
            completed: true,
        };
        assert!(db.update_task(&task).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tasks_ordering() {
        let db = Database::open_memory().unwrap();
        let contact_id = contact(&db);

        let undated = db.insert_task(contact_id, "undated", None).unwrap();
        let late = db
            .insert_task(contact_id, "late", NaiveDate::from_ymd_opt(2025, 9, 1))
            .unwrap();
        let early = db
            .insert_task(contact_id, "early", NaiveDate::from_ymd_opt(2025, 2, 1))
            .unwrap();

        let mut done = db.get_task(early).unwrap();
        done.complete();
        db.update_task(&done).unwrap();

        let ids: Vec<i64> = db
            .tasks_for_contact(contact_id)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![late, undated, early]);
    }
}
