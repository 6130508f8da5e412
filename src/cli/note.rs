//! Quick note command for logging interactions against contacts

use anyhow::Result;

use crate::db::Database;
use crate::service::CrmService;

/// Execute the note command
pub fn run_note(db: &Database, contact_id: i64, words: &[String]) -> Result<()> {
    let note = words.join(" ");

    match CrmService::new(db).add_note(contact_id, &note)? {
        Some(_) => println!("Saved."),
        None => println!("Empty note, nothing saved."),
    }

    Ok(())
}
