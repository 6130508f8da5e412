use anyhow::Result;

use crate::db::Database;
use crate::service::CrmService;

/// Execute the delete command. Logs and tasks of the contact go with it.
pub fn run_delete(db: &Database, id: i64) -> Result<()> {
    CrmService::new(db).delete_contact(id)?;
    println!("Deleted #{}", id);
    Ok(())
}
