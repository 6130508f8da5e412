use anyhow::Result;

use super::TaskCommands;
use crate::db::Database;
use crate::models::parse_due_date;
use crate::service::CrmService;

/// Execute a task subcommand
pub fn run_task(db: &Database, command: TaskCommands) -> Result<()> {
    let crm = CrmService::new(db);

    match command {
        TaskCommands::Add {
            contact_id,
            task,
            due,
        } => {
            let due_date = parse_due_date(due.as_deref())?;
            let id = crm.add_task(contact_id, &task, due_date)?;
            println!("Added task #{}", id);
        }
        TaskCommands::Done { id } => {
            crm.complete_task(id)?;
            println!("Done.");
        }
        TaskCommands::Rm { id } => {
            crm.delete_task(id)?;
            println!("Deleted task #{}", id);
        }
    }

    Ok(())
}
