use anyhow::Result;

use super::display::print_full_contact;
use crate::db::Database;
use crate::service::CrmService;

/// Execute the show command
pub fn run_show(db: &Database, id: i64, json: bool) -> Result<()> {
    let detail = CrmService::new(db).contact_detail(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        print_full_contact(&detail);
    }

    Ok(())
}
