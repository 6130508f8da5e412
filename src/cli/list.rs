use anyhow::Result;

use super::display::format_contact_row;
use crate::db::Database;
use crate::service::CrmService;

/// Execute the list command
pub fn run_list(db: &Database, search: Option<&str>, tag: Option<&str>, json: bool) -> Result<()> {
    let listing = CrmService::new(db).listing(search, tag)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.contacts.is_empty() {
        println!("No matches.");
    } else {
        for contact in &listing.contacts {
            println!("{}", format_contact_row(contact));
        }
    }

    if !listing.tags.is_empty() {
        let tags: Vec<&str> = listing.tags.iter().map(String::as_str).collect();
        println!("\ntags: {}", tags.join(", "));
    }

    Ok(())
}

/// Execute the tags command
pub fn run_tags(db: &Database) -> Result<()> {
    for tag in CrmService::new(db).all_tags()? {
        println!("{}", tag);
    }
    Ok(())
}
