use anyhow::Result;

use crate::db::Database;
use crate::models::NewContact;
use crate::service::CrmService;

/// Execute the add command
pub fn run_add(db: &Database, contact: NewContact) -> Result<()> {
    let id = CrmService::new(db).add_contact(contact)?;
    println!("Added #{}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accepts_empty_name() {
        let db = Database::open_memory().unwrap();

        run_add(&db, NewContact::new("")).unwrap();

        let listing = CrmService::new(&db).listing(None, None).unwrap();
        assert_eq!(listing.contacts.len(), 1);
        assert_eq!(listing.contacts[0].name, "");
        assert_eq!(listing.contacts[0].display_name(), "(unnamed)");
    }
}
