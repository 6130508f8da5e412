use chrono::Local;

use crate::models::{Contact, ContactDetail, FollowUpTask};

/// Print a full contact detail with clean formatting (only non-empty fields)
pub fn print_full_contact(detail: &ContactDetail) {
    let contact = &detail.contact;

    // Header - name and id
    println!("{}  #{}\n", contact.display_name(), contact.id);

    for field in [&contact.email, &contact.phone] {
        if !field.is_empty() {
            println!("  {}", field);
        }
    }

    let tags = contact.tag_list();
    if !tags.is_empty() {
        println!("  [{}]", tags.join("] ["));
    }

    if !contact.notes.trim().is_empty() {
        println!();
        for line in contact.notes.lines() {
            println!("  {}", line);
        }
    }

    println!(
        "\n  added {}",
        contact.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );

    if !detail.tasks.is_empty() {
        println!("\nTasks ({} open)", detail.open_tasks().count());
        for task in &detail.tasks {
            println!("  {}", format_task(task));
        }
    }

    if !detail.interactions.is_empty() {
        println!("\nLog");
        for log in &detail.interactions {
            println!(
                "  {}  {}",
                log.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                log.note.trim()
            );
        }
    }
}

/// One line per contact for list output
pub fn format_contact_row(contact: &Contact) -> String {
    let mut line = format!("{:>5}  {}", contact.id, truncate(contact.display_name(), 30));
    if !contact.email.is_empty() {
        line.push_str(&format!("  <{}>", contact.email));
    }
    if !contact.tags.trim().is_empty() {
        line.push_str(&format!("  [{}]", contact.tag_list().join(", ")));
    }
    line
}

pub fn format_task(task: &FollowUpTask) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{}] #{} {} ({})", mark, task.id, task.task, task.due_label())
}

/// Truncate a string to fit a column, adding "..." if needed
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
