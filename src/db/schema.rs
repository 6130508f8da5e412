pub const SCHEMA_VERSION: i32 = 2;

/// V1: contacts and their interaction log
pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS contact (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS interaction_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    note TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    FOREIGN KEY (contact_id) REFERENCES contact(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_contact_created ON contact(created_at);
CREATE INDEX IF NOT EXISTS idx_interaction_contact ON interaction_log(contact_id);
CREATE INDEX IF NOT EXISTS idx_interaction_timestamp ON interaction_log(timestamp);
"#;

/// V2: follow-up tasks per contact
pub const MIGRATION_V2: &str = r#"
CREATE TABLE IF NOT EXISTS follow_up_task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    task TEXT NOT NULL,
    due_date TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (contact_id) REFERENCES contact(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_task_contact ON follow_up_task(contact_id);
CREATE INDEX IF NOT EXISTS idx_task_due ON follow_up_task(due_date);
"#;
