use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod add;
pub mod delete;
pub mod display;
pub mod list;
pub mod note;
pub mod serve;
pub mod show;
pub mod task;

pub use add::run_add;
pub use delete::run_delete;
pub use display::print_full_contact;
pub use list::{run_list, run_tags};
pub use note::run_note;
pub use serve::run_serve;
pub use show::run_show;
pub use task::run_task;

#[derive(Parser)]
#[command(name = "contactcrm")]
#[command(about = "Contacts, interaction logs and follow-up tasks")]
#[command(version)]
pub struct Cli {
    /// Database file (defaults to $CONTACTCRM_DB or the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List contacts, newest first
    List(ListArgs),
    /// Show every tag in use
    Tags,
    /// Show a contact with its log and tasks
    Show(ShowArgs),
    /// Add a new contact
    Add(AddArgs),
    /// Delete a contact and everything attached to it
    Delete(IdArgs),
    /// Log a note against a contact
    Note(NoteArgs),
    /// Manage follow-up tasks
    Task(TaskArgs),
    /// Serve the JSON endpoints over HTTP
    Serve(ServeArgs),
    /// Create or upgrade the database schema
    Migrate,
}

#[derive(Args)]
pub struct ListArgs {
    /// Match name, email or tags (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,
    /// Match tags only (case-insensitive substring)
    #[arg(short, long)]
    pub tag: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: i64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    pub name: String,
    #[arg(short, long, default_value = "")]
    pub email: String,
    #[arg(short, long, default_value = "")]
    pub phone: String,
    /// Comma-separated labels, e.g. "vip, lead"
    #[arg(short, long, default_value = "")]
    pub tags: String,
    #[arg(short, long, default_value = "")]
    pub notes: String,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct NoteArgs {
    pub contact_id: i64,
    /// Note text; words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a follow-up task to a contact
    Add {
        contact_id: i64,
        task: String,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Mark a task as completed
    Done { id: i64 },
    /// Delete a task
    Rm { id: i64 },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (defaults to $CONTACTCRM_PORT or 5000)
    #[arg(short, long)]
    pub port: Option<u16>,
    #[arg(long, default_value = crate::config::DEFAULT_HOST)]
    pub host: String,
}
