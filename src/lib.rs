pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod service;

pub use db::Database;
pub use error::{CrmError, Result};
pub use service::CrmService;
