//! Runtime configuration
//!
//! Each setting resolves from a command-line flag first, then an
//! environment variable, then a default.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

// Environment variable names
pub const ENV_DB: &str = "CONTACTCRM_DB";
pub const ENV_PORT: &str = "CONTACTCRM_PORT";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database path from `--db`, `CONTACTCRM_DB`, or the
    /// per-user config directory.
    pub fn resolve(db_flag: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_flag {
            Some(path) => path,
            None => match env_value(ENV_DB) {
                Some(path) => PathBuf::from(path),
                None => default_db_path()?,
            },
        };
        Ok(Self { db_path })
    }
}

/// Resolve the server port from `--port`, `CONTACTCRM_PORT`, or 5000.
pub fn resolve_port(port_flag: Option<u16>) -> Result<u16> {
    if let Some(port) = port_flag {
        return Ok(port);
    }
    match env_value(ENV_PORT) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, raw)),
        None => Ok(DEFAULT_PORT),
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_db_path() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
    Ok(config_dir.join("contactcrm").join("crm.db"))
}
