//! JSON endpoints over HTTP.
//!
//! Routes follow the classic form-post layout (`/`, `/add`, `/delete/<id>`,
//! `/add_note/<id>`, ...) and answer with JSON envelopes instead of rendered
//! pages.

use anyhow::Result;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod server;
pub mod types;

pub use server::{status_for, CrmServer, Request, Response};

use crate::config::{resolve_port, Config};

/// Run the serve command (blocks until Ctrl+C).
pub fn run_serve(config: &Config, host: &str, port: Option<u16>) -> Result<()> {
    let port = resolve_port(port)?;
    let server = CrmServer::new(config.db_path.clone())?;
    let listener = TcpListener::bind((host, port))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    ctrlc_handler(shutdown.clone());

    println!("Serving {} on http://{}:{}", config.db_path.display(), host, port);
    println!("Press Ctrl+C to stop");

    server.start(listener, shutdown)?;
    println!("Stopped");
    Ok(())
}

fn ctrlc_handler(shutdown: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down");
        shutdown.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }
}
