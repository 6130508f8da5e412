//! HTTP server exposing the CRM operations as JSON endpoints.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::types::{ApiResponse, CreatedResponse, NoteResponse};
use crate::db::Database;
use crate::error::CrmError;
use crate::models::{parse_due_date, NewContact};
use crate::service::CrmService;

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 64 * 1024;
/// Largest request line or header line accepted
const MAX_LINE_BYTES: usize = 8 * 1024;
const MAX_HEADERS: usize = 100;

/// A parsed HTTP request: method, path, query string and form body.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

impl Request {
    /// Read one request (request line, headers, body) from `reader`.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self> {
        let request_line = read_line_capped(reader)?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(anyhow!("malformed request line"));
        }

        let method = parts[0].to_uppercase();
        let (path, query) = match parts[1].split_once('?') {
            Some((path, query)) => (path.to_string(), decode_pairs(query.as_bytes())),
            None => (parts[1].to_string(), HashMap::new()),
        };

        // Parse headers
        let mut content_length = 0usize;
        let mut header_count = 0usize;
        loop {
            let header_line = read_line_capped(reader)?;
            let header_line = header_line.trim();
            if header_line.is_empty() {
                break;
            }
            header_count += 1;
            if header_count > MAX_HEADERS {
                return Err(anyhow!("too many headers"));
            }
            if let Some((key, value)) = header_line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value
                        .trim()
                        .parse()
                        .map_err(|_| anyhow!("invalid Content-Length"))?;
                }
            }
        }

        if content_length > MAX_BODY_BYTES {
            return Err(anyhow!("request body too large"));
        }

        let mut body = vec![0u8; content_length];
        if content_length > 0 {
            reader.read_exact(&mut body)?;
        }

        Ok(Self {
            method,
            path,
            query,
            form: decode_pairs(&body),
        })
    }

    /// Query parameter; empty values count as absent
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Required form field. Presence is all that is checked.
    fn form_field(&self, key: &str) -> std::result::Result<&str, Response> {
        self.form.get(key).map(String::as_str).ok_or_else(|| {
            Response::json(
                400,
                &ApiResponse::<()>::err(format!("missing form field '{}'", key)),
            )
        })
    }
}

/// One line (terminator included), refusing anything past `MAX_LINE_BYTES`.
/// Returns an empty string at end of input.
fn read_line_capped<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader
        .by_ref()
        .take(MAX_LINE_BYTES as u64 + 1)
        .read_line(&mut line)?;
    if line.len() > MAX_LINE_BYTES {
        return Err(anyhow!("request line too long"));
    }
    Ok(line)
}

fn decode_pairs(bytes: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(bytes).into_owned().collect()
}

/// Status code plus serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self { status, body },
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                Self {
                    status: 500,
                    body: r#"{"success":false,"error":"internal error"}"#.to_string(),
                }
            }
        }
    }

    fn not_found() -> Self {
        Self::json(404, &ApiResponse::<()>::err("Not Found"))
    }

    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let status_text = match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            409 => "Conflict",
            500 => "Internal Server Error",
            _ => "Unknown",
        };

        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            status_text,
            self.body.len()
        );

        out.write_all(head.as_bytes())?;
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}

/// HTTP status for a failed operation
pub fn status_for(err: &CrmError) -> u16 {
    match err {
        CrmError::NotFound { .. } => 404,
        CrmError::ConstraintViolation(_) => 409,
        CrmError::InvalidInput(_) => 400,
        CrmError::StoreFailure(_) | CrmError::SchemaMismatch { .. } | CrmError::Io(_) => 500,
    }
}

fn error_response(err: &CrmError) -> Response {
    let status = status_for(err);
    if status >= 500 {
        log::error!("Request failed: {}", err);
    } else {
        log::warn!("Request rejected: {}", err);
    }
    Response::json(status, &ApiResponse::<()>::err(err.to_string()))
}

fn respond<T: Serialize>(result: crate::error::Result<T>) -> Response {
    match result {
        Ok(data) => Response::json(200, &ApiResponse::ok(data)),
        Err(e) => error_response(&e),
    }
}

fn respond_done(result: crate::error::Result<()>) -> Response {
    match result {
        Ok(()) => Response::json(200, &ApiResponse::done()),
        Err(e) => error_response(&e),
    }
}

/// HTTP server for the CRM endpoints.
#[derive(Debug, Clone)]
pub struct CrmServer {
    db_path: PathBuf,
}

impl CrmServer {
    /// Create a new server. Fails early if the database cannot be opened.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        let db = Database::open_at(&db_path)?;
        log::info!("Opened {} ({} contacts)", db_path.display(), db.count_contacts()?);
        Ok(Self { db_path })
    }

    /// Accept connections until `shutdown` is set. Each connection is
    /// handled on its own thread with its own database connection.
    pub fn start(&self, listener: TcpListener, shutdown: Arc<AtomicBool>) -> Result<()> {
        listener.set_nonblocking(true)?;
        log::info!("Listening on {}", listener.local_addr()?);

        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer_addr)) => {
                    let server = self.clone();
                    std::thread::spawn(move || {
                        if let Err(e) = server.handle_connection(stream, peer_addr) {
                            log::warn!("Request error from {}: {}", peer_addr, e);
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                }
            }
        }

        Ok(())
    }

    fn handle_connection(&self, mut stream: TcpStream, peer_addr: SocketAddr) -> Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(Duration::from_secs(30)))?;
        stream.set_write_timeout(Some(Duration::from_secs(30)))?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let request = match Request::parse(&mut reader) {
            Ok(r) => r,
            Err(e) => {
                let response = Response::json(400, &ApiResponse::<()>::err(e.to_string()));
                response.write_to(&mut stream)?;
                return Ok(());
            }
        };

        log::debug!("{} {} from {}", request.method, request.path, peer_addr);

        let response = match Database::open_at(&self.db_path) {
            Ok(db) => self.handle_request(&db, &request),
            Err(e) => error_response(&e),
        };

        log::info!("{} {} -> {}", request.method, request.path, response.status);
        response.write_to(&mut stream)?;
        Ok(())
    }

    /// Route one request against an open database.
    pub fn handle_request(&self, db: &Database, req: &Request) -> Response {
        let crm = CrmService::new(db);
        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();

        match (req.method.as_str(), segments.as_slice()) {
            ("GET", [""]) => respond(crm.listing(req.query_param("search"), req.query_param("tag"))),
            ("GET", ["contact", id]) => match parse_id(id) {
                Some(id) => respond(crm.contact_detail(id)),
                None => Response::not_found(),
            },
            ("POST", ["add"]) => handle_add(&crm, req).unwrap_or_else(|r| r),
            ("GET" | "POST", ["delete", id]) => match parse_id(id) {
                Some(id) => respond_done(crm.delete_contact(id)),
                None => Response::not_found(),
            },
            ("POST", ["add_note", id]) => match parse_id(id) {
                Some(id) => handle_add_note(&crm, req, id).unwrap_or_else(|r| r),
                None => Response::not_found(),
            },
            ("POST", ["add_task", id]) => match parse_id(id) {
                Some(id) => handle_add_task(&crm, req, id).unwrap_or_else(|r| r),
                None => Response::not_found(),
            },
            ("GET" | "POST", ["complete_task", id]) => match parse_id(id) {
                Some(id) => respond_done(crm.complete_task(id)),
                None => Response::not_found(),
            },
            ("GET" | "POST", ["delete_task", id]) => match parse_id(id) {
                Some(id) => respond_done(crm.delete_task(id)),
                None => Response::not_found(),
            },
            _ => Response::not_found(),
        }
    }
}

type Handled = std::result::Result<Response, Response>;

fn handle_add(crm: &CrmService<'_>, req: &Request) -> Handled {
    let contact = NewContact {
        name: req.form_field("name")?.to_string(),
        email: req.form_field("email")?.to_string(),
        phone: req.form_field("phone")?.to_string(),
        tags: req.form_field("tags")?.to_string(),
        notes: req.form_field("notes")?.to_string(),
    };
    Ok(respond(crm.add_contact(contact).map(|id| CreatedResponse { id })))
}

fn handle_add_note(crm: &CrmService<'_>, req: &Request, contact_id: i64) -> Handled {
    let note = req.form_field("note")?;
    Ok(respond(crm.add_note(contact_id, note).map(|id| NoteResponse {
        logged: id.is_some(),
        id,
    })))
}

fn handle_add_task(crm: &CrmService<'_>, req: &Request, contact_id: i64) -> Handled {
    let task = req.form_field("task")?;
    let due_date = match parse_due_date(req.form.get("due_date").map(String::as_str)) {
        Ok(d) => d,
        Err(e) => return Err(error_response(&e)),
    };
    Ok(respond(
        crm.add_task(contact_id, task, due_date)
            .map(|id| CreatedResponse { id }),
    ))
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse().ok().filter(|id: &i64| *id >= 0)
}
