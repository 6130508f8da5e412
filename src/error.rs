use thiserror::Error;

use crate::models::RecordKind;

pub type Result<T> = std::result::Result<T, CrmError>;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store failure: {0}")]
    StoreFailure(rusqlite::Error),

    #[error("database schema is at version {found}, expected {expected}; run `contactcrm migrate`")]
    SchemaMismatch { found: i32, expected: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrmError {
    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<rusqlite::Error> for CrmError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                let detail = msg.clone().unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string());
                Self::ConstraintViolation(detail)
            }
            _ => Self::StoreFailure(err),
        }
    }
}
