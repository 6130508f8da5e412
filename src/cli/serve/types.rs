//! Response bodies for the HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Envelope for every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// A newly created record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Result of logging a note; `id` is absent when the note was blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteResponse {
    pub logged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}
