//! Error types.
//!
//! `StoreError` represents failures reported by the persistence collaborator.
//! It is defined here, next to the `QuestionStore` trait, so the question bank
//! can downcast an `anyhow::Error` and pull out the collaborator's reason
//! without string matching. `ValidationError` covers client-side gates that
//! block a transition before any request is made.

use thiserror::Error;

/// Generic message used when a failure carries no collaborator reason.
pub const GENERIC_TRANSPORT_ERROR: &str = "the server could not be reached";

/// Errors returned by a `QuestionStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server answered with an error status. `message` holds the
    /// `error` field of the JSON body when one was present.
    #[error("API error (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// The requested question does not exist.
    #[error("question not found: {0}")]
    NotFound(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl StoreError {
    /// The reason reported by the collaborator itself, if any.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            StoreError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Human-readable reason for a failed collaborator call.
///
/// Prefers the message from the collaborator's error payload; otherwise
/// falls back to the error's own description.
pub fn failure_reason(err: &anyhow::Error) -> String {
    match err.downcast_ref::<StoreError>() {
        Some(store_err) => match store_err.payload_message() {
            Some(msg) => msg.to_string(),
            None => store_err.to_string(),
        },
        None => {
            let text = err.to_string();
            if text.is_empty() {
                GENERIC_TRANSPORT_ERROR.to_string()
            } else {
                text
            }
        }
    }
}

/// Client-side validation failures. These never reach the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("marks must be a positive integer (got {0})")]
    NonPositiveMarks(i64),

    #[error("Please select a file")]
    NoFileSelected,

    #[error("Please upload a {expected} file")]
    WrongExtension { file_name: String, expected: String },

    #[error("an upload is already in progress")]
    UploadInFlight,

    #[error("no question is being edited")]
    NotEditing,

    #[error("question not found: {0}")]
    UnknownQuestion(String),

    #[error("no option {0}")]
    UnknownOption(String),

    #[error("a question needs at least one option")]
    LastOption,
}
