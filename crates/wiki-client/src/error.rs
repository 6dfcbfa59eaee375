use thiserror::Error;

/// Errors from talking to the document API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-success status. `body` is the response
    /// text, or a default message when the response was empty.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WIKI_API_BASE is not set and the mock transport is disabled")]
    MissingApiBase,
}

impl ClientError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
