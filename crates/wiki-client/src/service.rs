//! Typed calls to the document API over any [`Transport`].

use wiki_core::api::{DOCUMENTS_PATH, LATEST_SEGMENT};
use wiki_core::{ApiRequest, ApiResponse, Document, DocumentPayload};

use crate::error::{ClientError, Result};
use crate::transport::Transport;

pub const LIST_FAILED: &str = "Failed to load the document list.";
pub const SAVE_FAILED: &str = "Failed to save the document.";
pub const LATEST_FAILED: &str = "Failed to load the latest document.";

pub struct DocumentService<T> {
    transport: T,
}

impl<T: Transport> DocumentService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// All documents, most recently saved first.
    pub async fn list(&self) -> Result<Vec<Document>> {
        let response = self.transport.send(ApiRequest::get(DOCUMENTS_PATH)).await?;
        let response = ensure_success(response, LIST_FAILED)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Create or update a document, returning it as saved.
    pub async fn save(&self, payload: &DocumentPayload) -> Result<Document> {
        let body = serde_json::to_string(payload)?;
        let response = self
            .transport
            .send(ApiRequest::post(DOCUMENTS_PATH, body))
            .await?;
        let response = ensure_success(response, SAVE_FAILED)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// The most recently saved document; `None` when nothing was saved yet.
    pub async fn latest(&self) -> Result<Option<Document>> {
        let path = format!("{}/{}", DOCUMENTS_PATH, LATEST_SEGMENT);
        let response = self.transport.send(ApiRequest::get(path)).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = ensure_success(response, LATEST_FAILED)?;
        Ok(Some(serde_json::from_str(&response.body)?))
    }
}

fn ensure_success(response: ApiResponse, default_message: &str) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let body = if response.body.trim().is_empty() {
        default_message.to_string()
    } else {
        response.body
    };
    tracing::warn!("Document API answered {}: {}", response.status, body);
    Err(ClientError::Status {
        status: response.status,
        body,
    })
}
