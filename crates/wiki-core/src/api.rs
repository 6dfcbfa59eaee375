//! In-process document API.
//!
//! Routes a method + path + JSON body to the [`DocumentStore`] and answers
//! with a status code and JSON body, exactly as the document server would.
//! The client's mock transport is built on this, so callers cannot tell the
//! mock from the real server.
//!
//! ## Routes
//!
//! - `POST /api/documents` - create or update, `201` with the saved document
//! - `GET /api/documents` - `200` with all documents, newest first
//! - `GET /api/documents/latest` - `200` with the newest document, or `404`
//! - `GET /api/documents/{id}` - `200` with one document, or `404`

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::json;

use crate::document::DocumentPayload;
use crate::store::DocumentStore;

pub const DOCUMENTS_PATH: &str = "/api/documents";
pub const LATEST_SEGMENT: &str = "latest";

/// Body of the `404` answered by the latest-document route.
pub const NO_DOCUMENT_MESSAGE: &str = "No document saved yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A request as seen by the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path, optionally with a query string (ignored)
    pub path: String,
    /// Raw JSON body
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }
}

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!("Failed to encode response body: {}", e);
                Self::message(500, "Failed to encode response")
            }
        }
    }

    /// `{"message": ...}` body used for every non-success answer.
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request router over a document store.
///
/// The document server answers through the same methods, so both sides
/// agree on status codes and bodies.
#[derive(Debug, Clone)]
pub struct DocumentApi {
    store: DocumentStore,
}

impl DocumentApi {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Answer one request.
    ///
    /// Paths match exactly: a trailing slash is a different route.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path = request.path.split(['?', '#']).next().unwrap_or_default();

        let response = match (request.method, route(path)) {
            (Method::Post, Some(Route::Collection)) => {
                self.save(request.body.as_deref().unwrap_or_default().as_bytes())
            }
            (Method::Get, Some(Route::Collection)) => self.list(),
            (Method::Get, Some(Route::Latest)) => self.latest(),
            (Method::Get, Some(Route::Document(id))) => self.get(id),
            (method, Some(_)) => method_not_allowed(method, path),
            (method, None) => no_route(method, path),
        };

        tracing::debug!("{} {} -> {}", request.method, path, response.status);
        response
    }

    /// `POST /api/documents`: decode the body and upsert it.
    pub fn save(&self, body: &[u8]) -> ApiResponse {
        match DocumentPayload::from_body(body) {
            Ok(payload) => ApiResponse::json(201, &self.store.upsert(payload)),
            Err(e) => {
                tracing::warn!("Rejected document payload: {}", e);
                ApiResponse::message(400, e.to_string())
            }
        }
    }

    /// `GET /api/documents`
    pub fn list(&self) -> ApiResponse {
        ApiResponse::json(200, &self.store.list())
    }

    /// `GET /api/documents/latest`
    pub fn latest(&self) -> ApiResponse {
        match self.store.latest() {
            Some(doc) => ApiResponse::json(200, &doc),
            None => ApiResponse::message(404, NO_DOCUMENT_MESSAGE),
        }
    }

    /// `GET /api/documents/{id}`
    pub fn get(&self, id: &str) -> ApiResponse {
        match self.store.get(id) {
            Some(doc) => ApiResponse::json(200, &doc),
            None => ApiResponse::message(404, format!("Document not found: {}", id)),
        }
    }
}

enum Route<'a> {
    Collection,
    Latest,
    Document(&'a str),
}

fn route(path: &str) -> Option<Route<'_>> {
    let rest = path.strip_prefix(DOCUMENTS_PATH)?;
    if rest.is_empty() {
        return Some(Route::Collection);
    }
    let segment = rest.strip_prefix('/')?;
    match segment {
        "" => None,
        LATEST_SEGMENT => Some(Route::Latest),
        id if id.contains('/') => None,
        id => Some(Route::Document(id)),
    }
}

/// `404` for a path no route matches.
pub fn no_route(method: impl Display, path: &str) -> ApiResponse {
    ApiResponse::message(404, format!("No route for {} {}", method, path))
}

/// `405` for a known path with an unsupported method.
pub fn method_not_allowed(method: impl Display, path: &str) -> ApiResponse {
    ApiResponse::message(405, format!("Method not allowed: {} {}", method, path))
}
