//! Document endpoints.
//!
//! - `POST /api/documents` - create or update a document
//! - `GET /api/documents` - all documents, most recently saved first
//! - `GET /api/documents/latest` - the most recently saved document
//! - `GET /api/documents/{id}` - one document
//!
//! Every handler answers through [`wiki_core::DocumentApi`], the same code
//! the client's mock transport runs, and converts the result here.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use wiki_core::ApiResponse;
use wiki_core::api;

use crate::AppState;

/// Convert an API answer into an HTTP response with a JSON body.
pub fn into_response(answer: ApiResponse) -> Response {
    let status = StatusCode::from_u16(answer.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], answer.body).into_response()
}

/// Handler for `POST /api/documents`
pub async fn create_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    into_response(state.api.save(&body))
}

/// Handler for `GET /api/documents`
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Response {
    into_response(state.api.list())
}

/// Handler for `GET /api/documents/latest`
pub async fn latest_handler(State(state): State<Arc<AppState>>) -> Response {
    into_response(state.api.latest())
}

/// Handler for `GET /api/documents/{id}`
pub async fn get_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    into_response(state.api.get(&id))
}

/// Fallback for paths no route matches
pub async fn no_route_handler(method: Method, uri: Uri) -> Response {
    tracing::debug!("No route for {} {}", method, uri.path());
    into_response(api::no_route(&method, uri.path()))
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> Response {
    into_response(api::method_not_allowed(&method, uri.path()))
}
