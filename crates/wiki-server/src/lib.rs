//! wiki-server library: the document API router and its configuration.
//!
//! The binary in `main.rs` wires these together; integration tests build the
//! router directly.

pub mod config;
pub mod documents;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wiki_core::api::DOCUMENTS_PATH;
use wiki_core::{DocumentApi, DocumentStore};

pub use config::ServerConfig;

/// Shared application state
pub struct AppState {
    pub api: DocumentApi,
}

impl AppState {
    pub fn new(store: DocumentStore) -> Arc<Self> {
        Arc::new(Self {
            api: DocumentApi::new(store),
        })
    }

    pub fn store(&self) -> &DocumentStore {
        self.api.store()
    }
}

/// Build the document API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            DOCUMENTS_PATH,
            post(documents::create_handler).get(documents::list_handler),
        )
        .route("/api/documents/latest", get(documents::latest_handler))
        .route("/api/documents/{id}", get(documents::get_handler))
        .fallback(documents::no_route_handler)
        .method_not_allowed_fallback(documents::method_not_allowed_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
