//! Transports carrying [`ApiRequest`]s to the document API.
//!
//! [`HttpTransport`] talks to a running server; [`MockTransport`] answers
//! in process from its own store. Both return the same status + body
//! response, so the document service cannot tell them apart.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use wiki_core::{ApiRequest, ApiResponse, DocumentApi, DocumentStore, Method, Storage, StoreStamp};

use crate::error::Result;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response. Non-success statuses
    /// are returned, not raised.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

/// Transport over HTTP using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(request.body.unwrap_or_default()),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("{} {} -> {}", request.method, url, status);

        Ok(ApiResponse { status, body })
    }
}

/// In-process stand-in for the document server.
#[derive(Debug, Clone)]
pub struct MockTransport {
    api: DocumentApi,
}

impl MockTransport {
    /// Mock over a fresh in-memory store with its own session.
    pub fn new() -> Self {
        Self::with_store(DocumentStore::open(Storage::in_memory(), StoreStamp::generate()))
    }

    pub fn with_store(store: DocumentStore) -> Self {
        Self {
            api: DocumentApi::new(store),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        self.api.store()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        Ok(self.api.handle(&request))
    }
}
