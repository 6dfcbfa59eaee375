//! wiki-core: Document model and client-side persistence for the Flyff wiki.
//!
//! This crate provides:
//! - Rich-text document trees and title handling
//! - A key-value storage abstraction with in-memory, file and unavailable backends
//! - The document upsert store (id allocation, most-recent-first ordering)
//! - The append-only edit history
//! - Editor draft state
//! - An in-process request router over the store, used to mock the HTTP API

pub mod api;
pub mod category;
pub mod content;
pub mod document;
pub mod draft;
pub mod history;
pub mod identity;
pub mod storage;
pub mod store;

pub use api::{ApiRequest, ApiResponse, DocumentApi, Method};
pub use category::{Category, UnknownCategory};
pub use content::{Mark, RichNode};
pub use document::{Document, DocumentPayload, PayloadError};
pub use draft::{Draft, DraftMeta};
pub use history::{HistoryEntry, HistoryLog};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Storage, StorageError, UnavailableStore};
pub use store::{DocumentStore, StoreStamp};
