//! wiki-client: the front end's view of the document API.
//!
//! - [`Transport`] with HTTP and in-process mock implementations
//! - [`DocumentService`] for typed list/save/latest calls
//! - [`Editor`] for the save flow (draft, history)
//! - [`Feed`] and [`HistoryView`] view models

pub mod config;
pub mod editor;
pub mod error;
pub mod feed;
pub mod service;
pub mod transport;

pub use config::ClientConfig;
pub use editor::{Editor, status_message};
pub use error::{ClientError, Result};
pub use feed::{CategoryCard, Feed, FeedItem, HistoryRow, HistoryView, category_cards};
pub use service::DocumentService;
pub use transport::{HttpTransport, MockTransport, Transport};
