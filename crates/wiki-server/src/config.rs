//! Server configuration, resolved once at startup from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wiki_core::{DocumentStore, FileStore, Storage, StoreStamp};

/// File holding all persisted keys, inside the data directory.
pub const STORE_FILE: &str = "documents.json";

#[derive(Parser, Debug, Clone)]
#[command(name = "wiki-server")]
#[command(about = "Document API for the Flyff wiki")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "WIKI_PORT")]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "WIKI_BIND")]
    pub bind: String,

    /// Directory for the document store file
    #[arg(long, default_value = "./data", env = "WIKI_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Session identifier scoping saved documents.
    /// A fresh one is generated on every start when omitted, so a restart
    /// begins with an empty document list.
    #[arg(long, env = "WIKI_SESSION_ID", conflicts_with = "keep_documents")]
    pub session_id: Option<String>,

    /// Continue the previously recorded session instead of starting a new one
    #[arg(long, env = "WIKI_KEEP_DOCUMENTS")]
    pub keep_documents: bool,
}

impl ServerConfig {
    /// Socket address from `bind` and `port`.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address: {}:{}", self.bind, self.port))
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Open the file-backed document store for this configuration.
    pub fn open_store(&self) -> Result<DocumentStore> {
        let path = self.store_path();
        let backend = FileStore::open(&path)
            .with_context(|| format!("Failed to open document store at {:?}", path))?;
        let storage = Storage::new(backend);

        let store = if self.keep_documents {
            DocumentStore::resume(storage)
        } else {
            let stamp = match self.session_id.as_deref().map(str::trim) {
                Some(session) if !session.is_empty() => StoreStamp::new(session),
                _ => StoreStamp::generate(),
            };
            DocumentStore::open(storage, stamp)
        };

        tracing::info!(
            "Document store at {:?} (session {}, {} documents)",
            path,
            store.stamp().session,
            store.len()
        );
        Ok(store)
    }
}
