//! Append-only edit history.
//!
//! One entry is recorded per successful save. Entries are stored newest
//! first under a single key and are never rewritten or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::identity::deserialize_id;
use crate::storage::{Storage, keys};

/// Editor identity used when none has been configured.
pub const GUEST_EDITOR: &str = "guest";

/// Record of a single save of a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub editor_id: String,
    pub edited_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry for a save result.
    ///
    /// The entry id mirrors the document id, or the save time when the
    /// result carried no id.
    pub fn for_save(saved: &Document, title: &str, editor_id: &str) -> Self {
        let edited_at = saved.saved_at;
        let id = if saved.id.trim().is_empty() {
            edited_at.to_rfc3339()
        } else {
            saved.id.clone()
        };
        Self {
            id,
            document_id: saved.id.clone(),
            title: title.to_string(),
            editor_id: editor_id.to_string(),
            edited_at,
        }
    }
}

/// Edit history over a [`Storage`].
#[derive(Debug, Clone)]
pub struct HistoryLog {
    storage: Storage,
}

impl HistoryLog {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Record an entry in front of all earlier ones.
    pub fn append(&self, entry: HistoryEntry) {
        self.storage.transaction(|s| {
            let mut entries = load_raw_entries(s);
            let value = match serde_json::to_value(&entry) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Failed to encode history entry: {}", e);
                    return;
                }
            };
            entries.insert(0, value);
            if s.persist(keys::HISTORY, &entries) {
                tracing::debug!(
                    "Recorded history entry for document {} by {}",
                    entry.document_id,
                    entry.editor_id
                );
            }
        });
    }

    /// Entries for one document, newest first. Empty for an empty id.
    pub fn query(&self, document_id: &str) -> Vec<HistoryEntry> {
        let document_id = document_id.trim();
        if document_id.is_empty() {
            return Vec::new();
        }
        self.entries()
            .into_iter()
            .filter(|entry| entry.document_id == document_id)
            .collect()
    }

    /// The whole log, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        load_raw_entries(&self.storage)
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable history entry: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Stored entries as raw JSON, so unreadable entries survive appends.
fn load_raw_entries(storage: &Storage) -> Vec<Value> {
    storage.load::<Vec<Value>>(keys::HISTORY).unwrap_or_default()
}
