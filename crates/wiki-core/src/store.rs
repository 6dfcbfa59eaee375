//! Document upsert store.
//!
//! Documents live under a single key as a JSON array ordered most recently
//! saved first. Every operation re-reads the array and every mutation writes
//! it back; nothing is cached between calls.
//!
//! Entries are kept as raw JSON between reads and writes. An entry that no
//! longer decodes as a [`Document`] is hidden from readers but still owns its
//! id and is written back untouched.
//!
//! The collection is scoped by a [`StoreStamp`]. Opening the store with a
//! stamp that differs from the stored one clears the collection, so a new
//! server session starts empty while saves within one session accumulate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, DocumentPayload};
use crate::identity::{normalize_id_value, resolve_document_id};
use crate::storage::{Storage, keys};

/// Layout version of the persisted document collection.
pub const STORE_FORMAT: u32 = 1;

/// Marker compared at open time to decide whether stored documents are stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStamp {
    pub format: u32,
    pub session: String,
}

impl StoreStamp {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            format: STORE_FORMAT,
            session: session.into(),
        }
    }

    /// Stamp with a fresh random session.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// The stamp currently recorded in `storage`, if it has the current format.
    pub fn stored(storage: &Storage) -> Option<Self> {
        storage
            .load::<StoreStamp>(keys::DOCUMENTS_STAMP)
            .filter(|stamp| stamp.format == STORE_FORMAT)
    }
}

/// Ordered, id-keyed collection of documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    storage: Storage,
    stamp: StoreStamp,
}

impl DocumentStore {
    /// Open the store for the session identified by `stamp`.
    ///
    /// Documents saved under a different stamp (or before any stamp was
    /// recorded) are discarded.
    pub fn open(storage: Storage, stamp: StoreStamp) -> Self {
        storage.transaction(|s| {
            let stored = s.load::<StoreStamp>(keys::DOCUMENTS_STAMP);
            if stored.as_ref() != Some(&stamp) {
                match &stored {
                    Some(previous) => tracing::info!(
                        "Store session changed ({} -> {}), clearing saved documents",
                        previous.session,
                        stamp.session
                    ),
                    None => tracing::debug!("Initializing document store session {}", stamp.session),
                }
                s.remove(keys::DOCUMENTS);
                s.persist(keys::DOCUMENTS_STAMP, &stamp);
            }
        });

        Self { storage, stamp }
    }

    /// Open the store, continuing the recorded session when there is one.
    pub fn resume(storage: Storage) -> Self {
        let stamp = StoreStamp::stored(&storage).unwrap_or_else(StoreStamp::generate);
        Self::open(storage, stamp)
    }

    pub fn stamp(&self) -> &StoreStamp {
        &self.stamp
    }

    /// All documents, most recently saved first.
    pub fn list(&self) -> Vec<Document> {
        load_documents(&self.storage)
    }

    /// The most recently saved document.
    pub fn latest(&self) -> Option<Document> {
        self.list().into_iter().next()
    }

    /// A document by id.
    pub fn get(&self, id: &str) -> Option<Document> {
        let id = id.trim();
        self.list().into_iter().find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create or update a document and move it to the front.
    ///
    /// An empty payload id allocates the next numeric id; a known id replaces
    /// that document. The save time is always stamped here. Storage failures
    /// are logged and the saved document is still returned.
    pub fn upsert(&self, payload: DocumentPayload) -> Document {
        self.storage.transaction(|s| {
            let mut entries = load_entries(s);
            let ids: Vec<String> = entries.iter().map(entry_id).collect();

            let id = resolve_document_id(&payload.id, ids.iter().map(String::as_str));
            let saved = Document {
                id,
                title: payload.resolved_title(),
                category: payload.category,
                content: payload.content,
                saved_at: Utc::now(),
            };

            let value = match serde_json::to_value(&saved) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Failed to encode document {}: {}", saved.id, e);
                    return saved;
                }
            };

            let created = match ids.iter().position(|id| *id == saved.id) {
                Some(index) => {
                    entries.remove(index);
                    false
                }
                None => true,
            };
            entries.insert(0, value);

            if !s.persist(keys::DOCUMENTS, &entries) {
                tracing::debug!("Document {} saved without persistence", saved.id);
            }

            tracing::info!(
                "{} document {} ({:?}), {} total",
                if created { "Created" } else { "Updated" },
                saved.id,
                saved.title,
                entries.len()
            );

            saved
        })
    }
}

/// The stored collection as raw entries, newest first.
fn load_entries(storage: &Storage) -> Vec<Value> {
    storage.load::<Vec<Value>>(keys::DOCUMENTS).unwrap_or_default()
}

/// Id of a raw entry, normalized the same way as payload ids.
fn entry_id(entry: &Value) -> String {
    normalize_id_value(entry.get("id"))
}

/// Decode the stored collection, skipping entries that no longer parse.
fn load_documents(storage: &Storage) -> Vec<Document> {
    load_entries(storage)
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Document>(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping stored document #{}: {}", index, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::content::RichNode;
    use crate::storage::UnavailableStore;

    fn store() -> DocumentStore {
        DocumentStore::open(Storage::in_memory(), StoreStamp::new("test"))
    }

    fn payload(title: &str) -> DocumentPayload {
        DocumentPayload::new(
            title,
            Category::Jobs,
            RichNode::doc(vec![RichNode::heading(1, title), RichNode::paragraph("body")]),
        )
    }

    #[test]
    fn test_sequential_creates_accumulate() {
        let store = store();

        let first = store.upsert(payload("A"));
        let second = store.upsert(payload("B"));

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        let docs = store.list();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "2");
        assert_eq!(docs[1].id, "1");
    }

    #[test]
    fn test_update_moves_to_front_and_keeps_count() {
        let store = store();
        let a = store.upsert(payload("A"));
        store.upsert(payload("B"));
        store.upsert(payload("C"));

        let updated = store.upsert(payload("A2").with_id(a.id.clone()));

        assert_eq!(updated.id, a.id);
        assert_eq!(updated.title, "A2");
        let docs = store.list();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id, a.id);
        assert_eq!(
            docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3", "2"]
        );
        assert!(updated.saved_at >= a.saved_at);
    }

    #[test]
    fn test_unknown_id_is_created_as_given() {
        let store = store();
        let doc = store.upsert(payload("Guide").with_id("guide"));
        assert_eq!(doc.id, "guide");

        // Non-numeric ids do not move the counter.
        let next = store.upsert(payload("Next"));
        assert_eq!(next.id, "1");
    }

    #[test]
    fn test_latest_matches_last_save() {
        let store = store();
        assert!(store.latest().is_none());

        store.upsert(payload("A"));
        let saved = store.upsert(payload("B"));
        assert_eq!(store.latest(), Some(saved.clone()));
        assert_eq!(store.get("2"), Some(saved));
        assert_eq!(store.get("99"), None);
    }

    #[test]
    fn test_list_is_idempotent() {
        let store = store();
        store.upsert(payload("A"));
        store.upsert(payload("B"));
        assert_eq!(store.list(), store.list());
    }

    #[test]
    fn test_new_session_clears_documents() {
        let storage = Storage::in_memory();
        {
            let store = DocumentStore::open(storage.clone(), StoreStamp::new("one"));
            store.upsert(payload("A"));
        }

        let same = DocumentStore::open(storage.clone(), StoreStamp::new("one"));
        assert_eq!(same.len(), 1);

        let resumed = DocumentStore::resume(storage.clone());
        assert_eq!(resumed.stamp().session, "one");
        assert_eq!(resumed.len(), 1);

        let fresh = DocumentStore::open(storage, StoreStamp::new("two"));
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_corrupt_collection_reads_as_empty() {
        let storage = Storage::in_memory();
        let store = DocumentStore::open(storage.clone(), StoreStamp::new("s"));
        storage.persist_raw(keys::DOCUMENTS, "{broken");

        assert!(store.list().is_empty());
        let doc = store.upsert(payload("A"));
        assert_eq!(doc.id, "1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unparseable_entries_keep_their_ids() {
        let storage = Storage::in_memory();
        let store = DocumentStore::open(storage.clone(), StoreStamp::new("s"));
        storage.persist_raw(
            keys::DOCUMENTS,
            r#"[{"id":"4","title":"ok","category":"Maps","savedAt":"2025-01-01T00:00:00Z"},{"id":"5","title":"legacy","category":"maps"}]"#,
        );

        let docs = store.list();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].category, Category::Maps);

        let created = store.upsert(payload("B"));
        assert_eq!(created.id, "6");

        let raw: Vec<Value> = storage.load(keys::DOCUMENTS).unwrap();
        let ids: Vec<String> = raw.iter().map(entry_id).collect();
        assert_eq!(ids, vec!["6", "4", "5"]);
        assert_eq!(raw[2]["title"], "legacy");
        assert!(raw[2].get("savedAt").is_none());
    }

    #[test]
    fn test_saving_over_unparseable_entry_replaces_it() {
        let storage = Storage::in_memory();
        let store = DocumentStore::open(storage.clone(), StoreStamp::new("s"));
        storage.persist_raw(keys::DOCUMENTS, r#"[{"id":5,"title":"legacy"}]"#);

        let saved = store.upsert(payload("Repaired").with_id("5"));
        assert_eq!(saved.id, "5");

        let raw: Vec<Value> = storage.load(keys::DOCUMENTS).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(store.get("5"), Some(saved));
    }

    #[test]
    fn test_concurrent_creates_get_distinct_ids() {
        let store = store();
        let threads = 8;
        let per_thread = 10;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let store = store.clone();
                scope.spawn(move || {
                    for i in 0..per_thread {
                        store.upsert(payload(&format!("T{}-{}", t, i)));
                    }
                });
            }
        });

        let docs = store.list();
        assert_eq!(docs.len(), threads * per_thread);
        let mut ids: Vec<u64> = docs.iter().map(|d| d.id.parse().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (1..=(threads * per_thread) as u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_unavailable_backend_never_fails() {
        let store = DocumentStore::open(Storage::new(UnavailableStore), StoreStamp::new("s"));

        let doc = store.upsert(payload("A"));
        assert_eq!(doc.id, "1");
        assert!(store.list().is_empty());
        assert!(store.latest().is_none());
    }
}
