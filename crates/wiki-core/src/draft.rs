//! Editor-side state: the working copy of the open document, its metadata,
//! and the identity recorded on history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::content::{self, RichNode};
use crate::document::Document;
use crate::history::GUEST_EDITOR;
use crate::storage::{Storage, keys};

/// Metadata of the document open in the editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMeta {
    /// Document the draft saves into; `None` for a new document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DraftMeta {
    /// Bound document id, ignoring blank values.
    pub fn document_id(&self) -> Option<&str> {
        self.document_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Draft state over a [`Storage`].
#[derive(Debug, Clone)]
pub struct Draft {
    storage: Storage,
}

impl Draft {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Stored working copy, or the starter document.
    pub fn content(&self) -> RichNode {
        self.storage
            .load(keys::DRAFT_CONTENT)
            .unwrap_or_else(content::default_document)
    }

    /// Replace the working copy without saving.
    pub fn set_content(&self, doc: &RichNode) {
        self.storage.persist(keys::DRAFT_CONTENT, doc);
    }

    pub fn meta(&self) -> DraftMeta {
        self.storage.load(keys::DRAFT_META).unwrap_or_default()
    }

    pub fn set_meta(&self, meta: &DraftMeta) {
        self.storage.persist(keys::DRAFT_META, meta);
    }

    /// Title shown in the editor: the working copy's H1, or the default.
    pub fn title(&self) -> String {
        content::extract_title(&self.content()).unwrap_or_else(|| content::DEFAULT_TITLE.to_string())
    }

    /// Configured editor identity, or [`GUEST_EDITOR`].
    pub fn editor_id(&self) -> String {
        self.storage
            .load_raw(keys::EDITOR_ID)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| GUEST_EDITOR.to_string())
    }

    pub fn set_editor_id(&self, editor_id: &str) {
        self.storage.persist_raw(keys::EDITOR_ID, editor_id.trim());
    }

    /// Remember a successful save: the saved content becomes the working copy
    /// and the draft is bound to the saved document.
    pub fn record_save(&self, saved: &Document, content: &RichNode) {
        self.set_content(content);
        self.set_meta(&DraftMeta {
            document_id: Some(saved.id.clone()).filter(|id| !id.trim().is_empty()),
            category: saved.category,
            updated_at: Some(saved.saved_at),
        });
    }

    /// Open a listed document for viewing.
    ///
    /// Documents without a tree get a placeholder so the viewer has
    /// something to render.
    pub fn select(&self, doc: &Document) {
        let view = if doc.content.kind == "doc" && !doc.content.children().is_empty() {
            doc.content.clone()
        } else {
            content::placeholder_document(&doc.display_title().unwrap_or_default())
        };
        self.set_content(&view);
        self.set_meta(&DraftMeta {
            document_id: Some(doc.id.clone()).filter(|id| !id.trim().is_empty()),
            category: doc.category,
            updated_at: Some(doc.saved_at),
        });
    }

    /// Forget the working copy so the editor starts a new document.
    pub fn reset(&self) {
        self.storage.remove(keys::DRAFT_CONTENT);
        self.storage.remove(keys::DRAFT_META);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UnavailableStore;

    fn saved_doc(id: &str, content: RichNode) -> Document {
        Document {
            id: id.to_string(),
            title: "Monsters of Flaris".to_string(),
            category: Category::Monsters,
            content,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_defaults_without_stored_state() {
        let draft = Draft::new(Storage::in_memory());

        assert_eq!(draft.content(), content::default_document());
        assert_eq!(draft.meta(), DraftMeta::default());
        assert_eq!(draft.title(), "Heading 1");
        assert_eq!(draft.editor_id(), GUEST_EDITOR);
    }

    #[test]
    fn test_editor_id_is_trimmed() {
        let draft = Draft::new(Storage::in_memory());
        draft.set_editor_id("  alice ");
        assert_eq!(draft.editor_id(), "alice");

        draft.set_editor_id("   ");
        assert_eq!(draft.editor_id(), GUEST_EDITOR);
    }

    #[test]
    fn test_record_save_binds_document() {
        let draft = Draft::new(Storage::in_memory());
        let content = RichNode::doc(vec![RichNode::heading(1, "Aibatt")]);
        let doc = saved_doc("3", content.clone());

        draft.record_save(&doc, &content);

        assert_eq!(draft.content(), content);
        assert_eq!(draft.title(), "Aibatt");
        let meta = draft.meta();
        assert_eq!(meta.document_id(), Some("3"));
        assert_eq!(meta.category, Category::Monsters);
        assert_eq!(meta.updated_at, Some(doc.saved_at));
    }

    #[test]
    fn test_select_uses_placeholder_for_empty_tree() {
        let draft = Draft::new(Storage::in_memory());
        draft.select(&saved_doc("8", content::empty_document()));

        assert_eq!(draft.title(), "Monsters of Flaris");
        assert_eq!(draft.meta().document_id(), Some("8"));
    }

    #[test]
    fn test_reset_starts_new_document() {
        let draft = Draft::new(Storage::in_memory());
        let content = RichNode::doc(vec![RichNode::heading(1, "Old")]);
        draft.record_save(&saved_doc("1", content.clone()), &content);

        draft.reset();

        assert_eq!(draft.meta().document_id(), None);
        assert_eq!(draft.content(), content::default_document());
    }

    #[test]
    fn test_corrupt_meta_reads_as_default() {
        let storage = Storage::in_memory();
        storage.persist_raw(keys::DRAFT_META, "nope");
        storage.persist_raw(keys::DRAFT_CONTENT, "[1, 2]");
        let draft = Draft::new(storage);

        assert_eq!(draft.meta(), DraftMeta::default());
        assert_eq!(draft.content(), content::default_document());
    }

    #[test]
    fn test_unavailable_backend_uses_defaults() {
        let draft = Draft::new(Storage::new(UnavailableStore));
        draft.set_editor_id("bob");
        assert_eq!(draft.editor_id(), GUEST_EDITOR);
        assert_eq!(draft.meta().document_id(), None);
    }
}
