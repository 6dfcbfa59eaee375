//! View models for the home feed and the history page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wiki_core::content;
use wiki_core::history::GUEST_EDITOR;
use wiki_core::{Category, Document, Draft, HistoryEntry, HistoryLog};

/// Items shown in the "recent documents" section.
pub const RECENT_LIMIT: usize = 6;

pub const EXCERPT_CHARS: usize = 120;

/// Title shown for documents and history rows that have none.
pub const FALLBACK_TITLE: &str = "Document";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub saved_at: DateTime<Utc>,
    pub excerpt: String,
}

impl FeedItem {
    pub fn from_document(doc: &Document) -> Self {
        let id = if doc.id.trim().is_empty() {
            doc.saved_at.to_rfc3339()
        } else {
            doc.id.clone()
        };
        Self {
            id,
            title: doc
                .display_title()
                .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            category: doc.category.label().to_string(),
            saved_at: doc.saved_at,
            excerpt: content::excerpt(&doc.content, EXCERPT_CHARS),
        }
    }
}

/// Home feed over a document listing, most recently saved first.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    items: Vec<FeedItem>,
}

impl Feed {
    pub fn new(documents: &[Document]) -> Self {
        Self {
            items: documents.iter().map(FeedItem::from_document).collect(),
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn recent(&self) -> &[FeedItem] {
        &self.items[..self.items.len().min(RECENT_LIMIT)]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Card in the home page category grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCard {
    pub category: Category,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<Category> for CategoryCard {
    fn from(category: Category) -> Self {
        Self {
            category,
            title: category.label(),
            description: category.description(),
        }
    }
}

/// One card per category, in display order.
pub fn category_cards() -> Vec<CategoryCard> {
    Category::ALL.into_iter().map(CategoryCard::from).collect()
}

/// One row of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub title: String,
    pub editor_id: String,
    pub edited_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryRow {
    fn from(entry: HistoryEntry) -> Self {
        let title = entry.title.trim();
        let editor_id = entry.editor_id.trim();
        Self {
            title: if title.is_empty() { FALLBACK_TITLE } else { title }.to_string(),
            editor_id: if editor_id.is_empty() { GUEST_EDITOR } else { editor_id }.to_string(),
            edited_at: entry.edited_at,
        }
    }
}

/// Edit history of the document the draft is bound to.
#[derive(Debug, Clone)]
pub struct HistoryView {
    document_id: Option<String>,
    rows: Vec<HistoryRow>,
}

impl HistoryView {
    pub fn load(draft: &Draft, history: &HistoryLog) -> Self {
        let document_id = draft.meta().document_id().map(str::to_string);
        let rows = match &document_id {
            Some(id) => history.query(id).into_iter().map(HistoryRow::from).collect(),
            None => Vec::new(),
        };
        Self { document_id, rows }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn has_document(&self) -> bool {
        self.document_id.is_some()
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiki_core::{RichNode, Storage};

    fn doc(id: &str, title: &str, content: RichNode) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            category: Category::Maps,
            content,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_fallbacks() {
        let extracted = doc(
            "3",
            "  ",
            RichNode::doc(vec![RichNode::heading(1, "Saint Morning"), RichNode::paragraph("town")]),
        );
        let item = FeedItem::from_document(&extracted);
        assert_eq!(item.title, "Saint Morning");
        assert_eq!(item.category, "Regions");
        assert_eq!(item.excerpt, "town");

        let bare = doc("", "", RichNode::doc(Vec::new()));
        let item = FeedItem::from_document(&bare);
        assert_eq!(item.title, FALLBACK_TITLE);
        assert_eq!(item.id, bare.saved_at.to_rfc3339());
    }

    #[test]
    fn test_recent_is_capped() {
        let docs: Vec<Document> = (1..=8)
            .map(|i| doc(&i.to_string(), &format!("Doc {}", i), RichNode::doc(Vec::new())))
            .collect();
        let feed = Feed::new(&docs);

        assert_eq!(feed.len(), 8);
        assert_eq!(feed.recent().len(), RECENT_LIMIT);
        assert_eq!(feed.recent()[0].id, "1");

        let small = Feed::new(&docs[..2]);
        assert_eq!(small.recent().len(), 2);
        assert!(Feed::new(&[]).is_empty());
    }

    #[test]
    fn test_category_cards() {
        let cards = category_cards();
        assert_eq!(cards.len(), Category::ALL.len());
        assert_eq!(cards[0].category, Category::Jobs);
        assert_eq!(cards[0].description, "Classes, skills and builds");

        let maps = cards.iter().find(|c| c.category == Category::Maps).unwrap();
        assert_eq!(maps.title, "Regions");
        assert_eq!(maps.description, "Hunting grounds, dungeons and travel");
    }

    #[test]
    fn test_history_view_follows_draft() {
        let storage = Storage::in_memory();
        let draft = Draft::new(storage.clone());
        let history = HistoryLog::new(storage);

        let view = HistoryView::load(&draft, &history);
        assert!(!view.has_document());
        assert!(view.rows().is_empty());

        let saved = doc("7", "Mars Mine", RichNode::doc(Vec::new()));
        history.append(HistoryEntry::for_save(&saved, "", ""));
        draft.select(&saved);

        let view = HistoryView::load(&draft, &history);
        assert_eq!(view.document_id(), Some("7"));
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.rows()[0].title, FALLBACK_TITLE);
        assert_eq!(view.rows()[0].editor_id, GUEST_EDITOR);
    }
}
