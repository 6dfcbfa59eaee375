//! The save flow behind the editor page.

use wiki_core::content::{self, RichNode};
use wiki_core::{Category, Document, DocumentPayload, Draft, HistoryEntry, HistoryLog, Storage};

use crate::error::Result;
use crate::service::DocumentService;
use crate::transport::Transport;

pub const SAVED_MESSAGE: &str = "Document saved.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save the document. Please try again.";

/// Editor state plus the service it saves through.
pub struct Editor<T> {
    service: DocumentService<T>,
    draft: Draft,
    history: HistoryLog,
}

impl<T: Transport> Editor<T> {
    pub fn new(service: DocumentService<T>, storage: Storage) -> Self {
        Self {
            service,
            draft: Draft::new(storage.clone()),
            history: HistoryLog::new(storage),
        }
    }

    pub fn service(&self) -> &DocumentService<T> {
        &self.service
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Save the working copy.
    ///
    /// The title is written into the content's H1 and sent alongside it.
    /// When the draft is bound to a document the save updates it, otherwise
    /// a new document is created. Only a successful save updates the draft
    /// and records a history entry.
    pub async fn save(&self, title: &str, category: Category, content: &RichNode) -> Result<Document> {
        let title = content::normalize_title(title);
        let content = content::apply_title(content, &title);

        let mut payload = DocumentPayload::new(title.clone(), category, content.clone());
        if let Some(id) = self.draft.meta().document_id() {
            payload = payload.with_id(id);
        }

        let saved = self.service.save(&payload).await?;

        self.draft.record_save(&saved, &content);
        self.history
            .append(HistoryEntry::for_save(&saved, &title, &self.draft.editor_id()));

        tracing::info!("Saved document {} as {:?}", saved.id, title);
        Ok(saved)
    }
}

/// Status line shown after a save attempt.
pub fn status_message<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => SAVED_MESSAGE,
        Err(_) => SAVE_FAILED_MESSAGE,
    }
}
