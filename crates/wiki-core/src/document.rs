//! Documents and save payloads.
//!
//! Save payloads arrive as arbitrary JSON from the editor. They are decoded
//! once, here, into a [`DocumentPayload`]; anything malformed is rejected
//! with a [`PayloadError`] instead of being defaulted deeper in the stack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::category::{Category, UnknownCategory};
use crate::content::{self, RichNode};
use crate::identity::{deserialize_id, normalize_id_value};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed JSON body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Document payload must be a JSON object")]
    NotAnObject,

    #[error("Field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Category(#[from] UnknownCategory),

    #[error("Invalid document content: {0}")]
    Content(String),

    #[error("Document content must be rooted at a `doc` node, found `{0}`")]
    ContentRoot(String),
}

/// A saved wiki document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "content::empty_document")]
    pub content: RichNode,
    pub saved_at: DateTime<Utc>,
}

impl Document {
    /// Title to display: the stored title, else the content's H1.
    pub fn display_title(&self) -> Option<String> {
        let title = self.title.trim();
        if title.is_empty() {
            content::extract_title(&self.content)
        } else {
            Some(title.to_string())
        }
    }
}

/// A create-or-update request for a document.
///
/// An empty `id` asks the store to allocate one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub category: Category,
    pub content: RichNode,
}

impl DocumentPayload {
    /// Payload for a new document.
    pub fn new(title: impl Into<String>, category: Category, content: RichNode) -> Self {
        Self {
            id: String::new(),
            title: Some(title.into()),
            category,
            content,
        }
    }

    /// Target an existing document.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into().trim().to_string();
        self
    }

    /// Decode and validate a request body. A blank body is `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::from_json(Value::Object(Map::new()));
        }
        Self::from_json(serde_json::from_slice(body)?)
    }

    /// Decode and validate a raw JSON payload.
    ///
    /// Missing fields default (no id, no title, first category, empty doc);
    /// present fields of the wrong shape are errors.
    pub fn from_json(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut fields) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let id = match fields.get("id") {
            None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Number(_)) => {
                normalize_id_value(fields.get("id"))
            }
            Some(_) => {
                return Err(PayloadError::InvalidField {
                    field: "id",
                    expected: "a string or number",
                });
            }
        };

        let title = match take(&mut fields, "title") {
            None => None,
            Some(Value::String(title)) => Some(title),
            Some(_) => {
                return Err(PayloadError::InvalidField {
                    field: "title",
                    expected: "a string",
                });
            }
        };

        let category = match take(&mut fields, "category") {
            None => Category::default(),
            Some(Value::String(category)) => category.parse()?,
            Some(_) => {
                return Err(PayloadError::InvalidField {
                    field: "category",
                    expected: "a string",
                });
            }
        };

        let content = match take(&mut fields, "content") {
            None => content::empty_document(),
            Some(raw) => {
                let node: RichNode = serde_json::from_value(raw)
                    .map_err(|e| PayloadError::Content(e.to_string()))?;
                if node.kind != "doc" {
                    return Err(PayloadError::ContentRoot(node.kind));
                }
                node
            }
        };

        Ok(Self {
            id,
            title,
            category,
            content,
        })
    }

    /// Title the store will save: explicit title, else the content's H1,
    /// else the default title.
    pub fn resolved_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| content::extract_title(&self.content))
            .unwrap_or_else(|| content::DEFAULT_TITLE.to_string())
    }
}

/// Remove a field, treating explicit `null` as absent.
fn take(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match fields.remove(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_payload() {
        let payload = DocumentPayload::from_json(json!({
            "id": 4,
            "title": " Blade ",
            "category": "jobs",
            "content": { "type": "doc", "content": [{ "type": "paragraph" }] }
        }))
        .unwrap();

        assert_eq!(payload.id, "4");
        assert_eq!(payload.title.as_deref(), Some(" Blade "));
        assert_eq!(payload.category, Category::Jobs);
        assert_eq!(payload.content.children().len(), 1);
        assert_eq!(payload.resolved_title(), "Blade");
    }

    #[test]
    fn test_decode_empty_object_defaults() {
        let payload = DocumentPayload::from_json(json!({})).unwrap();
        assert_eq!(payload.id, "");
        assert_eq!(payload.title, None);
        assert_eq!(payload.category, Category::Jobs);
        assert_eq!(payload.content, content::empty_document());
        assert_eq!(payload.resolved_title(), content::DEFAULT_TITLE);
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            DocumentPayload::from_json(json!([1, 2])),
            Err(PayloadError::NotAnObject)
        ));
        assert!(matches!(
            DocumentPayload::from_json(json!({ "title": 3 })),
            Err(PayloadError::InvalidField { field: "title", .. })
        ));
        assert!(matches!(
            DocumentPayload::from_json(json!({ "id": { "nested": true } })),
            Err(PayloadError::InvalidField { field: "id", .. })
        ));
        assert!(matches!(
            DocumentPayload::from_json(json!({ "category": "pets" })),
            Err(PayloadError::Category(_))
        ));
        assert!(matches!(
            DocumentPayload::from_json(json!({ "content": "hello" })),
            Err(PayloadError::Content(_))
        ));
        assert!(matches!(
            DocumentPayload::from_json(json!({ "content": { "type": "paragraph" } })),
            Err(PayloadError::ContentRoot(_))
        ));
    }

    #[test]
    fn test_decode_body() {
        let blank = DocumentPayload::from_body(b" \n").unwrap();
        assert_eq!(blank.id, "");
        assert_eq!(blank.category, Category::Jobs);

        let payload = DocumentPayload::from_body(br#"{"id":" 7 ","category":"Maps"}"#).unwrap();
        assert_eq!(payload.id, "7");
        assert_eq!(payload.category, Category::Maps);

        let err = DocumentPayload::from_body(b"{oops").unwrap_err();
        assert!(matches!(err, PayloadError::Malformed(_)));
        assert!(err.to_string().starts_with("Malformed JSON body:"));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let payload = DocumentPayload::from_json(json!({
            "title": "  ",
            "content": {
                "type": "doc",
                "content": [{ "type": "heading", "attrs": { "level": 1 }, "content": [{ "type": "text", "text": "Giant Hunting" }] }]
            }
        }))
        .unwrap();
        assert_eq!(payload.resolved_title(), "Giant Hunting");
    }

    #[test]
    fn test_payload_serializes_without_empty_id() {
        let payload = DocumentPayload::new("Maps", Category::Maps, content::empty_document());
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["category"], "maps");

        let value = serde_json::to_value(payload.with_id(" 2 ")).unwrap();
        assert_eq!(value["id"], "2");
    }

    #[test]
    fn test_document_wire_format() {
        let value = json!({
            "id": 3,
            "title": "",
            "category": "items",
            "content": { "type": "doc", "content": [{ "type": "heading", "attrs": { "level": 1 }, "content": [{ "type": "text", "text": "Wand" }] }] },
            "savedAt": "2025-01-01T00:00:00Z"
        });
        let doc: Document = serde_json::from_value(value).unwrap();
        assert_eq!(doc.id, "3");
        assert_eq!(doc.display_title().as_deref(), Some("Wand"));

        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["id"], "3");
        assert!(out.get("savedAt").is_some());
    }
}
