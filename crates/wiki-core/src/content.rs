//! Rich-text document trees as produced by the browser editor.
//!
//! A document is a tree of [`RichNode`]s rooted at a `doc` node. Block nodes
//! (`heading`, `paragraph`, `bulletList`, ...) nest other nodes through
//! `content`; leaves are `text` runs that may carry formatting `marks`.
//!
//! The editor treats the first level-1 heading as the document title, so this
//! module also owns title extraction and title application.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title used when neither the payload nor the content provides one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Text shown in the body of a placeholder document.
pub const PLACEHOLDER_BODY: &str = "No content yet. Open the editor to write this document.";

/// A formatting mark on a text run (`bold`, `italic`, `code`, `link`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

impl Mark {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: None,
        }
    }
}

/// A node in a rich-text tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichNode {
    /// Node type, e.g. `doc`, `heading`, `paragraph`, `text`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<RichNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

impl RichNode {
    /// A bare node of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    /// A `doc` root holding the given blocks.
    pub fn doc(blocks: Vec<RichNode>) -> Self {
        Self::new("doc").with_content(blocks)
    }

    /// A heading of `level` holding a single text run.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("level".to_string(), Value::from(level));
        Self {
            attrs: Some(attrs),
            ..Self::new("heading").with_content(vec![Self::text(text)])
        }
    }

    /// A paragraph holding a single text run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("paragraph").with_content(vec![Self::text(text)])
    }

    /// A text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new("text")
        }
    }

    pub fn with_content(mut self, content: Vec<RichNode>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = Some(marks);
        self
    }

    /// Heading level from `attrs.level`, if this is a heading.
    pub fn heading_level(&self) -> Option<u64> {
        if self.kind != "heading" {
            return None;
        }
        self.attrs.as_ref()?.get("level")?.as_u64()
    }

    fn is_title_heading(&self) -> bool {
        self.heading_level() == Some(1)
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[RichNode] {
        self.content.as_deref().unwrap_or_default()
    }

    /// Concatenated text of every text run below this node, without separators.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }
}

/// Text of the first top-level level-1 heading, trimmed.
///
/// Returns `None` when the document has no such heading or its text is blank.
pub fn extract_title(doc: &RichNode) -> Option<String> {
    let heading = doc.content.as_ref()?.iter().find(|n| n.is_title_heading())?;
    let title = heading.text_content().trim().to_string();
    if title.is_empty() { None } else { Some(title) }
}

/// Trimmed `title`, or [`DEFAULT_TITLE`] when blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Return a copy of `doc` whose first level-1 heading carries `title`.
///
/// - An existing H1 is replaced in place.
/// - Without an H1, one is inserted at the top.
/// - A document with no block list becomes a fresh `doc` holding only the heading.
pub fn apply_title(doc: &RichNode, title: &str) -> RichNode {
    let heading = RichNode::heading(1, normalize_title(title));

    let Some(blocks) = &doc.content else {
        return RichNode::doc(vec![heading]);
    };

    let mut blocks = blocks.clone();
    match blocks.iter().position(|n| n.is_title_heading()) {
        Some(index) => blocks[index] = heading,
        None => blocks.insert(0, heading),
    }

    RichNode {
        content: Some(blocks),
        ..doc.clone()
    }
}

/// Top-level blocks rendered as plain text, one line per non-empty block.
pub fn plain_text(doc: &RichNode) -> String {
    doc.children()
        .iter()
        .map(|block| block.text_content())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short single-line preview of the body, skipping the title heading.
///
/// Whitespace is collapsed and the result is cut to `max_chars` characters
/// with a trailing ellipsis when truncated.
pub fn excerpt(doc: &RichNode, max_chars: usize) -> String {
    let mut skipped_title = false;
    let body: Vec<String> = doc
        .children()
        .iter()
        .filter(|block| {
            if !skipped_title && block.is_title_heading() {
                skipped_title = true;
                return false;
            }
            true
        })
        .map(|block| block.text_content())
        .collect();

    let collapsed = body
        .iter()
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// An empty `doc` node.
pub fn empty_document() -> RichNode {
    RichNode::doc(Vec::new())
}

/// Document shown by the viewer for a listed entry that carries no tree.
pub fn placeholder_document(title: &str) -> RichNode {
    let title = if title.trim().is_empty() {
        "Document"
    } else {
        title.trim()
    };
    RichNode::doc(vec![
        RichNode::heading(1, title),
        RichNode::paragraph(PLACEHOLDER_BODY),
    ])
}

/// Starter document for a brand new draft, showing the supported blocks.
pub fn default_document() -> RichNode {
    let list_item = |text: &str| RichNode::new("listItem").with_content(vec![RichNode::paragraph(text)]);

    RichNode::doc(vec![
        RichNode::heading(1, "Heading 1"),
        RichNode::heading(2, "Heading 2"),
        RichNode::heading(3, "Heading 3"),
        RichNode::new("paragraph"),
        RichNode::new("bulletList").with_content(vec![list_item("List item 1"), list_item("List item 2")]),
        RichNode::new("paragraph").with_content(vec![
            RichNode::text("Bold text").with_marks(vec![Mark::new("bold")]),
            RichNode::text(" and "),
            RichNode::text("italic").with_marks(vec![Mark::new("italic")]),
            RichNode::text(" formatting"),
        ]),
        RichNode::new("paragraph")
            .with_content(vec![RichNode::text("Inline code").with_marks(vec![Mark::new("code")])]),
        RichNode::new("codeBlock").with_content(vec![RichNode::text("Code block")]),
        RichNode::new("blockquote").with_content(vec![RichNode::paragraph("Quote")]),
    ])
}
