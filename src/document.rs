//! Rich-text document model.
//!
//! The content store delivers an article body as a JSON array of block
//! nodes (`{type, children, level?, format?}`) whose children are inline text
//! nodes. Parsing is permissive: unknown nodes are skipped and malformed
//! fields fall back to defaults. Only a non-array top level is an error.

use serde::Serialize;
use serde_json::Value;

use crate::diagnostic::{DiagnosticSink, LayoutDiagnostic, LogDiagnostics};
use crate::error::LayoutError;

/// One inline text run with its marks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// Run text, verbatim.
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
    /// Link target when the run sits inside a link node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextRun {
    /// Plain, unmarked run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// List numbering style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFormat {
    Ordered,
    Unordered,
}

/// Block kind tag, used for diagnostics and summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Quote,
}

/// One unit of textual content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph {
        children: Vec<TextRun>,
    },
    Heading {
        /// Heading level, always within `1..=6`.
        level: u8,
        children: Vec<TextRun>,
    },
    List {
        format: ListFormat,
        /// One run sequence per list item.
        items: Vec<Vec<TextRun>>,
    },
    Quote {
        children: Vec<TextRun>,
    },
}

impl ContentBlock {
    /// Paragraph made of a single plain run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            children: vec![TextRun::plain(text)],
        }
    }

    /// Heading made of a single plain run; `level` is clamped to `1..=6`.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level: level.clamp(1, 6),
            children: vec![TextRun::plain(text)],
        }
    }

    /// Quote made of a single plain run.
    pub fn quote(text: impl Into<String>) -> Self {
        Self::Quote {
            children: vec![TextRun::plain(text)],
        }
    }

    /// List with one plain run per item.
    pub fn list<I, S>(format: ListFormat, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List {
            format,
            items: items
                .into_iter()
                .map(|item| vec![TextRun::plain(item)])
                .collect(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Paragraph { .. } => BlockKind::Paragraph,
            Self::Heading { .. } => BlockKind::Heading,
            Self::List { .. } => BlockKind::List,
            Self::Quote { .. } => BlockKind::Quote,
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph { .. })
    }

    /// Concatenated text of the block; list items are joined by newlines.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::Quote { children } => concat_runs(children),
            Self::List { items, .. } => items
                .iter()
                .map(|item| concat_runs(item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn concat_runs(runs: &[TextRun]) -> String {
    let mut out = String::with_capacity(runs.iter().map(|run| run.text.len()).sum());
    for run in runs {
        out.push_str(&run.text);
    }
    out
}

/// Parse a document, logging skipped entries.
pub fn parse_document(value: &Value) -> Result<Vec<ContentBlock>, LayoutError> {
    parse_document_with(value, &mut LogDiagnostics)
}

/// Parse a document from JSON text.
pub fn parse_document_str(json: &str) -> Result<Vec<ContentBlock>, LayoutError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| LayoutError::invalid_input("document", err.to_string()))?;
    parse_document(&value)
}

/// Parse a document, reporting skipped entries to `sink`.
///
/// Returns [`LayoutError::InvalidInput`] only when `value` is not an array.
pub fn parse_document_with(
    value: &Value,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ContentBlock>, LayoutError> {
    let Some(nodes) = value.as_array() else {
        log::warn!("rejecting document: expected array, got {}", json_kind(value));
        return Err(LayoutError::invalid_input(
            "document",
            format!("expected array, got {}", json_kind(value)),
        ));
    };

    let mut blocks = Vec::with_capacity(nodes.len());
    for (block_index, node) in nodes.iter().enumerate() {
        match parse_block(node) {
            Some(block) => blocks.push(block),
            None => sink.report(LayoutDiagnostic::BlockSkipped {
                block_index,
                kind: node_type(node).unwrap_or("<missing>").into(),
            }),
        }
    }
    Ok(blocks)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn node_type(node: &Value) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

/// Node type trimmed and lowercased; content stores disagree on casing.
fn node_kind(node: &Value) -> Option<String> {
    node_type(node).map(|kind| kind.trim().to_ascii_lowercase())
}

fn parse_block(node: &Value) -> Option<ContentBlock> {
    let kind = node_kind(node)?;
    match kind.as_str() {
        "paragraph" => Some(ContentBlock::Paragraph {
            children: parse_inline(node.get("children")),
        }),
        "heading" => Some(ContentBlock::Heading {
            level: parse_heading_level(node.get("level")),
            children: parse_inline(node.get("children")),
        }),
        "list" => Some(ContentBlock::List {
            format: parse_list_format(node.get("format")),
            items: parse_list_items(node.get("children")),
        }),
        "quote" => Some(ContentBlock::Quote {
            children: parse_inline(node.get("children")),
        }),
        _ => None,
    }
}

fn parse_heading_level(value: Option<&Value>) -> u8 {
    let level = match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(2),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(2),
        _ => 2,
    };
    level.clamp(1, 6) as u8
}

fn parse_list_format(value: Option<&Value>) -> ListFormat {
    match value.and_then(Value::as_str) {
        Some(s) if s.trim().eq_ignore_ascii_case("ordered") => ListFormat::Ordered,
        _ => ListFormat::Unordered,
    }
}

fn parse_list_items(children: Option<&Value>) -> Vec<Vec<TextRun>> {
    let Some(children) = children.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut items = Vec::with_capacity(children.len());
    for child in children {
        match node_kind(child).as_deref() {
            Some("list-item") | Some("list_item") => {
                items.push(parse_inline(child.get("children")))
            }
            Some("text") | Some("link") => {
                let mut runs = Vec::with_capacity(1);
                push_inline(child, None, &mut runs);
                items.push(runs);
            }
            // Nested lists flatten into the parent's items.
            Some("list") => items.extend(parse_list_items(child.get("children"))),
            _ => {}
        }
    }
    items
}

fn parse_inline(children: Option<&Value>) -> Vec<TextRun> {
    let Some(children) = children.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut runs = Vec::with_capacity(children.len());
    for child in children {
        push_inline(child, None, &mut runs);
    }
    runs
}

fn push_inline(node: &Value, link: Option<&str>, out: &mut Vec<TextRun>) {
    match node_kind(node).as_deref() {
        Some("link") => {
            let href = node.get("url").and_then(Value::as_str).or(link);
            if let Some(children) = node.get("children").and_then(Value::as_array) {
                for child in children {
                    push_inline(child, href, out);
                }
            }
        }
        // Untyped nodes carrying text are treated as text runs.
        Some("text") | None => {
            let Some(text) = node.get("text").and_then(Value::as_str) else {
                return;
            };
            out.push(TextRun {
                text: text.to_string(),
                bold: mark(node, "bold"),
                italic: mark(node, "italic"),
                underline: mark(node, "underline"),
                strikethrough: mark(node, "strikethrough"),
                code: mark(node, "code"),
                link: link.map(str::to_string),
            });
        }
        Some(_) => {
            if let Some(children) = node.get("children").and_then(Value::as_array) {
                for child in children {
                    push_inline(child, link, out);
                }
            }
        }
    }
}

fn mark(node: &Value, key: &str) -> bool {
    node.get(key).and_then(Value::as_bool).unwrap_or(false)
}
