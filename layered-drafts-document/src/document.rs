//! Document shapes: a JSON object with a `sections` array, or plain text
//! split into paragraphs.
//!
//! Blocks are the editable unit. For a sectioned document a block is a
//! section body; headers and every other field are carried through
//! untouched. For plain text a block is a paragraph; the whitespace around
//! and between paragraphs is kept so that reconstructing a document from its
//! own blocks gives the input back byte for byte.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Separator used when a document gains paragraphs it did not have.
pub const PARAGRAPH_BREAK: &str = "\n\n";

// Blank line(s), with any trailing spaces before them and indentation after.
static PARAGRAPH_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\r?\n[ \t\r]*\n\s*").unwrap());

/// Why a text is not a sectioned document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a sectioned document: {0}")]
    Shape(String),
}

/// One `{id, header?, body}` entry of a sectioned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub header: Option<String>,
    pub body: String,
}

impl Section {
    pub fn new(id: impl Into<Value>, header: Option<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header,
            body: body.into(),
        }
    }
}

/// A JSON document with a `sections` array.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionedDocument {
    raw: Map<String, Value>,
    sections: Vec<Section>,
    pretty: bool,
}

impl SectionedDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        let raw = match value {
            Value::Object(map) => map,
            _ => return Err(DocumentError::Shape("top level is not an object".into())),
        };
        let entries = raw
            .get("sections")
            .and_then(Value::as_array)
            .ok_or_else(|| DocumentError::Shape("missing `sections` array".into()))?;

        let mut sections = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            sections.push(parse_section(idx, entry)?);
        }
        Ok(Self {
            raw,
            sections,
            pretty: text.contains('\n'),
        })
    }

    /// Build a document around `sections`, keeping other top-level fields of
    /// `self`.
    pub fn with_sections(&self, sections: Vec<Section>) -> Self {
        let mut raw = self.raw.clone();
        raw.insert(
            "sections".to_string(),
            Value::Array(sections.iter().map(section_value).collect()),
        );
        Self {
            raw,
            sections,
            pretty: self.pretty,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.body.clone()).collect()
    }

    /// Replace section bodies with `blocks`, by position.
    ///
    /// Sections without a matching block keep their body. Extra blocks become
    /// new sections with the next numeric id and a null header.
    pub fn render(&self, blocks: &[String]) -> String {
        let mut raw = self.raw.clone();
        if let Some(Value::Array(entries)) = raw.get_mut("sections") {
            for (entry, block) in entries.iter_mut().zip(blocks) {
                if let Some(object) = entry.as_object_mut() {
                    object.insert("body".to_string(), Value::String(block.clone()));
                }
            }
            let existing = entries.len();
            for (offset, block) in blocks.iter().enumerate().skip(existing) {
                entries.push(section_value(&Section::new(offset + 1, None, block.clone())));
            }
        }

        let value = Value::Object(raw);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        // Serializing a `Value` cannot fail: all map keys are strings.
        rendered.unwrap_or_default()
    }
}

fn parse_section(idx: usize, entry: &Value) -> Result<Section, DocumentError> {
    let object = entry
        .as_object()
        .ok_or_else(|| DocumentError::Shape(format!("section {} is not an object", idx)))?;
    let body = object
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentError::Shape(format!("section {} has no string `body`", idx)))?;
    let header = match object.get("header") {
        None | Some(Value::Null) => None,
        Some(Value::String(h)) => Some(h.clone()),
        Some(_) => {
            return Err(DocumentError::Shape(format!(
                "section {} has a non-string `header`",
                idx
            )))
        }
    };
    Ok(Section {
        id: object.get("id").cloned().unwrap_or(Value::Null),
        header,
        body: body.to_string(),
    })
}

fn section_value(section: &Section) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), section.id.clone());
    object.insert(
        "header".to_string(),
        section
            .header
            .clone()
            .map_or(Value::Null, Value::String),
    );
    object.insert("body".to_string(), Value::String(section.body.clone()));
    Value::Object(object)
}

/// Plain text split into paragraphs, with the surrounding whitespace kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTextDocument {
    leading: String,
    paragraphs: Vec<String>,
    separators: Vec<String>,
    trailing: String,
}

impl FlatTextDocument {
    pub fn parse(text: &str) -> Self {
        let start = text.len() - text.trim_start().len();
        let end = start + text[start..].trim_end().len();
        let core = &text[start..end];

        let mut paragraphs = Vec::new();
        let mut separators = Vec::new();
        if !core.is_empty() {
            let mut cursor = 0;
            for separator in PARAGRAPH_SEPARATOR.find_iter(core) {
                paragraphs.push(core[cursor..separator.start()].to_string());
                separators.push(separator.as_str().to_string());
                cursor = separator.end();
            }
            paragraphs.push(core[cursor..].to_string());
        }

        Self {
            leading: text[..start].to_string(),
            paragraphs,
            separators,
            trailing: text[end..].to_string(),
        }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Replace paragraphs with `blocks`, by position.
    ///
    /// Paragraphs without a matching block are kept. Extra blocks are added
    /// after a blank line.
    pub fn render(&self, blocks: &[String]) -> String {
        let count = blocks.len().max(self.paragraphs.len());
        let mut out = self.leading.clone();
        for i in 0..count {
            if i > 0 {
                out.push_str(
                    self.separators
                        .get(i - 1)
                        .map_or(PARAGRAPH_BREAK, String::as_str),
                );
            }
            let paragraph = blocks.get(i).or_else(|| self.paragraphs.get(i));
            if let Some(paragraph) = paragraph {
                out.push_str(paragraph);
            }
        }
        out.push_str(&self.trailing);
        out
    }
}

/// The two document shapes a draft can take.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentShape {
    Sectioned(SectionedDocument),
    FlatText(FlatTextDocument),
}

impl DocumentShape {
    /// Detect the shape. Anything that is not a well-formed sectioned JSON
    /// document is plain text.
    pub fn parse(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            match SectionedDocument::parse(text) {
                Ok(document) => return DocumentShape::Sectioned(document),
                Err(err) => debug!(error = %err, "document is not sectioned JSON, using plain text"),
            }
        }
        DocumentShape::FlatText(FlatTextDocument::parse(text))
    }

    pub fn is_sectioned(&self) -> bool {
        matches!(self, DocumentShape::Sectioned(_))
    }

    pub fn blocks(&self) -> Vec<String> {
        match self {
            DocumentShape::Sectioned(doc) => doc.bodies(),
            DocumentShape::FlatText(doc) => doc.paragraphs().to_vec(),
        }
    }

    /// Section headers, `None` for every paragraph of plain text.
    pub fn headers(&self) -> Vec<Option<String>> {
        match self {
            DocumentShape::Sectioned(doc) => doc.sections().iter().map(|s| s.header.clone()).collect(),
            DocumentShape::FlatText(doc) => vec![None; doc.paragraphs().len()],
        }
    }

    pub fn render(&self, blocks: &[String]) -> String {
        match self {
            DocumentShape::Sectioned(doc) => doc.render(blocks),
            DocumentShape::FlatText(doc) => doc.render(blocks),
        }
    }
}

/// Split a document into its blocks. Never fails.
pub fn extract_blocks(text: &str) -> Vec<String> {
    DocumentShape::parse(text).blocks()
}

/// Rebuild `original` with its blocks replaced by `blocks`. Never fails.
pub fn reconstruct(original: &str, blocks: &[String]) -> String {
    DocumentShape::parse(original).render(blocks)
}
