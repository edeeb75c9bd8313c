use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata stored for one document: title and plain-text body.
/// Either field may be absent from the index blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Document store: document reference (page path) -> DocumentMeta.
/// elasticlunr stores `null` for documents indexed without being saved.
pub type DocumentStore = HashMap<String, Option<DocumentMeta>>;

/// One hit returned by the external engine, in relevance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub score: f64,
}

impl Hit {
    pub fn new(reference: impl Into<String>, score: f64) -> Self {
        Hit {
            reference: reference.into(),
            score,
        }
    }
}

/// Options forwarded to the engine's search call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    pub expand: bool,
}

/// Lowercase, whitespace-delimited query tokens
pub type QueryTerms = Vec<String>;

/// A rendered result row. `reference` doubles as the link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub reference: String,
    pub title: String,
    pub snippet_html: String,
}

impl ResultItem {
    pub fn href(&self) -> &str {
        &self.reference
    }
}

/// Lifecycle of the one index load per page.
/// `Ready` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}
