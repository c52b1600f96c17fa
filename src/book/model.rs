use serde::{Deserialize, Serialize};

/// One node of a book's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TocEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, path: impl Into<String>, level: usize) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            level,
            children: Vec::new(),
        }
    }

    /// Entries with a content path are chapters, the rest are section headings.
    pub fn is_chapter(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Root-level entries, in manifest order.
pub type Toc = Vec<TocEntry>;

/// Outcome of parsing a summary manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParsedSummary {
    pub toc: Toc,
    /// Empty when no entry links to a content file.
    pub first_chapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Chapter {
    pub path: String,
    pub content: String,
}

/// Everything the UI needs to show a freshly opened book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookData {
    pub toc: Toc,
    pub initial_markdown: String,
    pub initial_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookData {
    pub fn empty() -> Self {
        Self::default()
    }
}
