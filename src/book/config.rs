use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SUMMARY_FILE: &str = "SUMMARY.md";
pub const DEFAULT_CHAPTER: &str = "README.md";
pub const CONTENT_EXTENSION: &str = ".md";

/// Where a book lives on disk and how its manifest is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Directory every chapter path is resolved against.
    pub root: PathBuf,
    pub summary_file: String,
    /// Opened when the manifest links no chapter.
    pub default_chapter: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("book"),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
            default_chapter: DEFAULT_CHAPTER.to_string(),
        }
    }
}

impl BookConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(&self.summary_file)
    }
}
