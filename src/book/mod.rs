mod config;
mod model;
mod service;
pub mod summary;

pub use config::{BookConfig, DEFAULT_CHAPTER, DEFAULT_SUMMARY_FILE};
pub use model::{BookData, Chapter, ParsedSummary, Toc, TocEntry};
pub use service::{BookService, ContentError};
pub use summary::SummaryError;
