//! Parser for the `SUMMARY.md` manifest that lays out a book.
//!
//! The manifest is a markdown list where every entry is a link:
//!
//! ```text
//! - [Introduction](./intro.md)
//! - [Part I]()
//!   - [Getting started](part1/start.md)
//! ```
//!
//! Two leading whitespace characters make one level of nesting. Lines that are
//! not list items are ignored, and list items without a link are logged and
//! skipped.

use super::config::CONTENT_EXTENSION;
use super::model::{ParsedSummary, Toc, TocEntry};
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Only ASCII whitespace indents or separates the marker from the link.
static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<indent>[\t\n\f\r ]*)[-*][\t\n\f\r ]*",
        r"\[(?P<title>[^\]]+)\]\((?P<path>[^)]*)\)",
    ))
    .expect("summary entry pattern compiles")
});

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary manifest not found at {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to open summary manifest at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read summary manifest at line {line}: {source}")]
    Scan {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Opens and parses the manifest at `path`.
pub fn parse_summary_file(path: &Path) -> Result<ParsedSummary, SummaryError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => SummaryError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SummaryError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_summary(BufReader::new(file))
}

/// Parses a manifest from an already opened source.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected. A read
/// failure discards everything built so far.
pub fn parse_summary<R: BufRead>(reader: R) -> Result<ParsedSummary, SummaryError> {
    let mut builder = TocBuilder::new();
    let mut first_chapter: Option<String> = None;

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes.map_err(|source| SummaryError::Scan {
            line: index + 1,
            source,
        })?;
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
        let line = String::from_utf8_lossy(bytes);

        let Some(entry) = classify_line(&line) else {
            continue;
        };

        if first_chapter.is_none() && is_chapter_path(&entry.path) {
            first_chapter = Some(entry.path.clone());
        }
        builder.push(entry);
    }

    let toc = builder.finish();
    let first_chapter = match first_chapter {
        Some(path) => path,
        None if !toc.is_empty() => find_first_chapter(&toc)
            .map(str::to_string)
            .unwrap_or_default(),
        None => String::new(),
    };

    Ok(ParsedSummary { toc, first_chapter })
}

/// True for non-empty paths ending in the content extension, ignoring case.
pub fn is_chapter_path(path: &str) -> bool {
    !path.is_empty() && path.to_lowercase().ends_with(CONTENT_EXTENSION)
}

/// Depth-first, parents before children.
pub fn find_first_chapter(toc: &[TocEntry]) -> Option<&str> {
    let mut pending: Vec<&TocEntry> = toc.iter().rev().collect();
    while let Some(entry) = pending.pop() {
        if is_chapter_path(&entry.path) {
            return Some(entry.path.as_str());
        }
        pending.extend(entry.children.iter().rev());
    }
    None
}

fn classify_line(line: &str) -> Option<TocEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !starts_with_list_marker(trimmed) {
        return None;
    }

    let Some(captures) = ENTRY_PATTERN.captures(line) else {
        debug!("skipping summary line without a link: {line}");
        return None;
    };

    let level = captures["indent"].len() / 2;
    let title = captures["title"].trim();
    let path = captures["path"].trim();
    let path = path.strip_prefix("./").unwrap_or(path);

    Some(TocEntry::new(title, path, level))
}

fn starts_with_list_marker(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    matches!(chars.next(), Some('-' | '*')) && chars.next().is_some_and(char::is_whitespace)
}

struct TocNode {
    entry: TocEntry,
    children: Vec<usize>,
}

/// Index arena that assembles the forest in one forward pass.
///
/// `frames` holds the node whose children receive new entries; `None` is the
/// root list and is never popped.
struct TocBuilder {
    nodes: Vec<TocNode>,
    roots: Vec<usize>,
    frames: Vec<Option<usize>>,
    last_level: Option<usize>,
}

impl TocBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            frames: vec![None],
            last_level: None,
        }
    }

    fn push(&mut self, entry: TocEntry) {
        let level = entry.level;

        match self.last_level {
            Some(last) if level == last => {}
            Some(last) if level < last => {
                for _ in 0..(last - level) {
                    if self.frames.len() > 1 {
                        self.frames.pop();
                    }
                }
            }
            // Deeper than the previous entry (or the very first one). A jump of
            // several levels still opens a single frame.
            _ => {
                if let Some(&previous) = self.siblings(self.current_frame()).last() {
                    self.frames.push(Some(previous));
                }
            }
        }

        let index = self.nodes.len();
        self.nodes.push(TocNode {
            entry,
            children: Vec::new(),
        });
        match self.current_frame() {
            Some(parent) => self.nodes[parent].children.push(index),
            None => self.roots.push(index),
        }
        self.last_level = Some(level);
    }

    fn current_frame(&self) -> Option<usize> {
        self.frames.last().copied().flatten()
    }

    fn siblings(&self, frame: Option<usize>) -> &[usize] {
        match frame {
            Some(parent) => &self.nodes[parent].children,
            None => &self.roots,
        }
    }

    /// Children always have a larger index than their parent, so walking the
    /// arena backwards finishes every subtree before it is attached.
    fn finish(self) -> Toc {
        let mut slots = Vec::with_capacity(self.nodes.len());
        let mut child_lists = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            slots.push(Some(node.entry));
            child_lists.push(node.children);
        }

        for index in (0..slots.len()).rev() {
            let children: Vec<TocEntry> = child_lists[index]
                .iter()
                .filter_map(|&child| slots[child].take())
                .collect();
            if let Some(entry) = slots[index].as_mut() {
                entry.children = children;
            }
        }

        self.roots
            .iter()
            .filter_map(|&root| slots[root].take())
            .collect()
    }
}
