use crate::book::summary::is_chapter_path;
use crate::book::{BookData, Chapter, TocEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReaderState {
    pub active_book: Option<BookData>,
    pub current_path: Option<String>,
    /// Markdown of the chapter being read.
    current_markdown: String,
    /// Chapter paths of the active book in reading order.
    chapters: Vec<String>,
}

impl ReaderState {
    pub fn set_active_book(&mut self, book: BookData) {
        self.chapters = Self::reading_order(&book.toc);
        self.current_path = if book.initial_path.is_empty() {
            None
        } else {
            Some(book.initial_path.clone())
        };
        self.current_markdown = book.initial_markdown.clone();
        self.active_book = Some(book);
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn current_markdown(&self) -> &str {
        &self.current_markdown
    }

    /// Shows a freshly loaded chapter, wherever it sits in the book.
    pub fn show_chapter(&mut self, chapter: Chapter) {
        self.current_path = Some(chapter.path);
        self.current_markdown = chapter.content;
    }

    pub fn current_index(&self) -> Option<usize> {
        let current = self.current_path.as_deref()?;
        self.chapters.iter().position(|path| path == current)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Chapter after the current one in reading order.
    pub fn next_path(&self) -> Option<&str> {
        let next = match self.current_index() {
            Some(index) => index + 1,
            // Starting outside the TOC (e.g. the default README): the first
            // listed chapter comes next.
            None if self.active_book.is_some() => 0,
            None => return None,
        };
        self.chapters.get(next).map(String::as_str)
    }

    pub fn previous_path(&self) -> Option<&str> {
        let previous = self.current_index()?.checked_sub(1)?;
        self.chapters.get(previous).map(String::as_str)
    }

    pub fn contains_chapter(&self, path: &str) -> bool {
        self.chapters.iter().any(|chapter| chapter == path)
    }

    /// Resolves a link found inside the current chapter to a book path.
    ///
    /// Links with a scheme (`https:`, `mailto:`), in-page anchors and
    /// absolute paths are not chapter links and yield `None`.
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with('/') || has_scheme(href) {
            return None;
        }

        let href = href.split('#').next().unwrap_or(href);
        let base = self
            .current_path
            .as_deref()
            .and_then(|current| current.rsplit_once('/'))
            .map(|(dir, _)| dir)
            .unwrap_or("");

        let mut segments: Vec<&str> = Vec::new();
        for part in base.split('/').chain(href.split('/')) {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }

        let resolved = segments.join("/");
        is_chapter_path(&resolved).then_some(resolved)
    }

    fn reading_order(toc: &[TocEntry]) -> Vec<String> {
        let mut order = Vec::new();
        let mut pending: Vec<&TocEntry> = toc.iter().rev().collect();
        while let Some(entry) = pending.pop() {
            if is_chapter_path(&entry.path) && !order.contains(&entry.path) {
                order.push(entry.path.clone());
            }
            pending.extend(entry.children.iter().rev());
        }
        order
    }
}

/// `scheme ":"` per RFC 3986: a letter, then letters, digits, `+`, `-` or `.`.
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
