use super::summary::parse_summary_file;
use super::{BookConfig, BookData, Chapter};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("could not resolve book root {root:?}: {source}")]
    Root {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("chapter path {path:?} points outside the book")]
    OutsideRoot { path: String },
    #[error("chapter not found: {path}")]
    NotFound { path: String },
    #[error("could not read chapter at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a book laid out as a summary manifest plus markdown chapters.
#[derive(Debug, Default, Clone)]
pub struct BookService {
    config: BookConfig,
}

impl BookService {
    pub fn new(config: BookConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Parses the manifest and loads the chapter a reader should start on.
    ///
    /// Only a manifest failure is an error. A chapter that cannot be loaded is
    /// reported through [`BookData::error`] with a markdown error page in
    /// place of its content.
    pub fn book_data(&self) -> Result<BookData> {
        let summary_path = self.config.summary_path();
        info!("loading book data from {}", summary_path.display());

        let parsed = parse_summary_file(&summary_path)
            .inspect_err(|err| error!("error parsing {}: {err}", summary_path.display()))
            .with_context(|| format!("failed to parse {}", summary_path.display()))?;

        let initial_path = if parsed.first_chapter.is_empty() {
            info!(
                "no initial chapter in {}, defaulting to {}",
                self.config.summary_file, self.config.default_chapter
            );
            self.config.default_chapter.clone()
        } else {
            parsed.first_chapter
        };

        let mut data = BookData {
            toc: parsed.toc,
            ..BookData::empty()
        };

        match self.load_chapter(&initial_path) {
            Ok(chapter) => data.initial_markdown = chapter.content,
            Err(err) => {
                warn!("error loading initial chapter '{initial_path}': {err}");
                data.error = Some(format!(
                    "failed to load initial chapter '{initial_path}': {err}"
                ));
                data.initial_markdown = Self::error_page(&initial_path, &err);
            }
        }

        info!("loaded book data, initial chapter: {initial_path}");
        data.initial_path = initial_path;
        Ok(data)
    }

    /// Reads a chapter by its path relative to the book root.
    ///
    /// `..` segments are resolved lexically and can never climb above the
    /// root.
    pub fn load_chapter(&self, relative: &str) -> Result<Chapter, ContentError> {
        let root =
            std::path::absolute(self.config.root()).map_err(|source| ContentError::Root {
                root: self.config.root().to_path_buf(),
                source,
            })?;

        let cleaned = Self::clean_relative(relative);
        let target = root.join(&cleaned);
        if !target.starts_with(&root) {
            warn!("rejected chapter path outside the book: {relative} (resolved to {target:?})");
            return Err(ContentError::OutsideRoot {
                path: relative.to_string(),
            });
        }

        debug!("reading chapter {target:?}");
        let content = fs::read_to_string(&target).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ContentError::NotFound {
                path: relative.to_string(),
            },
            _ => ContentError::Io {
                path: target.clone(),
                source,
            },
        })?;

        Ok(Chapter {
            path: cleaned,
            content,
        })
    }

    fn clean_relative(relative: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => {
                    if let Some(segment) = segment.to_str() {
                        segments.push(segment);
                    }
                }
                Component::ParentDir => {
                    segments.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        segments.join("/")
    }

    fn error_page(path: &str, err: &ContentError) -> String {
        format!(
            "# Error Loading Content\n\nCould not load: `{path}`\n\n**Details:**\n```\n{err}\n```"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::SummaryError;
    use tempfile::TempDir;

    fn write_book(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn service_for(dir: &Path) -> BookService {
        BookService::new(BookConfig::with_root(dir))
    }

    #[test]
    fn clean_relative_never_climbs_above_root() {
        assert_eq!(BookService::clean_relative("./a/b.md"), "a/b.md");
        assert_eq!(BookService::clean_relative("a/../b.md"), "b.md");
        assert_eq!(BookService::clean_relative("../../etc/passwd"), "etc/passwd");
        assert_eq!(BookService::clean_relative("/abs/c.md"), "abs/c.md");
        assert_eq!(BookService::clean_relative(""), "");
    }

    #[test]
    fn load_chapter_reads_nested_file() {
        let dir = write_book(&[("guide/setup.md", "# Setup\n")]);
        let chapter = service_for(dir.path()).load_chapter("./guide/setup.md").unwrap();

        assert_eq!(chapter.path, "guide/setup.md");
        assert_eq!(chapter.content, "# Setup\n");
    }

    #[test]
    fn load_chapter_cannot_escape_book_root() {
        let outer = write_book(&[("secret.md", "top secret"), ("book/intro.md", "hi")]);
        let service = service_for(&outer.path().join("book"));

        match service.load_chapter("../secret.md") {
            Err(ContentError::NotFound { path }) => assert_eq!(path, "../secret.md"),
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(service.load_chapter("../book/../intro.md").unwrap().content, "hi");
    }

    #[test]
    fn book_data_opens_first_chapter() {
        let dir = write_book(&[
            ("SUMMARY.md", "# Summary\n- [Part]()\n  - [Intro](./intro.md)\n"),
            ("intro.md", "Welcome"),
        ]);
        let data = service_for(dir.path()).book_data().unwrap();

        assert_eq!(data.initial_path, "intro.md");
        assert_eq!(data.initial_markdown, "Welcome");
        assert_eq!(data.toc.len(), 1);
        assert!(data.error.is_none());
    }

    #[test]
    fn book_data_falls_back_to_default_chapter() {
        let dir = write_book(&[
            ("SUMMARY.md", "- [Part]()\n- [Site](https://example.com)\n"),
            ("README.md", "readme"),
        ]);
        let data = service_for(dir.path()).book_data().unwrap();

        assert_eq!(data.initial_path, "README.md");
        assert_eq!(data.initial_markdown, "readme");
    }

    #[test]
    fn book_data_reports_unreadable_chapter_without_failing() {
        let dir = write_book(&[("SUMMARY.md", "- [Gone](gone.md)\n")]);
        let data = service_for(dir.path()).book_data().unwrap();

        assert_eq!(data.initial_path, "gone.md");
        assert!(data.error.as_deref().unwrap().contains("gone.md"));
        assert!(data.initial_markdown.starts_with("# Error Loading Content"));
        assert!(data.initial_markdown.contains("`gone.md`"));
    }

    #[test]
    fn book_data_fails_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = service_for(dir.path()).book_data().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SummaryError>(),
            Some(SummaryError::NotFound { .. })
        ));
    }
}
