use crate::book::TocEntry;
use crate::state::ReaderState;
use anyhow::{Context, Result};
use html2text::from_read;
use pulldown_cmark::{Options, Parser, html};
use std::io::{self, Cursor, Write};

pub trait UiRuntime {
    fn run(self, initial_state: ReaderState) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints the table of contents and the current chapter to stdout.
#[derive(Debug, Clone)]
pub struct TerminalRuntime {
    width: usize,
    format: OutputFormat,
}

impl Default for TerminalRuntime {
    fn default() -> Self {
        Self::new(80, OutputFormat::Text)
    }
}

impl TerminalRuntime {
    pub fn new(width: usize, format: OutputFormat) -> Self {
        Self {
            width: width.max(20),
            format,
        }
    }

    fn render<W: Write>(&self, state: &ReaderState, out: &mut W) -> Result<()> {
        let Some(book) = state.active_book.as_ref() else {
            writeln!(out, "No book loaded")?;
            return Ok(());
        };

        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, book)
                .context("failed to encode book data")?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out, "Contents")?;
        Self::write_toc(&book.toc, state.current_path(), out)?;
        writeln!(out)?;

        if let Some(err) = book.error.as_deref() {
            writeln!(out, "! {err}")?;
            writeln!(out)?;
        }

        let position = match state.current_index() {
            Some(index) => format!("Chapter {} / {}", index + 1, state.chapter_count()),
            None => format!("{} chapters", state.chapter_count()),
        };
        writeln!(
            out,
            "{} ({position})",
            state.current_path().unwrap_or("untitled")
        )?;
        writeln!(out, "{}", "-".repeat(self.width))?;
        writeln!(out, "{}", self.markdown_to_text(state.current_markdown()))?;
        Ok(())
    }

    fn write_toc<W: Write>(
        entries: &[TocEntry],
        current: Option<&str>,
        out: &mut W,
    ) -> io::Result<()> {
        for entry in entries {
            let marker = if entry.is_chapter() && current == Some(entry.path.as_str()) {
                '>'
            } else {
                ' '
            };
            let indent = "  ".repeat(entry.level);
            if entry.is_chapter() {
                writeln!(out, "{marker} {indent}{} ({})", entry.title, entry.path)?;
            } else {
                writeln!(out, "{marker} {indent}{}", entry.title)?;
            }
            Self::write_toc(&entry.children, current, out)?;
        }
        Ok(())
    }

    fn markdown_to_text(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        let mut reader = Cursor::new(html_output.as_bytes());
        from_read(&mut reader, self.width).trim_end().to_string()
    }
}

impl UiRuntime for TerminalRuntime {
    fn run(self, initial_state: ReaderState) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render(&initial_state, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookData;

    fn sample_state() -> ReaderState {
        let mut state = ReaderState::default();
        state.set_active_book(BookData {
            toc: vec![
                TocEntry::new("Intro", "intro.md", 0),
                TocEntry {
                    children: vec![TocEntry::new("Setup", "guide/setup.md", 1)],
                    ..TocEntry::new("Guide", "", 0)
                },
            ],
            initial_markdown: "# Welcome\n\nHello **reader**.".to_string(),
            initial_path: "intro.md".to_string(),
            error: None,
        });
        state
    }

    fn render_to_string(runtime: &TerminalRuntime, state: &ReaderState) -> String {
        let mut buffer = Vec::new();
        runtime.render(state, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn text_output_lists_toc_and_renders_chapter() {
        let output = render_to_string(&TerminalRuntime::default(), &sample_state());

        assert!(output.contains("> Intro (intro.md)"));
        assert!(output.contains("  Guide\n"));
        assert!(output.contains("    Setup (guide/setup.md)"));
        assert!(output.contains("intro.md (Chapter 1 / 2)"));
        assert!(output.contains("Welcome"));
        assert!(output.contains("reader"));
    }

    #[test]
    fn json_output_matches_book_data() {
        let runtime = TerminalRuntime::new(80, OutputFormat::Json);
        let output = render_to_string(&runtime, &sample_state());

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["initialPath"], "intro.md");
        assert_eq!(value["toc"][1]["children"][0]["path"], "guide/setup.md");
    }

    #[test]
    fn shows_placeholder_without_book() {
        let output = render_to_string(&TerminalRuntime::default(), &ReaderState::default());
        assert_eq!(output, "No book loaded\n");
    }
}
