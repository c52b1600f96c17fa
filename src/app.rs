use crate::book::{BookConfig, BookService};
use crate::state::ReaderState;
use crate::ui::UiRuntime;
use anyhow::{Context, Result, bail};
use log::info;

/// High-level application orchestrator that wires the book service, state, and UI.
pub struct ReaderApp<U: UiRuntime> {
    service: BookService,
    state: ReaderState,
    ui: U,
}

impl<U: UiRuntime> ReaderApp<U> {
    pub fn new(config: BookConfig, ui: U) -> Self {
        Self {
            service: BookService::new(config),
            state: ReaderState::default(),
            ui,
        }
    }

    pub fn open_book(&mut self) -> Result<()> {
        let book = self.service.book_data().with_context(|| {
            format!("failed to open book at {}", self.service.config().root.display())
        })?;
        self.state.set_active_book(book);
        Ok(())
    }

    /// Switches to `path`, given either relative to the book root or as a
    /// link from the current chapter.
    pub fn open_chapter(&mut self, path: &str) -> Result<()> {
        let target = if self.state.contains_chapter(path) {
            path.to_string()
        } else {
            match self.state.resolve_link(path) {
                Some(resolved) => resolved,
                None => bail!("{path} is not a chapter of this book"),
            }
        };
        self.load(&target)
    }

    /// Returns `false` when already on the last chapter.
    pub fn open_next(&mut self) -> Result<bool> {
        match self.state.next_path().map(str::to_string) {
            Some(path) => self.load(&path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Returns `false` when already on the first chapter.
    pub fn open_previous(&mut self) -> Result<bool> {
        match self.state.previous_path().map(str::to_string) {
            Some(path) => self.load(&path).map(|()| true),
            None => Ok(false),
        }
    }

    fn load(&mut self, path: &str) -> Result<()> {
        let chapter = self
            .service
            .load_chapter(path)
            .with_context(|| format!("failed to load chapter {path}"))?;
        info!("opened chapter {}", chapter.path);
        self.state.show_chapter(chapter);
        Ok(())
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn run(self) -> Result<()> {
        self.ui.run(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    /// Captures the state handed to the UI.
    struct RecordingUi(Rc<RefCell<Option<ReaderState>>>);

    impl UiRuntime for RecordingUi {
        fn run(self, initial_state: ReaderState) -> Result<()> {
            *self.0.borrow_mut() = Some(initial_state);
            Ok(())
        }
    }

    fn book_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("SUMMARY.md"),
            "- [Intro](intro.md)\n- [Guide]()\n  - [Setup](guide/setup.md)\n",
        )
        .unwrap();
        fs::write(dir.path().join("intro.md"), "# Intro").unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/setup.md"), "# Setup").unwrap();
        dir
    }

    #[test]
    fn open_book_then_chapter_reaches_the_ui() {
        let dir = book_dir();
        let seen = Rc::new(RefCell::new(None));
        let mut app = ReaderApp::new(
            BookConfig::with_root(dir.path()),
            RecordingUi(Rc::clone(&seen)),
        );

        app.open_book().unwrap();
        assert_eq!(app.state().current_path(), Some("intro.md"));

        app.open_chapter("guide/setup.md").unwrap();
        app.run().unwrap();

        let state = seen.borrow_mut().take().unwrap();
        assert_eq!(state.current_path(), Some("guide/setup.md"));
        assert_eq!(state.current_markdown(), "# Setup");
    }

    #[test]
    fn next_and_previous_walk_the_reading_order() {
        let dir = book_dir();
        let seen = Rc::new(RefCell::new(None));
        let mut app = ReaderApp::new(BookConfig::with_root(dir.path()), RecordingUi(seen));
        app.open_book().unwrap();

        assert!(!app.open_previous().unwrap());
        assert!(app.open_next().unwrap());
        assert_eq!(app.state().current_markdown(), "# Setup");
        assert!(!app.open_next().unwrap());
        assert!(app.open_previous().unwrap());
        assert_eq!(app.state().current_path(), Some("intro.md"));
    }

    #[test]
    fn open_chapter_rejects_non_chapter_paths() {
        let dir = book_dir();
        let seen = Rc::new(RefCell::new(None));
        let mut app = ReaderApp::new(BookConfig::with_root(dir.path()), RecordingUi(seen));
        app.open_book().unwrap();

        assert!(app.open_chapter("https://example.com").is_err());
        assert!(app.open_chapter("missing.md").is_err());
        assert_eq!(app.state().current_path(), Some("intro.md"));
    }

    #[test]
    fn open_book_without_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Rc::new(RefCell::new(None));
        let mut app = ReaderApp::new(BookConfig::with_root(dir.path()), RecordingUi(seen));

        let err = app.open_book().unwrap_err();
        assert!(format!("{err:#}").contains("SUMMARY.md"));
    }
}
