//! One open book: navigation, transient view settings and the tracker calls
//! every move triggers.

use crate::bookmarks::BookmarkSet;
use crate::error::Result;
use crate::model::{Book, Position};
use crate::pagination::Paginator;
use crate::progress::{self, ReadingProgress};
use crate::service::ReadingService;
use crate::store::KvStore;

pub const DEFAULT_FONT_SIZE: u8 = 16;
pub const MIN_FONT_SIZE: u8 = 14;
pub const MAX_FONT_SIZE: u8 = 24;
pub const FONT_SIZE_STEP: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// View state of a reading session. Never persisted; every session starts
/// from [`UiState::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub show_chapters: bool,
    pub show_settings: bool,
    pub font_size: u8,
    pub theme: Theme,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_chapters: false,
            show_settings: false,
            font_size: DEFAULT_FONT_SIZE,
            theme: Theme::Light,
        }
    }
}

impl UiState {
    pub fn toggle_chapters(&mut self) {
        self.show_chapters = !self.show_chapters;
    }

    pub fn toggle_settings(&mut self) {
        self.show_settings = !self.show_settings;
    }

    pub fn increase_font(&mut self) -> u8 {
        self.font_size = self
            .font_size
            .saturating_add(FONT_SIZE_STEP)
            .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.font_size
    }

    pub fn decrease_font(&mut self) -> u8 {
        self.font_size = self
            .font_size
            .saturating_sub(FONT_SIZE_STEP)
            .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.font_size
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }
}

pub struct ReadingSession<'a, S> {
    book: &'a Book,
    service: &'a mut ReadingService<S>,
    pager: Paginator,
    pub ui: UiState,
}

impl<'a, S: KvStore> ReadingSession<'a, S> {
    /// Opens `book` at its first page. Opening does not touch stored progress.
    pub fn open(book: &'a Book, service: &'a mut ReadingService<S>) -> Result<Self> {
        let pager = Paginator::new(&book.chapters)?;
        tracing::debug!(book_id = %book.id, title = %book.title, "opened reading session");
        Ok(Self {
            book,
            service,
            pager,
            ui: UiState::default(),
        })
    }

    /// Opens `book` at `position` without recording it.
    pub fn open_at(
        book: &'a Book,
        service: &'a mut ReadingService<S>,
        position: Position,
    ) -> Result<Self> {
        let mut session = Self::open(book, service)?;
        session.pager = Paginator::at(&book.chapters, position)?;
        Ok(session)
    }

    pub fn book(&self) -> &Book {
        self.book
    }

    pub fn position(&self) -> Position {
        self.pager.position()
    }

    pub fn current_page(&self) -> Option<&'a str> {
        let book: &'a Book = self.book;
        self.pager.current_page(&book.chapters)
    }

    pub fn can_go_next(&self) -> bool {
        self.pager.can_go_next(&self.book.chapters)
    }

    pub fn can_go_previous(&self) -> bool {
        self.pager.can_go_previous()
    }

    pub fn next(&mut self) -> bool {
        let moved = self.pager.next(&self.book.chapters);
        if moved {
            self.record();
        }
        moved
    }

    pub fn previous(&mut self) -> bool {
        let moved = self.pager.previous(&self.book.chapters);
        if moved {
            self.record();
        }
        moved
    }

    pub fn jump_to_chapter(&mut self, index: usize) -> Result<()> {
        self.pager.jump_to_chapter(&self.book.chapters, index)?;
        self.record();
        Ok(())
    }

    pub fn progress(&mut self) -> ReadingProgress {
        self.service.get_progress(&self.book.id)
    }

    pub fn chapter_progress_percent(&mut self, chapter: usize) -> f64 {
        let progress = self.progress();
        progress::chapter_progress_percent(chapter, &self.book.chapters, &progress)
    }

    pub fn overall_progress_percent(&mut self) -> f64 {
        let progress = self.progress();
        progress::overall_progress_percent(&self.book.chapters, &progress)
    }

    pub fn toggle_bookmark(&mut self) -> BookmarkSet {
        let Position { chapter, page } = self.position();
        self.service.toggle_bookmark(&self.book.id, chapter, page)
    }

    pub fn is_bookmarked(&mut self) -> bool {
        let Position { chapter, page } = self.position();
        self.service.is_bookmarked(&self.book.id, chapter, page)
    }

    // A chapter without pages has no valid page index to store.
    fn record(&mut self) {
        if self.current_page().is_none() {
            return;
        }
        let Position { chapter, page } = self.position();
        self.service.set_page(&self.book.id, chapter, page);
    }
}
