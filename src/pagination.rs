//! Forward/back navigation across a nested chapter → page structure.
//!
//! [`Paginator`] only remembers where the reader is. The chapters are passed
//! into every call, and recording the new position is the caller's job.

use crate::error::{ReadmarkError, Result};
use crate::model::{Chapter, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    position: Position,
}

impl Paginator {
    /// Starts at the first page of the first chapter.
    pub fn new(chapters: &[Chapter]) -> Result<Self> {
        if chapters.is_empty() {
            return Err(ReadmarkError::EmptyBook);
        }
        Ok(Self {
            position: Position::default(),
        })
    }

    /// Starts at `position`, which must name an existing chapter and, unless
    /// the chapter is empty, an existing page.
    pub fn at(chapters: &[Chapter], position: Position) -> Result<Self> {
        let chapter = chapters
            .get(position.chapter)
            .ok_or(ReadmarkError::ChapterOutOfRange {
                index: position.chapter,
                count: chapters.len(),
            })?;
        if position.page > chapter.last_page_index() {
            return Err(ReadmarkError::PageOutOfRange {
                chapter: position.chapter,
                page: position.page,
                count: chapter.page_count(),
            });
        }
        Ok(Self { position })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn can_go_next(&self, chapters: &[Chapter]) -> bool {
        self.position.page + 1 < page_count(chapters, self.position.chapter)
            || self.position.chapter + 1 < chapters.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.position.page > 0 || self.position.chapter > 0
    }

    /// Moves one page forward, rolling over into the next chapter's first
    /// page. Returns `false` on the last page of the last chapter.
    pub fn next(&mut self, chapters: &[Chapter]) -> bool {
        let Position { chapter, page } = self.position;
        if page + 1 < page_count(chapters, chapter) {
            self.position = Position::new(chapter, page + 1);
        } else if chapter + 1 < chapters.len() {
            self.position = Position::new(chapter + 1, 0);
        } else {
            return false;
        }
        true
    }

    /// Moves one page back, rolling over into the previous chapter's last
    /// page. Returns `false` on the very first page.
    pub fn previous(&mut self, chapters: &[Chapter]) -> bool {
        let Position { chapter, page } = self.position;
        if page > 0 {
            self.position = Position::new(chapter, page - 1);
        } else if chapter > 0 {
            let last = chapters
                .get(chapter - 1)
                .map(Chapter::last_page_index)
                .unwrap_or(0);
            self.position = Position::new(chapter - 1, last);
        } else {
            return false;
        }
        true
    }

    /// Goes to the first page of `index`. The last visited page of that
    /// chapter is deliberately not restored.
    pub fn jump_to_chapter(&mut self, chapters: &[Chapter], index: usize) -> Result<()> {
        if index >= chapters.len() {
            return Err(ReadmarkError::ChapterOutOfRange {
                index,
                count: chapters.len(),
            });
        }
        self.position = Position::new(index, 0);
        Ok(())
    }

    /// Text of the current page; `None` inside a chapter without pages.
    pub fn current_page<'a>(&self, chapters: &'a [Chapter]) -> Option<&'a str> {
        chapters
            .get(self.position.chapter)?
            .pages
            .get(self.position.page)
            .map(String::as_str)
    }
}

fn page_count(chapters: &[Chapter], chapter: usize) -> usize {
    chapters.get(chapter).map(Chapter::page_count).unwrap_or(0)
}
