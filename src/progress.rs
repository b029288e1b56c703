use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ReadmarkError, Result};
use crate::keys::Namespace;
use crate::model::{Book, BookId, Chapter};
use crate::service::ReadingService;
use crate::store::KvStore;

/// Last visited page per chapter. Chapters without an entry read as page 0.
///
/// Serialises as a JSON object keyed by the decimal chapter index, which is
/// the layout existing stores already hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingProgress(BTreeMap<usize, usize>);

impl ReadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chapter: usize) -> Option<usize> {
        self.0.get(&chapter).copied()
    }

    pub fn page_for(&self, chapter: usize) -> usize {
        self.get(chapter).unwrap_or(0)
    }

    pub fn set(&mut self, chapter: usize, page: usize) {
        self.0.insert(chapter, page);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }
}

impl FromIterator<(usize, usize)> for ReadingProgress {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<S: KvStore> ReadingService<S> {
    pub fn get_progress(&mut self, book_id: &BookId) -> ReadingProgress {
        let key = self.storage.book_key(Namespace::ReadingProgress, book_id);
        self.storage.read(&key, ReadingProgress::new())
    }

    /// Records `page` as the last visited page of `chapter`, leaving the
    /// other chapters' entries untouched. Indices are not checked.
    ///
    /// The returned map reflects the update even when persisting it failed.
    pub fn set_page(&mut self, book_id: &BookId, chapter: usize, page: usize) -> ReadingProgress {
        let mut progress = self.get_progress(book_id);
        progress.set(chapter, page);

        let key = self.storage.book_key(Namespace::ReadingProgress, book_id);
        if !self.storage.write(&key, &progress) {
            tracing::warn!(book_id = %book_id, chapter, page, "reading progress not persisted");
        }
        tracing::debug!(book_id = %book_id, chapter, page, "recorded reading position");
        progress
    }

    /// Like [`ReadingService::set_page`], but rejects positions outside `book`.
    pub fn set_page_checked(
        &mut self,
        book: &Book,
        chapter: usize,
        page: usize,
    ) -> Result<ReadingProgress> {
        validate_position(&book.chapters, chapter, page)?;
        Ok(self.set_page(&book.id, chapter, page))
    }
}

pub(crate) fn validate_position(chapters: &[Chapter], chapter: usize, page: usize) -> Result<()> {
    let Some(ch) = chapters.get(chapter) else {
        return Err(ReadmarkError::ChapterOutOfRange {
            index: chapter,
            count: chapters.len(),
        });
    };
    if page >= ch.page_count() {
        return Err(ReadmarkError::PageOutOfRange {
            chapter,
            page,
            count: ch.page_count(),
        });
    }
    Ok(())
}

/// Share of `chapter` read, as `100 * last_page / page_count`.
///
/// Unknown chapters and chapters without pages report 0; the result is capped
/// at 100 in case the stored page outgrew the chapter.
pub fn chapter_progress_percent(
    chapter: usize,
    chapters: &[Chapter],
    progress: &ReadingProgress,
) -> f64 {
    let Some(total) = chapters.get(chapter).map(Chapter::page_count) else {
        return 0.0;
    };
    if total == 0 {
        return 0.0;
    }
    let last_page = progress.page_for(chapter);
    (100.0 * last_page as f64 / total as f64).min(100.0)
}

/// Share of the whole book read. Unlike [`chapter_progress_percent`], the
/// current page of every chapter counts as read.
pub fn overall_progress_percent(chapters: &[Chapter], progress: &ReadingProgress) -> f64 {
    let total: usize = chapters.iter().map(Chapter::page_count).sum();
    if total == 0 {
        return 0.0;
    }
    let read: f64 = (0..chapters.len())
        .map(|idx| progress.page_for(idx) as f64 + 1.0)
        .sum();
    (100.0 * read / total as f64).clamp(0.0, 100.0)
}
