use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReadmarkError;
use crate::keys::Namespace;
use crate::model::{BookId, Position};
use crate::service::ReadingService;
use crate::store::KvStore;

/// A bookmarked position, encoded as `"{chapter}-{page}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookmarkKey(Position);

impl BookmarkKey {
    pub const fn new(chapter: usize, page: usize) -> Self {
        Self(Position::new(chapter, page))
    }

    pub fn position(self) -> Position {
        self.0
    }
}

impl From<Position> for BookmarkKey {
    fn from(position: Position) -> Self {
        Self(position)
    }
}

impl fmt::Display for BookmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0.chapter, self.0.page)
    }
}

impl FromStr for BookmarkKey {
    type Err = ReadmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReadmarkError::InvalidBookmarkKey(s.to_owned());
        let (chapter, page) = s.split_once('-').ok_or_else(invalid)?;
        let chapter = chapter.parse().map_err(|_| invalid())?;
        let page = page.parse().map_err(|_| invalid())?;
        Ok(Self::new(chapter, page))
    }
}

impl Serialize for BookmarkKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BookmarkKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Bookmarks of one book in the order they were added. Never holds
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BookmarkSet(Vec<BookmarkKey>);

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: BookmarkKey) -> bool {
        self.0.contains(&key)
    }

    /// Adds `key` if absent, removes it otherwise. Returns whether the key is
    /// present afterwards.
    pub fn toggle(&mut self, key: BookmarkKey) -> bool {
        if let Some(idx) = self.0.iter().position(|k| *k == key) {
            self.0.remove(idx);
            false
        } else {
            self.0.push(key);
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = BookmarkKey> + '_ {
        self.0.iter().copied()
    }
}

impl<'de> Deserialize<'de> for BookmarkSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let mut set = BookmarkSet::new();
        for entry in entries {
            let Some(key) = entry.as_str().and_then(|raw| raw.parse().ok()) else {
                tracing::warn!(%entry, "skipping malformed bookmark");
                continue;
            };
            if !set.contains(key) {
                set.0.push(key);
            }
        }
        Ok(set)
    }
}

impl<S: KvStore> ReadingService<S> {
    pub fn get_bookmarks(&mut self, book_id: &BookId) -> BookmarkSet {
        let key = self.storage.book_key(Namespace::Bookmarks, book_id);
        self.storage.read(&key, BookmarkSet::new())
    }

    pub fn toggle_bookmark(&mut self, book_id: &BookId, chapter: usize, page: usize) -> BookmarkSet {
        let mut bookmarks = self.get_bookmarks(book_id);
        let added = bookmarks.toggle(BookmarkKey::new(chapter, page));

        let key = self.storage.book_key(Namespace::Bookmarks, book_id);
        if !self.storage.write(&key, &bookmarks) {
            tracing::warn!(book_id = %book_id, chapter, page, "bookmarks not persisted");
        }
        tracing::debug!(book_id = %book_id, chapter, page, added, "toggled bookmark");
        bookmarks
    }

    pub fn is_bookmarked(&mut self, book_id: &BookId, chapter: usize, page: usize) -> bool {
        self.get_bookmarks(book_id)
            .contains(BookmarkKey::new(chapter, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn key_round_trips_through_text() {
        let key: BookmarkKey = "3-14".parse().unwrap();
        assert_eq!(key, BookmarkKey::new(3, 14));
        assert_eq!(key.to_string(), "3-14");

        assert!("3".parse::<BookmarkKey>().is_err());
        assert!("a-1".parse::<BookmarkKey>().is_err());
        assert!("1--2".parse::<BookmarkKey>().is_err());
    }

    #[test]
    fn toggling_twice_restores_original_set() {
        let mut service = ReadingService::new(MemoryStore::new());
        let book = BookId::from(5);
        service.toggle_bookmark(&book, 0, 0);
        let before = service.get_bookmarks(&book);

        let after_first = service.toggle_bookmark(&book, 2, 7);
        assert!(after_first.contains(BookmarkKey::new(2, 7)));
        assert!(service.is_bookmarked(&book, 2, 7));

        let after_second = service.toggle_bookmark(&book, 2, 7);
        assert_eq!(after_second, before);
        assert!(!service.is_bookmarked(&book, 2, 7));

        // Toggling an existing bookmark off and on again keeps it unique.
        service.toggle_bookmark(&book, 0, 0);
        let set = service.toggle_bookmark(&book, 0, 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bookmarks_are_stored_as_string_array() {
        let mut service = ReadingService::new(MemoryStore::new());
        let book = BookId::from(9);
        service.toggle_bookmark(&book, 1, 2);
        service.toggle_bookmark(&book, 0, 5);

        let raw = service.storage().store().get_item("bookmarks_9").unwrap();
        assert_eq!(raw, r#"["1-2","0-5"]"#);
    }

    #[test]
    fn stored_duplicates_collapse_on_read() {
        let mut store = MemoryStore::new();
        store
            .set_item("bookmarks_1", r#"["0-1","0-1","2-3"]"#)
            .unwrap();
        let mut service = ReadingService::new(store);

        let set = service.get_bookmarks(&BookId::from(1));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![BookmarkKey::new(0, 1), BookmarkKey::new(2, 3)]
        );
    }

    #[test]
    fn malformed_bookmark_entries_are_skipped() {
        let mut store = MemoryStore::new();
        store
            .set_item("bookmarks_1", r#"["0-1","nope",7,"2-3"]"#)
            .unwrap();
        let mut service = ReadingService::new(store);
        let book = BookId::from(1);

        assert_eq!(
            service.get_bookmarks(&book).iter().collect::<Vec<_>>(),
            vec![BookmarkKey::new(0, 1), BookmarkKey::new(2, 3)]
        );

        service.toggle_bookmark(&book, 4, 0);
        assert_eq!(
            service.storage().store().get_item("bookmarks_1").as_deref(),
            Some(r#"["0-1","2-3","4-0"]"#)
        );
    }

    #[test]
    fn non_list_bookmarks_are_discarded() {
        let mut store = MemoryStore::new();
        store.set_item("bookmarks_1", r#"{"0-1":true}"#).unwrap();
        let mut service = ReadingService::new(store);

        assert!(service.get_bookmarks(&BookId::from(1)).is_empty());
        assert_eq!(service.storage().store().get_item("bookmarks_1"), None);
    }
}
