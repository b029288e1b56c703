use std::fmt;

use crate::model::BookId;

/// Storage namespaces. The rendered names are the keys already present in
/// existing stores and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    ReadingProgress,
    Bookmarks,
    ReadingStats,
    Favorites,
    Purchases,
}

impl Namespace {
    pub const PER_BOOK: [Namespace; 3] = [
        Namespace::ReadingProgress,
        Namespace::Bookmarks,
        Namespace::ReadingStats,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::ReadingProgress => "readingProgress",
            Namespace::Bookmarks => "bookmarks",
            Namespace::ReadingStats => "readingStats",
            Namespace::Favorites => "favorites",
            Namespace::Purchases => "purchases",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    prefix: Option<String>,
    namespace: Namespace,
    book_id: Option<BookId>,
}

impl StorageKey {
    pub fn book(namespace: Namespace, book_id: &BookId) -> Self {
        Self {
            prefix: None,
            namespace,
            book_id: Some(book_id.clone()),
        }
    }

    pub fn global(namespace: Namespace) -> Self {
        Self {
            prefix: None,
            namespace,
            book_id: None,
        }
    }

    /// Puts the key under a versioned prefix, rendered as `<prefix>:<key>`.
    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        self.prefix = prefix.filter(|p| !p.is_empty()).map(str::to_owned);
        self
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn book_id(&self) -> Option<&BookId> {
        self.book_id.as_ref()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}:")?;
        }
        f.write_str(self.namespace.as_str())?;
        if let Some(book_id) = &self.book_id {
            write!(f, "_{book_id}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_legacy_key_names() {
        let book = BookId::from(42);
        assert_eq!(
            StorageKey::book(Namespace::ReadingProgress, &book).to_string(),
            "readingProgress_42"
        );
        assert_eq!(
            StorageKey::book(Namespace::Bookmarks, &book).to_string(),
            "bookmarks_42"
        );
        assert_eq!(
            StorageKey::book(Namespace::ReadingStats, &book).to_string(),
            "readingStats_42"
        );
        assert_eq!(StorageKey::global(Namespace::Favorites).to_string(), "favorites");
        assert_eq!(StorageKey::global(Namespace::Purchases).to_string(), "purchases");
    }

    #[test]
    fn prefix_is_applied_only_when_non_empty() {
        let book = BookId::from("b1");
        let key = StorageKey::book(Namespace::Bookmarks, &book);
        assert_eq!(
            key.clone().with_prefix(Some("v2")).to_string(),
            "v2:bookmarks_b1"
        );
        assert_eq!(key.with_prefix(Some("")).to_string(), "bookmarks_b1");
    }
}
