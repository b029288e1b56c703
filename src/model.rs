use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as the content provider hands it out.
///
/// Providers emit either numbers or strings; both normalise to the decimal or
/// literal string form so storage keys stay stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

pub type BookId = ContentId;
pub type ChapterId = ContentId;

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ContentId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn total_pages(&self) -> usize {
        self.chapters.iter().map(Chapter::page_count).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub id: Option<ChapterId>,
    pub title: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Chapter {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn last_page_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }
}

/// Zero-based (chapter, page) location inside a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub chapter: usize,
    pub page: usize,
}

impl Position {
    pub const fn new(chapter: usize, page: usize) -> Self {
        Self { chapter, page }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chapter {} page {}", self.chapter, self.page)
    }
}
