//! Error types shared by the storage layer and the reading tracker.
//!
//! Storage failures never interrupt reading: the [`crate::storage::Storage`]
//! wrapper turns them into defaults or `false` returns. The variants here are
//! what surfaces from the backing stores and from index validation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReadmarkError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would push the store past its byte quota.
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize storage entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReadmarkError {
    #[error("chapter index {index} out of range (book has {count} chapters)")]
    ChapterOutOfRange { index: usize, count: usize },

    #[error("page index {page} out of range for chapter {chapter} ({count} pages)")]
    PageOutOfRange {
        chapter: usize,
        page: usize,
        count: usize,
    },

    #[error("book has no chapters")]
    EmptyBook,

    #[error("invalid bookmark key: {0:?}")]
    InvalidBookmarkKey(String),
}
