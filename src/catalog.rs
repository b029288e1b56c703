use std::path::Path;

use anyhow::Context as _;

use crate::model::Book;

/// Loads a book description (`id`, `title`, `author`, `chapters[].pages`)
/// from a `.json`, `.yaml` or `.yml` file.
pub fn load_book(path: &Path) -> anyhow::Result<Book> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read book: {}", path.display()))?;

    let book: Book = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("parse book yaml: {}", path.display()))?,
        Some("json") | None => serde_json::from_str(&contents)
            .with_context(|| format!("parse book json: {}", path.display()))?,
        Some(other) => anyhow::bail!("unsupported book format {other:?}: {}", path.display()),
    };

    if book.chapters.is_empty() {
        anyhow::bail!("book {} has no chapters: {}", book.id, path.display());
    }
    tracing::debug!(
        book_id = %book.id,
        chapters = book.chapters.len(),
        pages = book.total_pages(),
        "loaded book"
    );
    Ok(book)
}
