use crate::keys::Namespace;
use crate::model::BookId;
use crate::storage::Storage;
use crate::store::KvStore;

/// Owner of all client-side reading state.
///
/// Progress, bookmarks, stats, favorites and purchases are implemented as
/// `impl` blocks in their own modules; this type only holds the storage.
/// There is one service per session and it is passed explicitly to whatever
/// drives reading.
#[derive(Debug, Clone)]
pub struct ReadingService<S> {
    pub(crate) storage: Storage<S>,
}

impl<S: KvStore> ReadingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            storage: Storage::new(store),
        }
    }

    pub fn with_key_prefix(store: S, prefix: Option<String>) -> Self {
        Self {
            storage: Storage::new(store).with_key_prefix(prefix),
        }
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn into_store(self) -> S {
        self.storage.into_store()
    }

    /// Drops progress, bookmarks and stats for one book. Favorites and
    /// purchases are global and survive.
    pub fn clear_book_data(&mut self, book_id: &BookId) {
        let keys: Vec<_> = Namespace::PER_BOOK
            .iter()
            .map(|ns| self.storage.book_key(*ns, book_id))
            .collect();
        tracing::debug!(book_id = %book_id, "clearing book data");
        self.storage.clear_keys(&keys);
    }

    pub fn reset(&mut self) -> bool {
        tracing::debug!("resetting all reading data");
        self.storage.reset()
    }
}
