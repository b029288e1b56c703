//! Global favorites and purchases, keyed by book id.

use std::collections::{BTreeMap, HashSet};

use crate::keys::Namespace;
use crate::model::BookId;
use crate::service::ReadingService;
use crate::store::KvStore;

impl<S: KvStore> ReadingService<S> {
    pub fn get_favorites(&mut self) -> Vec<BookId> {
        let key = self.storage.global_key(Namespace::Favorites);
        let mut favorites: Vec<BookId> = self.storage.read(&key, Vec::new());
        let mut seen = HashSet::new();
        favorites.retain(|id| seen.insert(id.clone()));
        favorites
    }

    /// Flips membership of `book_id` and returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, book_id: &BookId) -> bool {
        let mut favorites = self.get_favorites();
        let now_favorite = match favorites.iter().position(|id| id == book_id) {
            Some(idx) => {
                favorites.remove(idx);
                false
            }
            None => {
                favorites.push(book_id.clone());
                true
            }
        };

        let key = self.storage.global_key(Namespace::Favorites);
        if !self.storage.write(&key, &favorites) {
            tracing::warn!(book_id = %book_id, "favorites not persisted");
        }
        tracing::debug!(book_id = %book_id, favorite = now_favorite, "toggled favorite");
        now_favorite
    }

    pub fn is_favorite(&mut self, book_id: &BookId) -> bool {
        self.get_favorites().contains(book_id)
    }

    pub fn get_purchases(&mut self) -> BTreeMap<BookId, bool> {
        let key = self.storage.global_key(Namespace::Purchases);
        self.storage.read(&key, BTreeMap::new())
    }

    /// Returns `false` if the purchase could not be persisted.
    pub fn mark_purchased(&mut self, book_id: &BookId) -> bool {
        let mut purchases = self.get_purchases();
        purchases.insert(book_id.clone(), true);

        let key = self.storage.global_key(Namespace::Purchases);
        let persisted = self.storage.write(&key, &purchases);
        tracing::debug!(book_id = %book_id, persisted, "marked purchased");
        persisted
    }

    pub fn is_purchased(&mut self, book_id: &BookId) -> bool {
        self.get_purchases().contains_key(book_id)
    }
}
