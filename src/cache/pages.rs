//! Page store: search results per `(query, page)`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use galleria_api_types::Post;

use super::keys::PageKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::pages";

/// Append-only page cache.
///
/// A page, once stored, is never replaced for the lifetime of the store.
/// There is no eviction; the store lives as long as the search session.
#[derive(Default)]
pub struct PageStore {
    pages: RwLock<HashMap<PageKey, Arc<Vec<Post>>>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PageKey) -> Option<Arc<Vec<Post>>> {
        rw_read(&self.pages, SOURCE, "get").get(key).cloned()
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        rw_read(&self.pages, SOURCE, "contains").contains_key(key)
    }

    /// Store `posts` under `key` unless the page is already present.
    ///
    /// Returns `false` when an earlier entry was kept.
    pub fn insert(&self, key: PageKey, posts: Vec<Post>) -> bool {
        match rw_write(&self.pages, SOURCE, "insert").entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(posts));
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.pages, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
