//! Tag store: metadata keyed by tag name, shared by every query.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use galleria_api_types::Tag;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::tags";

/// Append-only tag metadata cache. A name present once is never replaced.
#[derive(Default)]
pub struct TagStore {
    tags: RwLock<HashMap<String, Tag>>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Tag> {
        rw_read(&self.tags, SOURCE, "get").get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        rw_read(&self.tags, SOURCE, "contains").contains_key(name)
    }

    /// Names from `names` that are not cached yet, in input order and
    /// without repeats.
    pub fn missing(&self, names: &[String]) -> Vec<String> {
        let tags = rw_read(&self.tags, SOURCE, "missing");
        let mut seen = HashSet::new();
        names
            .iter()
            .filter(|name| !tags.contains_key(name.as_str()) && seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    /// Insert tags that are not cached yet; returns how many were new.
    pub fn extend(&self, incoming: impl IntoIterator<Item = Tag>) -> usize {
        let mut tags = rw_write(&self.tags, SOURCE, "extend");
        let mut inserted = 0;
        for tag in incoming {
            if !tags.contains_key(&tag.name) {
                tags.insert(tag.name.clone(), tag);
                inserted += 1;
            }
        }
        inserted
    }

    /// Cached tags for `names` in the same order, skipping unknown names.
    pub fn resolve(&self, names: &[String]) -> Vec<Tag> {
        let tags = rw_read(&self.tags, SOURCE, "resolve");
        names
            .iter()
            .filter_map(|name| tags.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.tags, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
