//! Query tokens and the collaborators that produce and publish them.

use std::sync::RwLock;

use serde::Serialize;

use crate::cache::lock::{rw_read, rw_write};

const SOURCE: &str = "application::query";

/// Canonical ordered list of filter tokens; the cache scope for pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Query(Vec<String>);

impl Query {
    /// Build a query from raw tokens, trimming whitespace and dropping empty ones.
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            tokens
                .into_iter()
                .map(Into::into)
                .filter_map(|token| {
                    let trimmed = token.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                })
                .collect(),
        )
    }

    /// Parse the comma-joined wire form (`a,b,c`).
    pub fn parse(joined: &str) -> Self {
        Self::new(joined.split(','))
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form used by the posts endpoint and the address bar.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Supplies the query for the next search; implemented by the query-token builder.
pub trait QuerySource: Send + Sync {
    fn query(&self) -> Query;
}

/// Receives the page and query after every search so the address bar can follow.
pub trait QuerySync: Send + Sync {
    fn sync(&self, page: u32, query: &Query);
}

/// Query holder for callers that set tokens directly.
#[derive(Debug, Default)]
pub struct SharedQuery {
    current: RwLock<Query>,
}

impl SharedQuery {
    pub fn new(query: Query) -> Self {
        Self {
            current: RwLock::new(query),
        }
    }

    pub fn set(&self, query: Query) {
        *rw_write(&self.current, SOURCE, "set") = query;
    }
}

impl QuerySource for SharedQuery {
    fn query(&self) -> Query {
        rw_read(&self.current, SOURCE, "query").clone()
    }
}
