//! Cache key definitions.

use crate::application::query::Query;

/// Identifies one cached page of search results.
///
/// Pages are scoped by the full token list that produced them, so switching
/// queries never serves a page fetched for a different query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub query: Query,
    pub page: u32,
}

impl PageKey {
    pub fn new(query: &Query, page: u32) -> Self {
        Self {
            query: query.clone(),
            page,
        }
    }
}
