//! Observable search state.

use serde::Serialize;

/// Snapshot of the coordinator's pagination and status flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchState {
    /// 1-based page the next search targets.
    pub current_page: u32,
    pub total_post_count: u64,
    /// `0` until a search succeeds.
    pub results_per_page: u32,
    /// Last-write-wins; does not count outstanding requests.
    pub fetching_posts: bool,
    /// Set after the first completed search attempt and never cleared.
    pub has_searched: bool,
    /// Empty when no error is pending.
    pub toast_error: String,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_post_count: 0,
            results_per_page: 0,
            fetching_posts: false,
            has_searched: false,
            toast_error: String::new(),
        }
    }
}

impl SearchState {
    /// `ceil(total_post_count / results_per_page)`, or `None` while the page
    /// size is still unknown.
    pub fn max_page(&self) -> Option<u64> {
        (self.results_per_page > 0)
            .then(|| self.total_post_count.div_ceil(u64::from(self.results_per_page)))
    }

    pub fn at_last_page(&self) -> bool {
        self.max_page()
            .is_some_and(|max| u64::from(self.current_page) >= max)
    }

    pub fn at_first_page(&self) -> bool {
        self.current_page <= 1
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Already at the boundary; nothing changed and nothing was fetched.
    NoOp,
    /// Moved to the given page and ran a search for it.
    Moved(u32),
}
