//! Search coordination: page cache, pagination bounds and failure surfacing.

use std::sync::Arc;

use galleria_api_types::{Post, PostsResponse, Tag};
use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use crate::application::error::TagLoadError;
use crate::application::gateway::{ApiError, GalleryApi};
use crate::application::query::{QuerySource, QuerySync};
use crate::application::state::{Navigation, SearchState};
use crate::application::tags::TagLoader;
use crate::cache::{PageKey, PageStore};

const METRIC_PAGE_CACHE_HIT_TOTAL: &str = "galleria_page_cache_hit_total";
const METRIC_PAGE_CACHE_MISS_TOTAL: &str = "galleria_page_cache_miss_total";
const METRIC_SEARCH_FAILED_TOTAL: &str = "galleria_search_failed_total";

/// Owns the page cache and the search state for one gallery session.
///
/// State changes are published through a `watch` channel; UI code holds the
/// coordinator behind an `Arc` and observes via [`SearchCoordinator::subscribe`].
/// Locks are only taken between suspension points, so concurrent searches can
/// duplicate a fetch but never corrupt the caches.
pub struct SearchCoordinator {
    api: Arc<dyn GalleryApi>,
    query: Arc<dyn QuerySource>,
    sync: Arc<dyn QuerySync>,
    pages: PageStore,
    tags: TagLoader,
    state: watch::Sender<SearchState>,
}

impl SearchCoordinator {
    pub fn new(
        api: Arc<dyn GalleryApi>,
        query: Arc<dyn QuerySource>,
        sync: Arc<dyn QuerySync>,
        tags: TagLoader,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            api,
            query,
            sync,
            pages: PageStore::new(),
            tags,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn max_page(&self) -> Option<u64> {
        self.state.borrow().max_page()
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn tag_loader(&self) -> &TagLoader {
        &self.tags
    }

    /// Posts cached for the current query and page; `None` until fetched.
    pub fn posts_for_current_page(&self) -> Option<Arc<Vec<Post>>> {
        let page = self.state.borrow().current_page;
        self.pages.get(&PageKey::new(&self.query.query(), page))
    }

    /// Fetch the current page unless it is already cached.
    ///
    /// The address bar is synced before the cache check, so it also moves on
    /// a cache hit. `fetching_posts` and `has_searched` are settled on every
    /// path before returning.
    pub async fn search_posts(&self) -> Result<(), ApiError> {
        let page = self.state.borrow().current_page;
        self.search_page(page).await
    }

    /// Advance one page; no-op at the known last page.
    pub async fn next_page(&self) -> Navigation {
        let target = self.move_to(|state| {
            (!state.at_last_page()).then(|| state.current_page.saturating_add(1))
        });
        self.navigate(target).await
    }

    /// Go back one page; no-op on the first page.
    pub async fn prev_page(&self) -> Navigation {
        let target = self.move_to(|state| (!state.at_first_page()).then(|| state.current_page - 1));
        self.navigate(target).await
    }

    /// Jump to `page`, clamped to `1..=max_page` when the maximum is known.
    pub async fn go_to_page(&self, page: u32) -> Navigation {
        let target = self.move_to(|state| {
            let mut target = page.max(1);
            if let Some(max) = state.max_page() {
                let max = u32::try_from(max.max(1)).unwrap_or(u32::MAX);
                target = target.min(max);
            }
            (target != state.current_page).then_some(target)
        });
        self.navigate(target).await
    }

    /// Set the current page without fetching, e.g. when restoring from a URL.
    pub fn set_page(&self, page: u32) {
        self.state.send_if_modified(|state| {
            let page = page.max(1);
            let changed = state.current_page != page;
            state.current_page = page;
            changed
        });
    }

    /// Rewind to page 1 after the query source changed.
    pub fn reset_page(&self) {
        self.set_page(1);
    }

    pub async fn tags_for_post(&self, post: &Post) -> Result<Vec<Tag>, TagLoadError> {
        self.tags.tags_for_post(post).await
    }

    #[instrument(skip(self))]
    async fn search_page(&self, page: u32) -> Result<(), ApiError> {
        let query = self.query.query();
        self.state.send_modify(|state| state.fetching_posts = true);
        self.sync.sync(page, &query);

        let key = PageKey::new(&query, page);
        let outcome = if self.pages.contains(&key) {
            counter!(METRIC_PAGE_CACHE_HIT_TOTAL).increment(1);
            debug!(page, "Serving page from cache");
            Ok(None)
        } else {
            counter!(METRIC_PAGE_CACHE_MISS_TOTAL).increment(1);
            self.api
                .search_posts(&query, page)
                .await
                .map(|response| Some(self.store_page(key, response)))
        };

        if let Err(err) = &outcome {
            counter!(METRIC_SEARCH_FAILED_TOTAL).increment(1);
            error!(page, query = %query.joined(), error = %err, "Post search failed");
        }

        self.state.send_modify(|state| {
            match &outcome {
                Ok(Some((per_page, total))) => {
                    state.results_per_page = *per_page;
                    state.total_post_count = *total;
                    state.toast_error.clear();
                }
                Ok(None) => {}
                Err(err) => state.toast_error = err.toast_message(),
            }
            state.fetching_posts = false;
            state.has_searched = true;
        });

        outcome.map(|_| ())
    }

    fn store_page(&self, key: PageKey, response: PostsResponse) -> (u32, u64) {
        let PostsResponse {
            count_per_page,
            total_count,
            results,
        } = response;
        let received = results.len();
        let page = key.page;
        if self.pages.insert(key, results) {
            info!(page, received, total_count, "Page cached");
        } else {
            debug!(page, "Page already cached by a concurrent search");
        }
        (count_per_page, total_count)
    }

    fn move_to(&self, pick: impl FnOnce(&SearchState) -> Option<u32>) -> Option<u32> {
        let mut target = None;
        self.state.send_if_modified(|state| {
            target = pick(state);
            match target {
                Some(page) => {
                    state.current_page = page;
                    true
                }
                None => false,
            }
        });
        target
    }

    async fn navigate(&self, target: Option<u32>) -> Navigation {
        let Some(page) = target else {
            return Navigation::NoOp;
        };
        // Already surfaced through `toast_error`; navigation itself never fails.
        if let Err(err) = self.search_page(page).await {
            debug!(page, error = %err, "Navigation search failed");
        }
        Navigation::Moved(page)
    }
}
