//! Batched tag loading.
//!
//! Tag names are resolved against the shared [`TagStore`]; only names that
//! are not cached are requested, in batches of at most `batch_size` names.
//! All batches of one call run concurrently and are joined before the call
//! returns.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::join_all;
use galleria_api_types::{Post, Tag};
use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::application::error::TagLoadError;
use crate::application::gateway::{ApiError, GalleryApi};
use crate::cache::TagStore;

pub const DEFAULT_TAG_BATCH_SIZE: usize = 100;

const METRIC_TAG_REQUEST_TOTAL: &str = "galleria_tag_request_total";
const METRIC_TAG_BATCH_FAILED_TOTAL: &str = "galleria_tag_batch_failed_total";

pub struct TagLoader {
    api: Arc<dyn GalleryApi>,
    store: Arc<TagStore>,
    batch_size: NonZeroUsize,
}

impl TagLoader {
    pub fn new(api: Arc<dyn GalleryApi>, store: Arc<TagStore>, batch_size: NonZeroUsize) -> Self {
        Self {
            api,
            store,
            batch_size,
        }
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Ensure every name in `names` is cached.
    ///
    /// Fails if any batch fails; batches that succeeded stay applied.
    #[instrument(skip_all, fields(requested = names.len()))]
    pub async fn load_tags(&self, names: &[String]) -> Result<(), TagLoadError> {
        if names.is_empty() {
            return Ok(());
        }

        let batches: Vec<&[String]> = names.chunks(self.batch_size.get()).collect();
        let total_batches = batches.len();
        let results = join_all(
            batches
                .into_iter()
                .enumerate()
                .map(|(index, batch)| self.load_batch(index, batch)),
        )
        .await;

        let mut failures = results.into_iter().filter_map(Result::err);
        match failures.next() {
            None => Ok(()),
            Some(source) => Err(TagLoadError {
                failed_batches: 1 + failures.count(),
                total_batches,
                source,
            }),
        }
    }

    /// Tags of `post` in its own order, omitting names that are still unknown.
    pub async fn tags_for_post(&self, post: &Post) -> Result<Vec<Tag>, TagLoadError> {
        self.load_tags(&post.tags).await?;
        Ok(self.store.resolve(&post.tags))
    }

    async fn load_batch(&self, index: usize, names: &[String]) -> Result<(), ApiError> {
        let missing = self.store.missing(names);
        if missing.is_empty() {
            debug!(batch = index, "Tag batch fully cached");
            return Ok(());
        }

        counter!(METRIC_TAG_REQUEST_TOTAL).increment(1);
        match self.api.fetch_tags(&missing).await {
            Ok(tags) => {
                let inserted = self.store.extend(tags);
                debug!(
                    batch = index,
                    requested = missing.len(),
                    inserted,
                    "Tag batch loaded"
                );
                Ok(())
            }
            Err(err) => {
                counter!(METRIC_TAG_BATCH_FAILED_TOTAL).increment(1);
                warn!(
                    batch = index,
                    requested = missing.len(),
                    error = %err,
                    "Tag batch request failed"
                );
                Err(err)
            }
        }
    }
}
