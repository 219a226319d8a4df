#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use galleria::api_types::{Post, PostsResponse, Tag};
use galleria::application::{ApiError, GalleryApi, Query};
use tokio::sync::Barrier;

/// In-memory API that records every call and answers from a script.
#[derive(Default)]
pub struct ScriptedApi {
    pages: Mutex<HashMap<(String, u32), Result<PostsResponse, ApiError>>>,
    post_calls: Mutex<Vec<(String, u32)>>,
    tag_calls: Mutex<Vec<Vec<String>>>,
    failing_tags: Mutex<HashSet<String>>,
    unknown_tags: Mutex<HashSet<String>>,
    tag_barrier: Mutex<Option<Arc<Barrier>>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, query: &str, page: u32, response: Result<PostsResponse, ApiError>) {
        self.pages
            .lock()
            .expect("pages")
            .insert((query.to_string(), page), response);
    }

    /// Any tag request containing `name` fails.
    pub fn fail_tag(&self, name: &str) {
        self.failing_tags
            .lock()
            .expect("failing")
            .insert(name.to_string());
    }

    /// `name` is silently left out of tag responses.
    pub fn omit_tag(&self, name: &str) {
        self.unknown_tags
            .lock()
            .expect("unknown")
            .insert(name.to_string());
    }

    /// Every tag request waits until `parties` requests are in flight.
    pub fn gate_tags(&self, parties: usize) {
        *self.tag_barrier.lock().expect("barrier") = Some(Arc::new(Barrier::new(parties)));
    }

    pub fn post_calls(&self) -> Vec<(String, u32)> {
        self.post_calls.lock().expect("post calls").clone()
    }

    pub fn tag_calls(&self) -> Vec<Vec<String>> {
        self.tag_calls.lock().expect("tag calls").clone()
    }
}

#[async_trait]
impl GalleryApi for ScriptedApi {
    async fn search_posts(&self, query: &Query, page: u32) -> Result<PostsResponse, ApiError> {
        let key = (query.joined(), page);
        self.post_calls.lock().expect("post calls").push(key.clone());
        tokio::task::yield_now().await;
        self.pages
            .lock()
            .expect("pages")
            .get(&key)
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    status: 404,
                    message: None,
                })
            })
    }

    async fn fetch_tags(&self, names: &[String]) -> Result<Vec<Tag>, ApiError> {
        self.tag_calls.lock().expect("tag calls").push(names.to_vec());
        let barrier = self.tag_barrier.lock().expect("barrier").clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        } else {
            tokio::task::yield_now().await;
        }

        let failing = self.failing_tags.lock().expect("failing").clone();
        if names.iter().any(|name| failing.contains(name)) {
            return Err(ApiError::transport("connection reset"));
        }
        let unknown = self.unknown_tags.lock().expect("unknown").clone();
        Ok(names
            .iter()
            .filter(|name| !unknown.contains(*name))
            .map(|name| Tag::named(name.clone()))
            .collect())
    }
}

pub fn posts_page(per_page: u32, total: u64, ids: &[u64]) -> Result<PostsResponse, ApiError> {
    Ok(PostsResponse {
        count_per_page: per_page,
        total_count: total,
        results: ids
            .iter()
            .map(|id| Post::new(*id, [format!("tag{id}")]))
            .collect(),
    })
}

pub fn tag_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|index| format!("{prefix}{index}")).collect()
}
