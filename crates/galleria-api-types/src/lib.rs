//! Request and response shapes for the gallery search API.
//!
//! `GET /api/posts?q=<comma-separated>&page=<n>` answers with [`PostsResponse`],
//! `GET /api/tags?q=<space-separated>` with [`TagsResponse`]. Failed requests
//! (status >= 400) may carry an [`ErrorBody`].

use serde::{Deserialize, Serialize};

/// A gallery item. The core only relies on `id` and the ordered `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Post {
    pub fn new(id: u64, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id,
            tags: tags.into_iter().map(Into::into).collect(),
            preview_url: None,
            file_url: None,
            rating: None,
            score: 0,
            width: None,
            height: None,
        }
    }
}

/// Metadata for a single tag, keyed by its case-sensitive `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub post_count: u64,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            post_count: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostsResponse {
    pub count_per_page: u32,
    pub total_count: u64,
    pub results: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsResponse {
    pub results: Vec<Tag>,
}

/// Body of a failed request. `error` is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
