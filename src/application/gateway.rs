//! Gateway trait describing the remote search API.

use async_trait::async_trait;
use galleria_api_types::{PostsResponse, Tag};
use thiserror::Error;

use crate::application::query::Query;

/// Fallback shown to the user when a failure carries no message of its own.
pub const GENERIC_SEARCH_ERROR: &str = "Failed to load posts. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response (connectivity, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },
    /// A success response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Message surfaced through `SearchState::toast_error`.
    ///
    /// Only a server-supplied `error` string is shown verbatim; every other
    /// failure collapses to [`GENERIC_SEARCH_ERROR`].
    pub fn toast_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_SEARCH_ERROR.to_string(),
        }
    }
}

#[async_trait]
pub trait GalleryApi: Send + Sync {
    /// `GET /api/posts` for one page of `query`.
    async fn search_posts(&self, query: &Query, page: u32) -> Result<PostsResponse, ApiError>;

    /// `GET /api/tags` for exactly `names`.
    async fn fetch_tags(&self, names: &[String]) -> Result<Vec<Tag>, ApiError>;
}
