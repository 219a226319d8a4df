//! reqwest-backed implementation of [`GalleryApi`].

use std::time::Duration;

use async_trait::async_trait;
use galleria_api_types::{ErrorBody, PostsResponse, Tag, TagsResponse};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::gateway::{ApiError, GalleryApi};
use crate::application::query::Query;
use crate::config::ApiSettings;

use super::error::InfraError;

const POSTS_PATH: &str = "api/posts";
const TAGS_PATH: &str = "api/tags";

#[derive(Clone, Debug)]
pub struct HttpGalleryApi {
    client: Client,
    base: Url,
}

impl HttpGalleryApi {
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self, InfraError> {
        // Keep any path prefix: `join` would replace the last segment otherwise.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::client(err.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, InfraError> {
        Self::new(settings.base_url.clone(), settings.timeout)
    }

    pub fn user_agent() -> &'static str {
        concat!("galleria/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        debug!(%url, "Sending request");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::transport)?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            // An unparseable body or a missing `error` field both leave `message` empty.
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn search_posts(&self, query: &Query, page: u32) -> Result<PostsResponse, ApiError> {
        self.get(
            POSTS_PATH,
            &[("q", query.joined()), ("page", page.to_string())],
        )
        .await
    }

    async fn fetch_tags(&self, names: &[String]) -> Result<Vec<Tag>, ApiError> {
        let response: TagsResponse = self.get(TAGS_PATH, &[("q", names.join(" "))]).await?;
        Ok(response.results)
    }
}
