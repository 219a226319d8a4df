use std::sync::Arc;

use galleria::{
    api_types::{Post, Tag},
    application::{
        ApiError, GalleryApi, Query, QuerySource, QuerySync, SearchCoordinator, SearchState,
        SharedQuery, TagLoadError, TagLoader,
    },
    cache::TagStore,
    config::{LoadError, PageArgs, SearchArgs, Settings, TagsArgs},
    infra::{error::InfraError, history, history::HistorySync},
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("search failed: {0}")]
    Search(#[from] ApiError),
    #[error("tag lookup failed: {0}")]
    Tags(#[from] TagLoadError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Output(String),
}

/// One gallery session: shared query, address-bar history and coordinator.
pub struct Session {
    pub query: Arc<SharedQuery>,
    pub history: Arc<HistorySync>,
    pub coordinator: SearchCoordinator,
}

impl Session {
    pub fn new(settings: &Settings, api: Arc<dyn GalleryApi>) -> Self {
        let query = Arc::new(SharedQuery::default());
        let history = Arc::new(HistorySync::new(settings.history.base_url.clone()));
        let tags = TagLoader::new(
            Arc::clone(&api),
            Arc::new(TagStore::new()),
            settings.tags.batch_size,
        );
        let source: Arc<dyn QuerySource> = Arc::clone(&query) as Arc<dyn QuerySource>;
        let sync: Arc<dyn QuerySync> = Arc::clone(&history) as Arc<dyn QuerySync>;
        let coordinator = SearchCoordinator::new(api, source, sync, tags);
        Self {
            query,
            history,
            coordinator,
        }
    }

    /// Point the session at the requested page and query, then fetch it.
    async fn open(&self, args: &PageArgs) -> Result<(), CliError> {
        let (page, query) = match &args.url {
            Some(url) => history::decode(url).ok_or_else(|| {
                CliError::InvalidInput(format!("`{url}` carries no page in its fragment"))
            })?,
            None => (args.page, Query::parse(&args.query)),
        };
        info!(page, query = %query.joined(), "Opening search");
        self.query.set(query);
        self.coordinator.set_page(page);
        self.coordinator.search_posts().await?;
        Ok(())
    }

    fn current_posts(&self) -> Vec<Post> {
        self.coordinator
            .posts_for_current_page()
            .map(|posts| posts.as_ref().clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub state: SearchState,
    pub max_page: Option<u64>,
    pub url: String,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostTags {
    pub id: u64,
    pub tags: Vec<Tag>,
}

pub async fn search(session: &Session, args: SearchArgs) -> Result<SearchReport, CliError> {
    session.open(&args.target).await?;
    for _ in 0..args.next {
        session.coordinator.next_page().await;
    }
    for _ in 0..args.prev {
        session.coordinator.prev_page().await;
    }

    Ok(SearchReport {
        state: session.coordinator.state(),
        max_page: session.coordinator.max_page(),
        url: session.history.current().to_string(),
        posts: session.current_posts(),
    })
}

pub async fn tags(session: &Session, args: TagsArgs) -> Result<Vec<Tag>, CliError> {
    let loader = session.coordinator.tag_loader();
    loader.load_tags(&args.names).await?;
    Ok(loader.store().resolve(&args.names))
}

pub async fn post_tags(session: &Session, args: PageArgs) -> Result<Vec<PostTags>, CliError> {
    session.open(&args).await?;
    let posts = session.current_posts();

    // One batched load for the whole page; the per-post lookups below are then served from memory.
    let names: Vec<String> = posts.iter().flat_map(|post| post.tags.clone()).collect();
    session.coordinator.tag_loader().load_tags(&names).await?;

    let mut out = Vec::with_capacity(posts.len());
    for post in &posts {
        out.push(PostTags {
            id: post.id,
            tags: session.coordinator.tags_for_post(post).await?,
        });
    }
    Ok(out)
}
