use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use galleria::application::{ApiError, GalleryApi};
use galleria::config::{
    ApiSettings, HistorySettings, LogFormat, LoggingSettings, PageArgs, SearchArgs, Settings,
    TagSettings, TagsArgs,
};
use galleria::infra::api::HttpGalleryApi;
use httpmock::MockServer;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::commands::{self, CliError, Session};

fn settings(server: &MockServer) -> Settings {
    Settings {
        api: ApiSettings {
            base_url: Url::parse(&server.base_url()).expect("base url"),
            timeout: Duration::from_secs(5),
        },
        tags: TagSettings {
            batch_size: NonZeroUsize::new(100).expect("non-zero"),
        },
        history: HistorySettings {
            base_url: Url::parse("http://localhost/gallery").expect("history url"),
        },
        logging: LoggingSettings {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        },
    }
}

fn session(server: &MockServer) -> Session {
    let settings = settings(server);
    let api: Arc<dyn GalleryApi> =
        Arc::new(HttpGalleryApi::from_settings(&settings.api).expect("api"));
    Session::new(&settings, api)
}

fn page_args(query: &str, page: u32) -> PageArgs {
    PageArgs {
        query: query.to_string(),
        page,
        url: None,
    }
}

#[tokio::test]
async fn search_command_steps_forward() -> Result<(), CliError> {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("q", "cat,rating:safe")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"count_per_page":2,"total_count":3,"results":[{"id":1,"tags":["cat"]},{"id":2,"tags":["cat"]}]}"#);
    });
    let second = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("q", "cat,rating:safe")
            .query_param("page", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"count_per_page":2,"total_count":3,"results":[{"id":3,"tags":["cat"]}]}"#);
    });

    let session = session(&server);
    let report = commands::search(
        &session,
        SearchArgs {
            target: page_args("cat,rating:safe", 1),
            // The second step hits the last page and is a no-op.
            next: 2,
            prev: 0,
        },
    )
    .await?;

    first.assert();
    second.assert();
    assert_eq!(report.state.current_page, 2);
    assert_eq!(report.max_page, Some(2));
    assert_eq!(report.posts.len(), 1);
    assert!(report.url.ends_with("#page=2&q=cat%2Crating%3Asafe"));
    Ok(())
}

#[tokio::test]
async fn search_command_surfaces_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"error":"no results"}"#);
    });

    let session = session(&server);
    let err = commands::search(
        &session,
        SearchArgs {
            target: page_args("missing", 1),
            next: 0,
            prev: 0,
        },
    )
    .await
    .expect_err("404 should fail the command");

    assert!(matches!(
        err,
        CliError::Search(ApiError::Status { status: 404, .. })
    ));
    assert_eq!(session.coordinator.state().toast_error, "no results");
}

#[tokio::test]
async fn post_tags_resolves_page_tags_in_one_batch() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts").query_param("page", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"count_per_page":2,"total_count":4,"results":[{"id":3,"tags":["b","a"]},{"id":4,"tags":["a","c"]}]}"#);
    });
    let tags = server.mock(|when, then| {
        when.method("GET").path("/api/tags").query_param("q", "b a c");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"results":[{"name":"a"},{"name":"b"},{"name":"c","category":"artist"}]}"#);
    });

    let session = session(&server);
    let args = PageArgs {
        query: String::new(),
        page: 1,
        url: Some(Url::parse("http://localhost/gallery#page=2&q=cat").expect("url")),
    };
    let out = commands::post_tags(&session, args).await?;

    tags.assert();
    assert_eq!(out.len(), 2);
    let first: Vec<&str> = out[0].tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(first, ["b", "a"]);
    assert_eq!(out[1].tags[1].category.as_deref(), Some("artist"));
    Ok(())
}

#[tokio::test]
async fn url_without_page_is_rejected() {
    let server = MockServer::start();
    let session = session(&server);
    let args = PageArgs {
        query: String::new(),
        page: 1,
        url: Some(Url::parse("http://localhost/gallery").expect("url")),
    };

    let err = commands::post_tags(&session, args)
        .await
        .expect_err("fragment required");
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[tokio::test]
async fn tags_command_returns_requested_order() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/tags").query_param("q", "z y");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"results":[{"name":"y"},{"name":"z"}]}"#);
    });

    let session = session(&server);
    let tags = commands::tags(
        &session,
        TagsArgs {
            names: vec!["z".into(), "y".into()],
        },
    )
    .await?;

    mock.assert();
    let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["z", "y"]);
    Ok(())
}
