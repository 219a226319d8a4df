mod support;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use galleria::api_types::Post;
use galleria::application::{ApiError, DEFAULT_TAG_BATCH_SIZE, GalleryApi, TagLoader};
use galleria::cache::TagStore;
use support::{ScriptedApi, tag_names};

fn loader(api: &Arc<ScriptedApi>) -> TagLoader {
    TagLoader::new(
        Arc::clone(api) as Arc<dyn GalleryApi>,
        Arc::new(TagStore::new()),
        NonZeroUsize::new(DEFAULT_TAG_BATCH_SIZE).expect("non-zero"),
    )
}

#[tokio::test]
async fn large_input_is_split_into_concurrent_batches() {
    let api = ScriptedApi::new();
    // Each request waits until all three are in flight; sequential dispatch would stall.
    api.gate_tags(3);
    let loader = loader(&api);
    let names = tag_names("t", 250);

    tokio::time::timeout(Duration::from_secs(5), loader.load_tags(&names))
        .await
        .expect("batches should run concurrently")
        .expect("load should succeed");

    let calls = api.tag_calls();
    let sizes: Vec<usize> = calls.iter().map(Vec::len).collect();
    assert_eq!(sizes, [100, 100, 50]);
    assert_eq!(calls[0][0], "t0");
    assert_eq!(calls[1][0], "t100");
    assert_eq!(calls[2][49], "t249");
    assert_eq!(loader.store().len(), 250);
}

#[tokio::test]
async fn second_call_requests_only_missing_names() {
    let api = ScriptedApi::new();
    let loader = loader(&api);

    loader
        .load_tags(&["a".into(), "b".into(), "c".into()])
        .await
        .expect("first load");
    loader
        .load_tags(&["b".into(), "d".into(), "a".into(), "e".into()])
        .await
        .expect("second load");

    assert_eq!(
        api.tag_calls(),
        vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string(), "e".to_string()],
        ]
    );
}

#[tokio::test]
async fn fully_cached_input_issues_no_request() {
    let api = ScriptedApi::new();
    let loader = loader(&api);
    let names = tag_names("n", 150);

    loader.load_tags(&names).await.expect("first load");
    loader.load_tags(&names).await.expect("cached load");
    loader.load_tags(&[]).await.expect("empty load");

    assert_eq!(api.tag_calls().len(), 2);
}

#[tokio::test]
async fn failed_batch_fails_call_but_keeps_other_batches() {
    let api = ScriptedApi::new();
    api.fail_tag("t120");
    let loader = loader(&api);
    let names = tag_names("t", 250);

    let err = loader.load_tags(&names).await.expect_err("one batch fails");

    assert_eq!(err.failed_batches, 1);
    assert_eq!(err.total_batches, 3);
    assert!(matches!(err.source, ApiError::Transport(_)));
    // First and third batches were applied; the failed one was not.
    assert_eq!(loader.store().len(), 150);
    assert!(loader.store().contains("t0"));
    assert!(!loader.store().contains("t100"));
    assert!(loader.store().contains("t249"));

    // No retry happened inside the call; a later call asks for the failed batch only.
    assert_eq!(api.tag_calls().len(), 3);
    let _ = loader.load_tags(&names).await;
    let calls = api.tag_calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[3].len(), 100);
    assert_eq!(calls[3][0], "t100");
}

#[tokio::test]
async fn tags_for_post_keeps_post_order_and_omits_unknown() {
    let api = ScriptedApi::new();
    api.omit_tag("ghost");
    let loader = loader(&api);
    let post = Post::new(9, ["zebra", "ghost", "apple", "mango"]);

    let tags = loader.tags_for_post(&post).await.expect("tags");

    let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["zebra", "apple", "mango"]);
}

#[tokio::test]
async fn smaller_batch_size_is_respected() {
    let api = ScriptedApi::new();
    let loader = TagLoader::new(
        Arc::clone(&api) as Arc<dyn GalleryApi>,
        Arc::new(TagStore::new()),
        NonZeroUsize::new(2).expect("non-zero"),
    );

    loader.load_tags(&tag_names("x", 5)).await.expect("load");

    let sizes: Vec<usize> = api.tag_calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, [2, 2, 1]);
}
