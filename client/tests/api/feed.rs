use client::feed::{FEED_DATA_KEY, FEED_ENDPOINT};
use client::{
    Backend, FeedPosts, FetchOutcome, FetcherConfig, Notification, Phase,
    Session, Skip,
};
use payloads::ClientError;
use payloads::requests::PageRequest;
use payloads::responses::Post;
use reqwest::StatusCode;
use test_helpers::spawn_app;

use crate::alice_backend;

fn feed_with_limit(backend: Backend, limit: u32) -> FeedPosts {
    let config = FetcherConfig::new(FEED_ENDPOINT, FEED_DATA_KEY).limit(limit);
    FeedPosts::with_config(backend, config)
}

fn contents(feed: &FeedPosts) -> Vec<String> {
    feed.posts().into_iter().map(|p| p.content).collect()
}

#[tokio::test]
async fn pages_until_short_page() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(5);
    let (backend, _) = alice_backend(&app).await?;
    let feed = feed_with_limit(backend, 2);

    assert_eq!(feed.fetcher().phase(), Phase::Idle);
    let outcome = feed.activate().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 1, count: 2 });
    assert_eq!(contents(&feed), ["post 1", "post 2"]);
    assert_eq!(feed.fetcher().phase(), Phase::ReadyHasMore);

    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 2, count: 2 });

    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 3, count: 1 });
    assert!(!feed.has_more());
    assert_eq!(feed.fetcher().phase(), Phase::ReadyExhausted);
    assert_eq!(
        contents(&feed),
        ["post 1", "post 2", "post 3", "post 4", "post 5"]
    );

    // exhausted: no further request
    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Skipped(Skip::Exhausted));

    let queries = app
        .backend
        .hits(FEED_ENDPOINT)
        .into_iter()
        .map(|hit| hit.query)
        .collect::<Vec<_>>();
    assert_eq!(
        queries,
        ["limit=2&page=1", "limit=2&page=2", "limit=2&page=3"]
    );

    Ok(())
}

#[tokio::test]
async fn full_last_page_needs_one_more_request() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(4);
    let (backend, _) = alice_backend(&app).await?;
    let feed = feed_with_limit(backend, 2);

    feed.activate().await;
    feed.fetch_more().await;
    assert!(feed.has_more());

    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 3, count: 0 });
    assert!(!feed.has_more());
    assert_eq!(feed.posts().len(), 4);
    assert_eq!(feed.state().current_page, 3);

    Ok(())
}

#[tokio::test]
async fn concurrent_fetches_issue_one_request() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(5);
    let (backend, _) = alice_backend(&app).await?;
    let feed = feed_with_limit(backend, 2);
    feed.activate().await;

    let first = feed.fetch_more();
    let second = feed.fetch_more();
    let (first, second) = futures::join!(first, second);

    assert_eq!(first, FetchOutcome::Loaded { page: 2, count: 2 });
    assert_eq!(second, FetchOutcome::Skipped(Skip::Busy));
    assert_eq!(app.backend.hits(FEED_ENDPOINT).len(), 2);
    assert_eq!(feed.posts().len(), 4);

    Ok(())
}

#[tokio::test]
async fn failed_page_keeps_items_and_retries_same_page() -> anyhow::Result<()>
{
    let app = spawn_app().await;
    app.backend.seed_posts(5);
    let (backend, notifier) = alice_backend(&app).await?;
    let feed = feed_with_limit(backend, 2);
    feed.activate().await;

    app.backend.fail_next(
        FEED_ENDPOINT,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("Database unavailable"),
    );
    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Failed("Database unavailable".into()));
    assert_eq!(feed.error().as_deref(), Some("Database unavailable"));
    assert_eq!(feed.fetcher().phase(), Phase::Error);
    assert_eq!(feed.posts().len(), 2);
    assert_eq!(feed.state().current_page, 1);
    // page loads report through state, not notifications
    assert!(notifier.notifications().is_empty());

    let outcome = feed.fetch_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 2, count: 2 });
    assert_eq!(feed.error(), None);

    let pages = app
        .backend
        .hits(FEED_ENDPOINT)
        .into_iter()
        .map(|hit| hit.query)
        .collect::<Vec<_>>();
    assert_eq!(pages[1], "limit=2&page=2");
    assert_eq!(pages[2], "limit=2&page=2");

    Ok(())
}

#[tokio::test]
async fn error_without_body_uses_fallback_message() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;
    let feed = FeedPosts::new(backend);

    app.backend
        .fail_next(FEED_ENDPOINT, StatusCode::BAD_GATEWAY, None);
    let outcome = feed.activate().await;

    assert_eq!(outcome, FetchOutcome::Failed("Internal Server Error".into()));

    Ok(())
}

#[tokio::test]
async fn success_without_json_is_missing_data() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;

    // a 200 with an empty body
    app.backend.fail_next(FEED_ENDPOINT, StatusCode::OK, None);
    let page = PageRequest::new(1, 20);
    let result = backend
        .client
        .get_page::<Post>(FEED_ENDPOINT, FEED_DATA_KEY, &page)
        .await;
    assert!(matches!(
        result,
        Err(ClientError::MissingData(key)) if key == FEED_DATA_KEY
    ));

    app.backend.fail_next(FEED_ENDPOINT, StatusCode::OK, None);
    let feed = FeedPosts::new(backend);
    let outcome = feed.activate().await;
    assert_eq!(outcome, FetchOutcome::Failed("Internal Server Error".into()));

    Ok(())
}

#[tokio::test]
async fn unauthenticated_feed_does_not_fetch() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(3);
    let backend = Backend::new(app.client(), Session::new());
    let feed = FeedPosts::new(backend);

    let outcome = feed.activate().await;

    assert_eq!(outcome, FetchOutcome::Skipped(Skip::NotReady));
    assert_eq!(feed.fetcher().phase(), Phase::Idle);
    assert_eq!(app.backend.total_hits(), 0);

    Ok(())
}

#[tokio::test]
async fn expired_session_clears_identity() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(5);
    let (backend, _) = alice_backend(&app).await?;
    let feed = feed_with_limit(backend.clone(), 2);
    feed.activate().await;

    app.backend.expire_session();
    let outcome = feed.fetch_more().await;

    assert_eq!(outcome, FetchOutcome::Failed("Unauthorized".into()));
    assert!(!backend.session.is_authenticated());
    assert!(!backend.is_ready());

    Ok(())
}

#[tokio::test]
async fn like_toggle_patches_feed() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let ids = app.backend.seed_posts(3);
    let (backend, notifier) = alice_backend(&app).await?;
    let feed = FeedPosts::new(backend);
    feed.activate().await;

    let liked = feed.toggle_like(ids[1]).await?;
    assert_eq!(liked.count.likes, 1);
    let posts = feed.posts();
    assert!(feed.is_liked(&posts[1]));
    assert!(!feed.is_liked(&posts[0]));
    assert_eq!(posts[1].count.likes, 1);
    // patched in place, no refetch
    assert_eq!(app.backend.hits(FEED_ENDPOINT).len(), 1);

    feed.toggle_like(ids[1]).await?;
    assert!(!feed.is_liked(&feed.posts()[1]));

    app.backend.fail_next(
        "/posts/like",
        StatusCode::INTERNAL_SERVER_ERROR,
        None,
    );
    assert!(feed.toggle_like(ids[0]).await.is_err());
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("Internal Server Error".into())]
    );

    Ok(())
}

#[tokio::test]
async fn dropped_feed_discards_page() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(3);
    let (backend, _) = alice_backend(&app).await?;
    let feed = FeedPosts::new(backend);
    let fetcher = feed.fetcher().clone();

    let pending = feed.activate();
    drop(feed);

    assert_eq!(pending.await, FetchOutcome::Discarded);
    assert!(fetcher.is_empty());

    Ok(())
}
