use std::future::Future;

use payloads::responses::Post;
use payloads::{ClientError, PostId};

use crate::fetcher::{FetchOutcome, FetcherConfig, PaginatedFetcher};
use crate::scope::ScopeGuard;
use crate::source::EndpointSource;
use crate::{Backend, FetcherState};

pub const FEED_ENDPOINT: &str = "/posts/feed";
pub const FEED_DATA_KEY: &str = "posts";

pub type FeedFetcher = PaginatedFetcher<Post, EndpointSource>;

/// The home feed: posts from followed users, loaded page by page.
///
/// Dropping the feed cancels any page still in flight.
pub struct FeedPosts {
    backend: Backend,
    fetcher: FeedFetcher,
    _scope: ScopeGuard,
}

impl FeedPosts {
    pub fn new(backend: Backend) -> Self {
        Self::with_config(backend, FetcherConfig::new(FEED_ENDPOINT, FEED_DATA_KEY))
    }

    pub fn with_config(backend: Backend, config: FetcherConfig) -> Self {
        let source = EndpointSource::new(backend.clone(), &config);
        Self::from_fetcher(backend, PaginatedFetcher::new(config, source))
    }

    /// Wrap a fetcher created elsewhere, e.g. by a UI hook that owns it.
    pub fn from_fetcher(backend: Backend, fetcher: FeedFetcher) -> Self {
        let scope = fetcher.scope();
        Self {
            backend,
            fetcher,
            _scope: scope,
        }
    }

    pub fn fetcher(&self) -> &FeedFetcher {
        &self.fetcher
    }

    /// Initial fetch, once the session is authenticated.
    pub fn activate(&self) -> impl Future<Output = FetchOutcome> + use<> {
        self.fetcher.activate(self.backend.is_ready())
    }

    pub fn fetch_more(&self) -> impl Future<Output = FetchOutcome> + use<> {
        self.fetcher.fetch_more()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.fetcher.items()
    }

    pub fn state(&self) -> FetcherState<Post> {
        self.fetcher.state()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetcher.is_fetching()
    }

    pub fn error(&self) -> Option<String> {
        self.fetcher.error()
    }

    pub fn has_more(&self) -> bool {
        self.fetcher.has_more()
    }

    pub fn is_liked(&self, post: &Post) -> bool {
        self.backend
            .session
            .user_id()
            .is_some_and(|user_id| post.is_liked_by(user_id))
    }

    /// Like or unlike a post, swapping the returned post into the feed.
    pub async fn toggle_like(&self, post_id: PostId) -> Result<Post, ClientError> {
        let post = self
            .backend
            .mutate(
                "Failed to like the post",
                self.backend.client.like_post(&post_id),
            )
            .await?;
        self.fetcher.update_items(|posts| {
            for existing in posts.iter_mut().filter(|p| p.id == post.id) {
                *existing = post.clone();
            }
        });
        Ok(post)
    }
}
