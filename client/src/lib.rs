//! Client-side data layer for the social app: a paginated fetcher and the
//! feed, profile, search, follow and comment consumers built on it, all
//! sharing one credentialed [`payloads::APIClient`] and one [`Session`].
//!
//! Everything here is single threaded. Handles are `Rc`-based and the
//! futures they return are driven by the UI event loop (or a current-thread
//! runtime in tests).

pub mod backend;
pub mod comments;
pub mod config;
pub mod feed;
pub mod fetcher;
pub mod follow;
pub mod loader;
pub mod profile;
pub mod scope;
pub mod search;
pub mod session;
pub mod source;
pub mod telemetry;

pub use backend::{
    Backend, Notification, Notifier, RecordingNotifier, TracingNotifier,
};
pub use comments::{CommentsSection, ReplyThread, SubmitError};
pub use config::{ClientConfig, ConfigError};
pub use feed::{FeedFetcher, FeedPosts};
pub use fetcher::{
    FetchOutcome, FetcherConfig, FetcherState, PaginatedFetcher, Phase, Skip,
};
pub use follow::{
    FollowList, FollowListKind, FollowRequests, FollowRequestsKind,
    FollowToggle,
};
pub use loader::{FetchState, LoadOutcome, Loader};
pub use profile::{ProfilePosts, UserProfile};
pub use scope::{CancelToken, ScopeGuard};
pub use search::{PeopleSearch, SEARCH_DEBOUNCE};
pub use session::{FileStore, IdentityStore, Session};
pub use source::{EndpointSource, PageSource};
