pub mod backend;
pub mod feed_posts;
pub mod toast;

pub use backend::{BackendProvider, use_backend};
pub use feed_posts::{FeedPostsProvider, use_feed_posts};
pub use toast::ToastProvider;
