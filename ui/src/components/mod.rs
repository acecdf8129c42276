pub mod fetch_error;
pub mod load_more_button;
pub mod post_card;
pub mod toast;

pub use fetch_error::FetchError;
pub use load_more_button::LoadMoreButton;
pub use post_card::{PostCard, PostSkeleton};
pub use toast::ToastContainer;
