pub mod feed;
pub mod login;
pub mod search;

pub use feed::FeedPage;
pub use login::LoginPage;
pub use search::SearchPage;
