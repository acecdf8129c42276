use client::feed::{FEED_DATA_KEY, FEED_ENDPOINT};
use client::{FeedPosts, FetcherConfig, FetcherState, Phase};
use payloads::responses::Post;
use payloads::{PostId, UserId};
use yew::prelude::*;
use yewdux::prelude::*;

use crate::contexts::backend::use_backend;
use crate::hooks::use_paginated_fetch;
use crate::state::State;

/// The home feed shared by everything rendered under the provider.
#[derive(Clone, PartialEq)]
pub struct FeedPostsContext {
    pub state: FetcherState<Post>,
    pub phase: Phase,
    pub viewer: Option<UserId>,
    pub fetch_more: Callback<()>,
    pub toggle_like: Callback<PostId>,
}

impl FeedPostsContext {
    pub fn is_liked(&self, post: &Post) -> bool {
        self.viewer.is_some_and(|viewer| post.is_liked_by(viewer))
    }
}

#[derive(Properties, PartialEq)]
pub struct FeedPostsProviderProps {
    pub children: Children,
}

#[function_component]
pub fn FeedPostsProvider(props: &FeedPostsProviderProps) -> Html {
    let backend = use_backend();
    let (state, _) = use_store::<State>();
    let handle = use_paginated_fetch::<Post>(FetcherConfig::new(
        FEED_ENDPOINT,
        FEED_DATA_KEY,
    ));

    let feed = {
        let fetcher = handle.fetcher.clone();
        use_memo((), move |_| FeedPosts::from_fetcher(backend, fetcher))
    };

    let toggle_like = {
        let feed = feed.clone();
        Callback::from(move |post_id: PostId| {
            let feed = feed.clone();
            yew::platform::spawn_local(async move {
                // failures are reported as toasts by the backend
                if let Err(e) = feed.toggle_like(post_id).await {
                    tracing::debug!("like failed: {e}");
                }
            });
        })
    };

    let context = FeedPostsContext {
        state: handle.state,
        phase: handle.phase,
        viewer: state.user().map(|user| user.id),
        fetch_more: handle.fetch_more,
        toggle_like,
    };

    html! {
        <ContextProvider<FeedPostsContext> context={context}>
            {props.children.clone()}
        </ContextProvider<FeedPostsContext>>
    }
}

#[hook]
pub fn use_feed_posts() -> FeedPostsContext {
    use_context::<FeedPostsContext>()
        .expect("use_feed_posts must be used within a FeedPostsProvider")
}
