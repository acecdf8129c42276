use client::Phase;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::Route;
use crate::components::{FetchError, LoadMoreButton, PostCard, PostSkeleton};
use crate::contexts::{use_backend, use_feed_posts};
use crate::state::State;

const SKELETON_COUNT: usize = 3;

#[function_component]
pub fn FeedPage() -> Html {
    let feed = use_feed_posts();
    let state = &feed.state;

    let posts = state.items.iter().map(|post| {
        let post_id = post.id;
        let on_toggle_like = feed.toggle_like.reform(move |_| post_id);
        html! {
            <PostCard
                key={post.id.0.to_string()}
                post={post.clone()}
                liked={feed.is_liked(post)}
                {on_toggle_like}
            />
        }
    });

    let initial_load = state.items.is_empty() && state.is_fetching;
    let exhausted = feed.phase == Phase::ReadyExhausted;

    html! {
        <main class="max-w-2xl mx-auto px-4 py-8">
            <FeedHeader />
            if initial_load {
                {for (0..SKELETON_COUNT).map(|_| html! { <PostSkeleton /> })}
            }
            {for posts}
            if let Some(message) = &state.error {
                <FetchError
                    message={message.clone()}
                    on_retry={feed.fetch_more.clone()}
                />
            } else if !initial_load {
                <LoadMoreButton
                    has_more={state.has_more}
                    is_fetching={state.is_fetching}
                    on_click={feed.fetch_more.clone()}
                />
            }
            if exhausted {
                <p class="py-4 text-center text-sm text-neutral-500">
                    if state.items.is_empty() {
                        {"Nothing here yet"}
                    } else {
                        {"You're all caught up"}
                    }
                </p>
            }
        </main>
    }
}

#[function_component]
fn FeedHeader() -> Html {
    let backend = use_backend();
    let state = use_store_value::<State>();
    let name = state.user().map(|user| user.full_name()).unwrap_or_default();

    let on_logout = Callback::from(move |_: MouseEvent| {
        let backend = backend.clone();
        yew::platform::spawn_local(async move {
            // signs this tab out even when the request fails
            let _ = backend.logout().await;
        });
    });

    html! {
        <header class="flex items-center justify-between mb-6">
            <h1 class="text-xl font-bold">{"Feed"}</h1>
            <div class="flex items-center space-x-3 text-sm">
                <Link<Route> to={Route::Search} classes="underline">
                    {"Search"}
                </Link<Route>>
                <span>{name}</span>
                <button onclick={on_logout} class="underline">{"Log out"}</button>
            </div>
        </header>
    }
}
