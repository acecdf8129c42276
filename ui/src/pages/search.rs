use std::future::Future;

use client::{LoadOutcome, PeopleSearch};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::FetchError;
use crate::contexts::use_backend;

const SKELETON_COUNT: usize = 4;

fn run(next: impl Future<Output = LoadOutcome> + 'static) {
    yew::platform::spawn_local(async move {
        next.await;
    });
}

#[function_component]
pub fn SearchPage() -> Html {
    let backend = use_backend();
    let update = use_force_update();
    let search = use_memo((), {
        let update = update.clone();
        move |_| {
            let search =
                PeopleSearch::new(backend, gloo_timers::future::sleep);
            search.loader().on_change(move || update.force_update());
            search
        }
    });

    {
        let search = search.clone();
        use_effect_with((), move |_| run(search.activate()));
    }

    let oninput = {
        let search = search.clone();
        let update = update.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            run(search.input(input.value()));
            update.force_update();
        })
    };
    let on_clear = {
        let search = search.clone();
        Callback::from(move |_: MouseEvent| {
            run(search.clear());
            update.force_update();
        })
    };
    let on_retry = {
        let search = search.clone();
        Callback::from(move |_| run(search.retry()))
    };

    let results = if let Some(message) = search.error() {
        html! { <FetchError message={message} {on_retry} /> }
    } else if search.is_loading() || !search.users().is_fetched() {
        html! {
            {for (0..SKELETON_COUNT).map(|_| html! {
                <div class="h-12 my-2 rounded-md bg-neutral-200 animate-pulse" />
            })}
        }
    } else {
        let users = search.users().as_ref().cloned().unwrap_or_default();
        if users.is_empty() {
            html! {
                <p class="py-4 text-center text-sm text-neutral-500">
                    {"No users found"}
                </p>
            }
        } else {
            html! {
                {for users.iter().map(|user| html! {
                    <div key={user.id.0.to_string()} class="flex flex-col py-2">
                        <span class="font-medium">{&user.username}</span>
                        <span class="text-sm text-neutral-500">
                            {user.full_name()}
                        </span>
                    </div>
                })}
            }
        }
    };

    html! {
        <main class="max-w-2xl mx-auto px-4 py-8">
            <div class="flex items-center gap-4 border-b-2 pb-3">
                <input type="text" value={search.value()} {oninput}
                    placeholder="Search user by username or name..."
                    class="w-full outline-none" />
                <button onclick={on_clear} title="Clear"
                    class="text-neutral-500 hover:text-neutral-900">
                    {"×"}
                </button>
            </div>
            <section class="mt-6">{results}</section>
        </main>
    }
}
