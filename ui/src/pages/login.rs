use payloads::requests;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::Route;
use crate::contexts::use_backend;
use crate::state::State;

#[function_component]
pub fn LoginPage() -> Html {
    let backend = use_backend();
    let navigator = use_navigator();
    let state = use_store_value::<State>();

    let username_ref = use_node_ref();
    let password_ref = use_node_ref();
    let error_message = use_state(|| None::<String>);
    let is_loading = use_state(|| false);

    {
        let navigator = navigator.clone();
        use_effect_with(state.is_authenticated(), move |is_auth| {
            if let (true, Some(navigator)) = (*is_auth, navigator) {
                navigator.push(&Route::Home);
            }
        });
    }

    let onsubmit = {
        let username_ref = username_ref.clone();
        let password_ref = password_ref.clone();
        let error_message = error_message.clone();
        let is_loading = is_loading.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();

            let value = |node: &NodeRef| {
                node.cast::<HtmlInputElement>()
                    .map(|input| input.value())
                    .unwrap_or_default()
            };
            let credentials = requests::LoginCredentials {
                username: value(&username_ref),
                password: value(&password_ref),
            };
            if credentials.username.is_empty()
                || credentials.password.is_empty()
            {
                error_message
                    .set(Some("Enter a username and password".to_string()));
                return;
            }

            let backend = backend.clone();
            let error_message = error_message.clone();
            let is_loading = is_loading.clone();

            yew::platform::spawn_local(async move {
                is_loading.set(true);
                error_message.set(None);

                // on success the session listener updates the auth state
                if let Err(e) = backend.login(&credentials).await {
                    error_message.set(Some(e.display_message()));
                }

                is_loading.set(false);
            });
        })
    };

    html! {
        <main class="max-w-sm mx-auto px-4 py-16">
            <h1 class="mb-6 text-2xl font-bold">{"Sign in"}</h1>
            <form {onsubmit} class="space-y-4">
                <input ref={username_ref} type="text" placeholder="Username"
                    autocomplete="username"
                    class="w-full px-3 py-2 rounded-md border border-neutral-300" />
                <input ref={password_ref} type="password" placeholder="Password"
                    autocomplete="current-password"
                    class="w-full px-3 py-2 rounded-md border border-neutral-300" />
                if let Some(message) = &*error_message {
                    <p class="text-sm text-red-600">{message}</p>
                }
                <button type="submit" disabled={*is_loading}
                    class="w-full px-4 py-2 rounded-md bg-neutral-900 text-white disabled:opacity-50">
                    if *is_loading { {"Signing in..."} } else { {"Sign in"} }
                </button>
            </form>
        </main>
    }
}
