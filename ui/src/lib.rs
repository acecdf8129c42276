use payloads::APIClient;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

mod components;
mod contexts;
mod hooks;
mod logs;
mod pages;
mod state;
mod storage;

use components::ToastContainer;
use contexts::{BackendProvider, FeedPostsProvider, ToastProvider};
use pages::{FeedPage, LoginPage, SearchPage};
use state::State;

/// The backend address, set at build time or else the page's own origin.
pub fn get_api_client() -> APIClient {
    let address = option_env!("BACKEND_URL")
        .map(|url| url.to_string())
        .or_else(|| {
            web_sys::window().and_then(|window| window.location().origin().ok())
        })
        .unwrap_or_default();

    APIClient {
        address,
        inner_client: reqwest::Client::new(),
    }
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <ToastProvider>
            <BackendProvider>
                <BrowserRouter>
                    <div class="min-h-screen bg-white text-neutral-900">
                        <Switch<Route> render={switch} />
                    </div>
                    <ToastContainer />
                </BrowserRouter>
            </BackendProvider>
        </ToastProvider>
    }
}

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/search")]
    Search,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Home /> },
        Route::Login => html! { <LoginPage /> },
        Route::Search => html! { <SearchPage /> },
        Route::NotFound => html! {
            <main class="max-w-2xl mx-auto px-4 py-8 text-center">
                <h1 class="text-4xl font-bold">{"404"}</h1>
                <p class="text-neutral-600">{"Page not found"}</p>
            </main>
        },
    }
}

/// The feed for a signed in user, the login form otherwise.
#[function_component]
fn Home() -> Html {
    let (state, _) = use_store::<State>();

    if !state.is_authenticated() {
        return html! { <LoginPage /> };
    }

    html! {
        <FeedPostsProvider>
            <FeedPage />
        </FeedPostsProvider>
    }
}
