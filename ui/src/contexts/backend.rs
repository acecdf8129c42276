use std::rc::Rc;

use client::{Backend, Session};
use payloads::responses::UserSummary;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::contexts::toast::use_toast;
use crate::get_api_client;
use crate::state::{AuthState, State};
use crate::storage::LocalStorage;

/// The one credentialed client and session shared by every page.
#[derive(Clone)]
pub struct BackendContext(pub Backend);

impl PartialEq for BackendContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0.client, &other.0.client)
    }
}

#[derive(Properties, PartialEq)]
pub struct BackendProviderProps {
    pub children: Children,
}

/// Must sit inside a `ToastProvider`: failed mutations become toasts.
///
/// The session starts from the identity kept in local storage, and the
/// store's auth state follows it, including when an expired session is
/// cleared by a 401.
#[function_component]
pub fn BackendProvider(props: &BackendProviderProps) -> Html {
    let toast = use_toast();
    let dispatch = use_dispatch::<State>();
    let backend = use_memo((), move |_| {
        let session = Session::with_store(LocalStorage);
        let sync = move |user: Option<&UserSummary>| {
            let auth_state = match user {
                Some(user) => AuthState::LoggedIn(user.clone()),
                None => AuthState::LoggedOut,
            };
            dispatch.reduce_mut(|state| state.auth_state = auth_state);
        };
        sync(session.user().as_ref());
        session.on_change(sync);
        BackendContext(
            Backend::new(get_api_client(), session).with_notifier(toast),
        )
    });

    html! {
        <ContextProvider<BackendContext> context={(*backend).clone()}>
            {props.children.clone()}
        </ContextProvider<BackendContext>>
    }
}

#[hook]
pub fn use_backend() -> Backend {
    use_context::<BackendContext>()
        .expect("use_backend must be used within a BackendProvider")
        .0
}
