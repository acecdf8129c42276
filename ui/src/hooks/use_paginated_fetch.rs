use client::{
    EndpointSource, FetcherConfig, FetcherState, PaginatedFetcher, Phase,
    ScopeGuard,
};
use serde::de::DeserializeOwned;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::contexts::backend::use_backend;
use crate::state::State;

/// Paginated fetch hook return type
pub struct PaginatedFetchHandle<T> {
    pub state: FetcherState<T>,
    pub phase: Phase,
    /// Load the next page; also the retry action after an error.
    pub fetch_more: Callback<()>,
    pub refetch: Callback<()>,
    pub fetcher: PaginatedFetcher<T, EndpointSource>,
}

/// Owns the fetcher for as long as the component is mounted.
struct Scoped<T> {
    fetcher: PaginatedFetcher<T, EndpointSource>,
    _scope: ScopeGuard,
}

/// Page through `config.endpoint`, starting once the user is logged in.
///
/// Any state change of the fetcher re-renders the component. Unmounting
/// cancels the fetcher, so a page arriving afterwards is dropped.
#[hook]
pub fn use_paginated_fetch<T>(config: FetcherConfig) -> PaginatedFetchHandle<T>
where
    T: Clone + DeserializeOwned + 'static,
{
    let backend = use_backend();
    let state = use_store_value::<State>();
    let ready = state.is_authenticated();
    let update = use_force_update();

    let scoped = use_memo(config.clone(), move |config| {
        let source = EndpointSource::new(backend.clone(), config);
        let fetcher = PaginatedFetcher::new(config.clone(), source);
        fetcher.on_change(move || update.force_update());
        let scope = fetcher.scope();
        Scoped {
            fetcher,
            _scope: scope,
        }
    });
    let fetcher = scoped.fetcher.clone();

    {
        let fetcher = fetcher.clone();
        use_effect_with((ready, config), move |(ready, _)| {
            let activation = fetcher.activate(*ready);
            yew::platform::spawn_local(async move {
                activation.await;
            });
        });
    }

    let fetch_more = {
        let fetcher = fetcher.clone();
        Callback::from(move |_| {
            let next = fetcher.fetch_more();
            yew::platform::spawn_local(async move {
                next.await;
            });
        })
    };

    let refetch = {
        let fetcher = fetcher.clone();
        Callback::from(move |_| {
            let reload = fetcher.refetch();
            yew::platform::spawn_local(async move {
                reload.await;
            });
        })
    };

    PaginatedFetchHandle {
        state: fetcher.state(),
        phase: fetcher.phase(),
        fetch_more,
        refetch,
        fetcher,
    }
}
