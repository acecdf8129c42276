use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use payloads::responses::UserSummary;

use crate::Backend;
use crate::loader::{FetchState, LoadOutcome, Loader};
use crate::scope::ScopeGuard;

/// Typing pause after which the search is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

type SleepFn = Rc<dyn Fn(Duration) -> LocalBoxFuture<'static, ()>>;

/// The people search page: a text input whose value, once the user stops
/// typing, becomes the query of a user search.
///
/// The timer is injected so that the browser and the tests can each supply
/// their own.
pub struct PeopleSearch {
    backend: Backend,
    value: RefCell<String>,
    /// Value the current results were requested for.
    query: Rc<RefCell<String>>,
    input_generation: Rc<Cell<u64>>,
    sleep: SleepFn,
    debounce: Duration,
    loader: Loader<Vec<UserSummary>>,
    _scope: ScopeGuard,
}

impl PeopleSearch {
    pub fn new<S, Fut>(backend: Backend, sleep: S) -> Self
    where
        S: Fn(Duration) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let query = Rc::new(RefCell::new(String::new()));
        let loader = Loader::new({
            let backend = backend.clone();
            let query = query.clone();
            move || {
                let backend = backend.clone();
                let search = query.borrow().clone();
                async move {
                    backend.call(backend.client.search_users(&search)).await
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            value: RefCell::new(String::new()),
            query,
            input_generation: Rc::new(Cell::new(0)),
            sleep: Rc::new(move |duration| sleep(duration).boxed_local()),
            debounce: SEARCH_DEBOUNCE,
            loader,
            _scope: scope,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn loader(&self) -> &Loader<Vec<UserSummary>> {
        &self.loader
    }

    /// First load, listing everyone.
    pub fn activate(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.activate(self.backend.is_ready())
    }

    /// Record a keystroke. The returned future waits out the debounce and
    /// then searches, unless newer input arrived meanwhile
    /// ([`LoadOutcome::Discarded`]) or the query did not change
    /// ([`LoadOutcome::Skipped`]).
    pub fn input<V: Into<String>>(
        &self,
        value: V,
    ) -> impl Future<Output = LoadOutcome> + use<V> {
        let value = value.into();
        *self.value.borrow_mut() = value.clone();
        let generation = self.input_generation.get() + 1;
        self.input_generation.set(generation);

        let pause = (self.sleep)(self.debounce);
        let input_generation = self.input_generation.clone();
        let query = self.query.clone();
        let loader = self.loader.clone();
        async move {
            pause.await;
            if input_generation.get() != generation {
                return LoadOutcome::Discarded;
            }
            if *query.borrow() == value {
                return LoadOutcome::Skipped;
            }
            *query.borrow_mut() = value;
            loader.load().await
        }
    }

    pub fn clear(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.input("")
    }

    /// Search again for the current query after a failure.
    pub fn retry(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    /// What the user typed.
    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    /// What was last searched for.
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    pub fn users(&self) -> FetchState<Vec<UserSummary>> {
        self.loader.data()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.loader.error()
    }
}
