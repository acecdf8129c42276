//! Page-by-page loading of a listing into one growing list.
//!
//! A [`PaginatedFetcher`] requests pages from a [`PageSource`], appends each
//! page to its items in arrival order, and stops for good once a page comes
//! back shorter than the configured limit. At most one request is in flight
//! at a time: the busy check runs when `fetch_more`/`activate` is called,
//! before the returned future is first polled, so back-to-back calls can not
//! both reach the network.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use payloads::requests::{DEFAULT_PAGE_LIMIT, PageRequest};

use crate::scope::{CancelToken, ScopeGuard};
use crate::source::PageSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Path of the listing, e.g. `/posts/feed`.
    pub endpoint: String,
    /// Field of the response body holding the page's items.
    pub data_key: String,
    pub limit: u32,
    pub start_page: u32,
}

impl FetcherConfig {
    pub fn new(endpoint: impl Into<String>, data_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            data_key: data_key.into(),
            limit: DEFAULT_PAGE_LIMIT,
            start_page: 1,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page.max(1);
        self
    }
}

/// Snapshot of a fetcher, as rendered by the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherState<T> {
    /// Last page successfully loaded, or the start page before any load.
    pub current_page: u32,
    pub items: Vec<T>,
    pub is_fetching: bool,
    pub error: Option<String>,
    /// False once a page returned fewer items than the limit. Never reset
    /// except by [`PaginatedFetcher::refetch`].
    pub has_more: bool,
}

impl<T> FetcherState<T> {
    fn initial(start_page: u32) -> Self {
        Self {
            current_page: start_page,
            items: Vec::new(),
            is_fetching: false,
            error: None,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing attempted yet.
    Idle,
    Loading,
    ReadyHasMore,
    /// Terminal until the fetcher is recreated or refetched.
    ReadyExhausted,
    /// Last attempt failed; retry with `fetch_more` (or `refetch`).
    Error,
}

/// Why a fetch call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// A request is already in flight.
    Busy,
    /// A short page was already seen.
    Exhausted,
    /// The readiness signal (e.g. an authenticated session) was false.
    NotReady,
    /// The initial fetch already happened.
    AlreadyActivated,
    /// The owning scope was torn down.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { page: u32, count: usize },
    Failed(String),
    Skipped(Skip),
    /// The response arrived after cancellation or a refetch and was dropped.
    Discarded,
}

type Listener = Rc<dyn Fn()>;
type ErrorListener = Rc<dyn Fn(&str)>;

struct Inner<T> {
    state: FetcherState<T>,
    loaded_any: bool,
    activated: bool,
    /// Bumped by `refetch`; responses from older generations are dropped.
    generation: u64,
    listeners: Vec<Listener>,
    error_listeners: Vec<ErrorListener>,
}

struct Ticket<T> {
    request: PageRequest,
    slot: InFlight<T>,
}

/// Holds the single in-flight slot. If the request future is dropped before
/// it commits (a timeout, an aborted task), dropping this releases the slot
/// so the next `fetch_more` is not rejected as busy.
struct InFlight<T> {
    inner: Rc<RefCell<Inner<T>>>,
    token: CancelToken,
    generation: u64,
    armed: bool,
}

impl<T> InFlight<T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let listeners = {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                return;
            };
            if inner.generation != self.generation || !inner.state.is_fetching {
                return;
            }
            inner.state.is_fetching = false;
            inner.listeners.clone()
        };
        tracing::debug!("page request dropped before completing");
        if !self.token.is_cancelled() {
            for listener in listeners {
                listener();
            }
        }
    }
}

/// Cursor-based page accumulator. Cloning yields another handle to the same
/// state.
pub struct PaginatedFetcher<T, S> {
    config: Rc<FetcherConfig>,
    source: Rc<S>,
    inner: Rc<RefCell<Inner<T>>>,
    token: CancelToken,
}

impl<T, S> Clone for PaginatedFetcher<T, S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            source: self.source.clone(),
            inner: self.inner.clone(),
            token: self.token.clone(),
        }
    }
}

impl<T: 'static, S: PageSource<T> + 'static> PaginatedFetcher<T, S> {
    pub fn new(config: FetcherConfig, source: S) -> Self {
        let inner = Inner {
            state: FetcherState::initial(config.start_page),
            loaded_any: false,
            activated: false,
            generation: 0,
            listeners: Vec::new(),
            error_listeners: Vec::new(),
        };
        Self {
            config: Rc::new(config),
            source: Rc::new(source),
            inner: Rc::new(RefCell::new(inner)),
            token: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Run the initial fetch of the start page, once, if `ready` holds.
    ///
    /// Safe to call on every render or readiness change: only the first call
    /// with `ready == true` issues a request.
    pub fn activate(
        &self,
        ready: bool,
    ) -> impl Future<Output = FetchOutcome> + use<T, S> {
        let ticket = if !ready {
            Err(Skip::NotReady)
        } else if self.inner.borrow().activated {
            Err(Skip::AlreadyActivated)
        } else {
            self.begin()
        };
        self.clone().finish(ticket)
    }

    /// Load the next page. A no-op while a request is in flight or after the
    /// listing is exhausted.
    pub fn fetch_more(&self) -> impl Future<Output = FetchOutcome> + use<T, S> {
        let ticket = self.begin();
        self.clone().finish(ticket)
    }

    /// Drop everything loaded so far and fetch the start page again.
    ///
    /// Consumers call this after mutations that change list membership;
    /// the fetcher has no invalidation of its own. Any request still in
    /// flight is discarded when it completes.
    pub fn refetch(&self) -> impl Future<Output = FetchOutcome> + use<T, S> {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.state = FetcherState::initial(self.config.start_page);
            inner.loaded_any = false;
            inner.activated = false;
        }
        let ticket = self.begin();
        self.clone().finish(ticket)
    }

    /// Mark the owner as gone. Later responses are discarded unseen.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A guard that cancels this fetcher when dropped.
    pub fn scope(&self) -> ScopeGuard {
        self.token.guard()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Register a callback run after every state change.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    /// Register a callback receiving the message of every failed fetch, for
    /// views that replace the whole page with an error screen.
    pub fn on_error(&self, listener: impl Fn(&str) + 'static) {
        self.inner
            .borrow_mut()
            .error_listeners
            .push(Rc::new(listener));
    }

    pub fn phase(&self) -> Phase {
        let inner = self.inner.borrow();
        let state = &inner.state;
        if state.is_fetching {
            Phase::Loading
        } else if state.error.is_some() {
            Phase::Error
        } else if !inner.loaded_any {
            Phase::Idle
        } else if state.has_more {
            Phase::ReadyHasMore
        } else {
            Phase::ReadyExhausted
        }
    }

    pub fn current_page(&self) -> u32 {
        self.inner.borrow().state.current_page
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.borrow().state.is_fetching
    }

    pub fn error(&self) -> Option<String> {
        self.inner.borrow().state.error.clone()
    }

    pub fn has_more(&self) -> bool {
        self.inner.borrow().state.has_more
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.borrow().state.items)
    }

    /// Patch loaded items in place, e.g. to swap in an entity returned by a
    /// mutation. Paging state is untouched.
    pub fn update_items<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let result = f(&mut self.inner.borrow_mut().state.items);
        self.emit_change();
        result
    }

    /// Claim the single in-flight slot and pick the page to request.
    fn begin(&self) -> Result<Ticket<T>, Skip> {
        if self.token.is_cancelled() {
            return Err(Skip::Cancelled);
        }
        let ticket = {
            let mut inner = self.inner.borrow_mut();
            if inner.state.is_fetching {
                return Err(Skip::Busy);
            }
            if !inner.state.has_more {
                return Err(Skip::Exhausted);
            }
            let page = if inner.loaded_any {
                inner.state.current_page + 1
            } else {
                self.config.start_page
            };
            inner.state.is_fetching = true;
            inner.activated = true;
            Ticket {
                request: PageRequest::new(page, self.config.limit),
                slot: InFlight {
                    inner: self.inner.clone(),
                    token: self.token.clone(),
                    generation: inner.generation,
                    armed: true,
                },
            }
        };
        self.emit_change();
        Ok(ticket)
    }

    async fn finish(self, ticket: Result<Ticket<T>, Skip>) -> FetchOutcome {
        match ticket {
            Ok(ticket) => self.run(ticket).await,
            Err(skip) => {
                tracing::trace!(endpoint = %self.config.endpoint, ?skip, "fetch skipped");
                FetchOutcome::Skipped(skip)
            }
        }
    }

    async fn run(&self, ticket: Ticket<T>) -> FetchOutcome {
        let Ticket { request, slot } = ticket;
        let generation = slot.generation;
        tracing::debug!(
            endpoint = %self.config.endpoint,
            page = request.page,
            limit = request.limit,
            "fetching page"
        );
        let result = self.source.fetch_page(request).await;

        if self.token.is_cancelled()
            || self.inner.borrow().generation != generation
        {
            tracing::debug!(
                endpoint = %self.config.endpoint,
                page = request.page,
                "discarding stale page"
            );
            return FetchOutcome::Discarded;
        }

        let outcome = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            inner.state.is_fetching = false;
            match result {
                Ok(items) => {
                    let count = items.len();
                    inner.state.items.extend(items);
                    inner.state.current_page = request.page;
                    inner.state.has_more = count >= request.limit as usize;
                    inner.state.error = None;
                    inner.loaded_any = true;
                    FetchOutcome::Loaded {
                        page: request.page,
                        count,
                    }
                }
                Err(e) => {
                    let message = e.display_message();
                    inner.state.error = Some(message.clone());
                    FetchOutcome::Failed(message)
                }
            }
        };
        slot.disarm();

        match &outcome {
            FetchOutcome::Loaded { page, count } => {
                tracing::debug!(endpoint = %self.config.endpoint, page, count, "page loaded");
            }
            FetchOutcome::Failed(message) => {
                tracing::warn!(
                    endpoint = %self.config.endpoint,
                    page = request.page,
                    error = %message,
                    "failed to fetch page"
                );
                self.emit_error(message);
            }
            _ => {}
        }
        self.emit_change();
        outcome
    }

    fn emit_change(&self) {
        if self.token.is_cancelled() {
            return;
        }
        // Listeners may read the fetcher, so no borrow is held while they run.
        let listeners = self.inner.borrow().listeners.clone();
        for listener in listeners {
            listener();
        }
    }

    fn emit_error(&self, message: &str) {
        let listeners = self.inner.borrow().error_listeners.clone();
        for listener in listeners {
            listener(message);
        }
    }
}

impl<T: Clone + 'static, S: PageSource<T> + 'static> PaginatedFetcher<T, S> {
    pub fn state(&self) -> FetcherState<T> {
        self.inner.borrow().state.clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.borrow().state.items.clone()
    }
}
