use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use payloads::ClientError;

use crate::scope::{CancelToken, ScopeGuard};

/// Distinguishes "not fetched yet" from "fetched, possibly empty".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    NotFetched,
    Fetched(T),
}

impl<T> FetchState<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Self::NotFetched => None,
            Self::Fetched(data) => Some(data),
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::NotFetched => None,
            Self::Fetched(data) => Some(data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(String),
    /// Not ready, or the initial load already ran.
    Skipped,
    /// Superseded by a newer load, or the owner was torn down.
    Discarded,
}

type FetchFn<T> = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<T, ClientError>>>;

struct Inner<T> {
    data: FetchState<T>,
    is_loading: bool,
    error: Option<String>,
    activated: bool,
    generation: u64,
    listeners: Vec<Rc<dyn Fn()>>,
}

/// One-shot fetch with refetch, for lists that are loaded whole (comments,
/// replies, follow lists).
///
/// Unlike [`crate::PaginatedFetcher`], a load replaces the data instead of
/// appending to it, so a new load supersedes one in flight rather than
/// being rejected: the latest request wins.
pub struct Loader<T> {
    fetch: FetchFn<T>,
    inner: Rc<RefCell<Inner<T>>>,
    token: CancelToken,
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            fetch: self.fetch.clone(),
            inner: self.inner.clone(),
            token: self.token.clone(),
        }
    }
}

impl<T: 'static> Loader<T> {
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, ClientError>> + 'static,
    {
        let inner = Inner {
            data: FetchState::NotFetched,
            is_loading: false,
            error: None,
            activated: false,
            generation: 0,
            listeners: Vec::new(),
        };
        Self {
            fetch: Rc::new(move || fetch().boxed_local()),
            inner: Rc::new(RefCell::new(inner)),
            token: CancelToken::new(),
        }
    }

    /// Load once when `ready` first holds.
    pub fn activate(
        &self,
        ready: bool,
    ) -> impl Future<Output = LoadOutcome> + use<T> {
        let start = if ready && !self.inner.borrow().activated {
            self.start(false)
        } else {
            None
        };
        self.clone().finish(start)
    }

    /// Load (or reload), flagging `is_loading` so the view shows skeletons.
    pub fn load(&self) -> impl Future<Output = LoadOutcome> + use<T> {
        let start = self.start(false);
        self.clone().finish(start)
    }

    /// Reload without flagging `is_loading`; current data stays on screen.
    pub fn load_quietly(&self) -> impl Future<Output = LoadOutcome> + use<T> {
        let start = self.start(true);
        self.clone().finish(start)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn scope(&self) -> ScopeGuard {
        self.token.guard()
    }

    pub fn on_change(&self, listener: impl Fn() + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn is_loading(&self) -> bool {
        self.inner.borrow().is_loading
    }

    pub fn is_fetched(&self) -> bool {
        self.inner.borrow().data.is_fetched()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.borrow().error.clone()
    }

    pub fn with_data<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.borrow().data.as_ref())
    }

    /// Patch fetched data in place. Does nothing before the first load.
    ///
    /// The data is taken out while `f` runs, so `f` may read the loader
    /// (it then sees `NotFetched`).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let taken = std::mem::replace(
            &mut self.inner.borrow_mut().data,
            FetchState::NotFetched,
        );
        let FetchState::Fetched(mut data) = taken else {
            return;
        };
        f(&mut data);
        self.inner.borrow_mut().data = FetchState::Fetched(data);
        self.emit_change();
    }

    fn start(&self, quiet: bool) -> Option<Pending<T>> {
        if self.token.is_cancelled() {
            return None;
        }
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.activated = true;
            inner.error = None;
            if !quiet {
                inner.is_loading = true;
            }
            inner.generation
        };
        self.emit_change();
        Some(Pending {
            inner: self.inner.clone(),
            generation,
            armed: true,
        })
    }

    async fn finish(self, start: Option<Pending<T>>) -> LoadOutcome {
        let Some(pending) = start else {
            return LoadOutcome::Skipped;
        };
        let generation = pending.generation;
        let result = (self.fetch)().await;

        if self.token.is_cancelled()
            || self.inner.borrow().generation != generation
        {
            return LoadOutcome::Discarded;
        }
        pending.disarm();

        let outcome = {
            let mut inner = self.inner.borrow_mut();
            inner.is_loading = false;
            match result {
                Ok(data) => {
                    inner.data = FetchState::Fetched(data);
                    inner.error = None;
                    LoadOutcome::Loaded
                }
                Err(e) => {
                    let message = e.display_message();
                    tracing::warn!(error = %message, "load failed");
                    inner.error = Some(message.clone());
                    LoadOutcome::Failed(message)
                }
            }
        };
        self.emit_change();
        outcome
    }

    fn emit_change(&self) {
        if self.token.is_cancelled() {
            return;
        }
        let listeners = self.inner.borrow().listeners.clone();
        for listener in listeners {
            listener();
        }
    }
}

/// Clears `is_loading` if a load future is dropped before it commits.
struct Pending<T> {
    inner: Rc<RefCell<Inner<T>>>,
    generation: u64,
    armed: bool,
}

impl<T> Pending<T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            if inner.generation == self.generation {
                inner.is_loading = false;
            }
        }
    }
}

impl<T: Clone + 'static> Loader<T> {
    pub fn data(&self) -> FetchState<T> {
        self.inner.borrow().data.clone()
    }
}
