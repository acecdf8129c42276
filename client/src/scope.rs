//! Cancellation tied to the lifetime of whatever owns a fetcher.

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag marking the owning scope as torn down. Cloned into every
/// in-flight request so a late response can check it before committing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }

    /// A guard that cancels this token when dropped.
    pub fn guard(&self) -> ScopeGuard {
        ScopeGuard {
            token: self.clone(),
        }
    }
}

/// Cancels its token on drop. Owners (a feed, a comment section, a UI
/// component) hold one of these for as long as they are mounted.
#[derive(Debug)]
pub struct ScopeGuard {
    token: CancelToken,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
