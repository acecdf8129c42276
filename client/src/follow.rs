use std::cell::Cell;
use std::future::Future;

use payloads::responses::{FollowRecord, UserSummary};
use payloads::{ClientError, FollowRequestId, UserId};

use crate::loader::{FetchState, LoadOutcome, Loader};
use crate::scope::ScopeGuard;
use crate::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowListKind {
    Followers,
    Followings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowToggle {
    Followed,
    Unfollowed,
    /// The viewer can not follow themself, or there was nothing loaded to
    /// toggle yet.
    Unchanged,
}

/// Followers or followings of one user, with follow/unfollow buttons.
pub struct FollowList {
    backend: Backend,
    kind: FollowListKind,
    loader: Loader<Vec<FollowRecord>>,
    request_loading: Cell<bool>,
    _scope: ScopeGuard,
}

impl FollowList {
    pub fn new(backend: Backend, user_id: UserId, kind: FollowListKind) -> Self {
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    let client = &backend.client;
                    match kind {
                        FollowListKind::Followers => {
                            backend.call(client.get_followers(&user_id)).await
                        }
                        FollowListKind::Followings => {
                            backend.call(client.get_followings(&user_id)).await
                        }
                    }
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            kind,
            loader,
            request_loading: Cell::new(false),
            _scope: scope,
        }
    }

    pub fn kind(&self) -> FollowListKind {
        self.kind
    }

    pub fn loader(&self) -> &Loader<Vec<FollowRecord>> {
        &self.loader
    }

    /// Loads the list; the modal calls this each time it opens.
    pub fn load(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    pub fn users(&self) -> FetchState<Vec<FollowRecord>> {
        self.loader.data()
    }

    pub fn is_request_loading(&self) -> bool {
        self.request_loading.get()
    }

    /// The user listed by a record: the follower for a followers list, the
    /// followed user for a followings list.
    pub fn counterpart<'a>(&self, record: &'a FollowRecord) -> &'a UserSummary {
        match self.kind {
            FollowListKind::Followers => &record.request_by,
            FollowListKind::Followings => &record.request_to,
        }
    }

    /// Follow the listed user, or drop the viewer's existing request to
    /// them (unfollow or cancel), then reload the list.
    pub async fn toggle_follow(
        &self,
        record: &FollowRecord,
    ) -> Result<FollowToggle, ClientError> {
        let target = self.counterpart(record);
        if self.backend.session.user_id() == Some(target.id) {
            return Ok(FollowToggle::Unchanged);
        }

        self.request_loading.set(true);
        let client = &self.backend.client;
        let result = match target.viewer_follow_request() {
            Some(request_id) => self
                .backend
                .mutate(
                    "Failed to unfollow user",
                    client.delete_follow_request(&request_id),
                )
                .await
                .map(|_| FollowToggle::Unfollowed),
            None => self
                .backend
                .mutate("Failed to follow user", client.follow_user(&target.id))
                .await
                .map(|_| FollowToggle::Followed),
        };
        self.request_loading.set(false);

        let toggle = result?;
        self.loader.load_quietly().await;
        Ok(toggle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowRequestsKind {
    /// Requests other users sent to the viewer.
    Received,
    /// Requests the viewer sent that are still pending.
    Sent,
}

/// The pending follow request pages.
pub struct FollowRequests {
    backend: Backend,
    kind: FollowRequestsKind,
    loader: Loader<Vec<FollowRecord>>,
    is_updating: Cell<bool>,
    _scope: ScopeGuard,
}

impl FollowRequests {
    pub fn new(backend: Backend, kind: FollowRequestsKind) -> Self {
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    let client = &backend.client;
                    match kind {
                        FollowRequestsKind::Received => {
                            backend
                                .call(client.get_pending_follow_requests())
                                .await
                        }
                        FollowRequestsKind::Sent => {
                            backend.call(client.get_sent_follow_requests()).await
                        }
                    }
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            kind,
            loader,
            is_updating: Cell::new(false),
            _scope: scope,
        }
    }

    pub fn kind(&self) -> FollowRequestsKind {
        self.kind
    }

    pub fn loader(&self) -> &Loader<Vec<FollowRecord>> {
        &self.loader
    }

    /// Initial load, once the session is authenticated.
    pub fn activate(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.activate(self.backend.is_ready())
    }

    /// Retry after a failed load, showing skeletons again.
    pub fn retry(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    pub fn requests(&self) -> FetchState<Vec<FollowRecord>> {
        self.loader.data()
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.get()
    }

    pub async fn accept(
        &self,
        request_id: FollowRequestId,
    ) -> Result<(), ClientError> {
        let client = &self.backend.client;
        self.update(
            "Failed to accept request",
            client.accept_follow_request(&request_id),
        )
        .await
    }

    /// Reject a received request.
    pub async fn reject(
        &self,
        request_id: FollowRequestId,
    ) -> Result<(), ClientError> {
        let client = &self.backend.client;
        self.update(
            "Failed to reject request",
            client.delete_follow_request(&request_id),
        )
        .await
    }

    /// Withdraw a sent request.
    pub async fn cancel(
        &self,
        request_id: FollowRequestId,
    ) -> Result<(), ClientError> {
        let client = &self.backend.client;
        self.update(
            "Failed to cancel sent request",
            client.delete_follow_request(&request_id),
        )
        .await
    }

    /// Run a mutation, then reload without skeletons.
    async fn update(
        &self,
        helper: &str,
        request: impl Future<Output = Result<(), ClientError>>,
    ) -> Result<(), ClientError> {
        self.is_updating.set(true);
        let result = self.backend.mutate(helper, request).await;
        self.is_updating.set(false);
        result?;
        self.loader.load_quietly().await;
        Ok(())
    }
}
