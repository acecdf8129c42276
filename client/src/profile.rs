use std::cell::Cell;
use std::future::Future;

use payloads::responses::{Following, Post, ProfileView};
use payloads::{ClientError, ProfileType, UserId};

use crate::Backend;
use crate::follow::FollowToggle;
use crate::loader::{FetchState, LoadOutcome, Loader};
use crate::scope::ScopeGuard;

/// A user's profile page: counts, follow state and whether their posts may
/// be shown to the viewer.
pub struct UserProfile {
    backend: Backend,
    user_id: UserId,
    loader: Loader<ProfileView>,
    sending_request: Cell<bool>,
    _scope: ScopeGuard,
}

impl UserProfile {
    pub fn new(backend: Backend, user_id: UserId) -> Self {
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    backend.call(backend.client.get_profile(&user_id)).await
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            user_id,
            loader,
            sending_request: Cell::new(false),
            _scope: scope,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn loader(&self) -> &Loader<ProfileView> {
        &self.loader
    }

    pub fn activate(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.activate(self.backend.is_ready())
    }

    pub fn retry(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    pub fn view(&self) -> FetchState<ProfileView> {
        self.loader.data()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.loader.error()
    }

    pub fn is_sending_request(&self) -> bool {
        self.sending_request.get()
    }

    pub fn is_my_profile(&self) -> bool {
        self.backend.session.user_id() == Some(self.user_id)
    }

    /// Posts and follow lists are shown to the owner, to followers, and to
    /// everyone when the profile is public. `None` until loaded.
    pub fn posts_visible(&self) -> Option<bool> {
        let is_mine = self.is_my_profile();
        self.loader.with_data(|view| {
            view.map(|view| {
                is_mine
                    || view.profile_type == ProfileType::Public
                    || view.is_following == Following::True
            })
        })
    }

    /// Text of the follow button; the owner gets none.
    pub fn follow_label(&self) -> Option<&'static str> {
        if self.is_my_profile() {
            return None;
        }
        self.loader.with_data(|view| {
            view.map(|view| match view.is_following {
                Following::True => "Unfollow",
                Following::False => "Follow",
                Following::Pending => "Request Sent",
            })
        })
    }

    /// Follow the user, or unfollow (cancel a pending request) when the
    /// viewer already asked to follow them. Reloads the profile after.
    pub async fn toggle_follow(&self) -> Result<FollowToggle, ClientError> {
        if self.is_my_profile() || self.sending_request.get() {
            return Ok(FollowToggle::Unchanged);
        }
        let existing = self.loader.with_data(|view| {
            view.map(|view| match view.is_following {
                Following::False => None,
                Following::True | Following::Pending => {
                    view.follow_request_id
                }
            })
        });
        let Some(existing) = existing else {
            return Ok(FollowToggle::Unchanged);
        };

        self.sending_request.set(true);
        let client = &self.backend.client;
        let result = match existing {
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
                .mutate(
                    "Failed to follow user",
                    client.follow_user(&self.user_id),
                )
                .await
                .map(|_| FollowToggle::Followed),
        };
        self.sending_request.set(false);

        let toggle = result?;
        self.loader.load().await;
        Ok(toggle)
    }
}

/// All posts of one user, shown on their profile.
pub struct ProfilePosts {
    backend: Backend,
    user_id: UserId,
    loader: Loader<Vec<Post>>,
    _scope: ScopeGuard,
}

impl ProfilePosts {
    pub fn new(backend: Backend, user_id: UserId) -> Self {
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    backend.call(backend.client.get_user_posts(&user_id)).await
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            user_id,
            loader,
            _scope: scope,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn activate(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.activate(self.backend.is_ready())
    }

    pub fn refresh(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    pub fn posts(&self) -> FetchState<Vec<Post>> {
        self.loader.data()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.loader.error()
    }
}
