//! In-memory state of the mock social API.
//!
//! One viewer at a time is logged in, tracked by a session cookie; the
//! tests log in as alice. Every seeded user has the password `password`:
//! - bob: public, followed by alice, author of the seeded posts
//! - carol: private
//! - dave: public

use std::sync::{Arc, Mutex, MutexGuard};

use jiff::Timestamp;
use payloads::responses::{
    Comment, CommentCounts, CommentReply, FollowRecord, FollowRef, Following,
    LikeRef, Post, PostCounts, Profile, ProfileCounts, ProfileView,
    UserSummary,
};
use payloads::{
    CommentId, FollowRequestId, FollowStatus, PostId, ProfileType, UserId,
};
use reqwest::StatusCode;
use uuid::Uuid;

pub const ALICE_USERNAME: &str = "alice";
pub const ALICE_PASSWORD: &str = "password";

pub struct MockUser {
    pub summary: UserSummary,
    pub profile_type: ProfileType,
    pub password: String,
}

pub struct MockFollow {
    pub id: FollowRequestId,
    pub status: FollowStatus,
    pub by: UserId,
    pub to: UserId,
}

/// A request recorded by the mock, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: String,
}

struct Failure {
    path_prefix: String,
    status: StatusCode,
    error: Option<String>,
}

pub struct MockState {
    pub viewer: UserId,
    /// Value of the viewer's session cookie while logged in.
    pub session: Option<String>,
    pub users: Vec<MockUser>,
    /// Likes hold every liker; responses only show the viewer's own like.
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub replies: Vec<CommentReply>,
    pub follows: Vec<MockFollow>,
    failures: Vec<Failure>,
    hits: Vec<Hit>,
}

#[derive(Clone)]
pub struct MockBackend(Arc<Mutex<MockState>>);

fn new_user(username: &str, first: &str, last: &str) -> UserSummary {
    UserSummary {
        id: UserId(Uuid::new_v4()),
        username: username.into(),
        first_name: first.into(),
        last_name: last.into(),
        profile_picture: None,
        followers: Vec::new(),
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let alice = new_user(ALICE_USERNAME, "Alice", "Liddell");
        let bob = new_user("bob", "Bob", "Builder");
        let carol = new_user("carol", "Carol", "Danvers");
        let dave = new_user("dave", "Dave", "Grohl");
        let follows = vec![MockFollow {
            id: FollowRequestId(Uuid::new_v4()),
            status: FollowStatus::Accepted,
            by: alice.id,
            to: bob.id,
        }];
        let users = vec![
            (alice, ProfileType::Public),
            (bob, ProfileType::Public),
            (carol, ProfileType::Private),
            (dave, ProfileType::Public),
        ]
        .into_iter()
        .map(|(summary, profile_type)| MockUser {
            summary,
            profile_type,
            password: ALICE_PASSWORD.into(),
        })
        .collect::<Vec<_>>();
        let state = MockState {
            viewer: users[0].summary.id,
            session: None,
            users,
            posts: Vec::new(),
            comments: Vec::new(),
            replies: Vec::new(),
            follows,
            failures: Vec::new(),
            hits: Vec::new(),
        };
        Self(Arc::new(Mutex::new(state)))
    }

    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        // a test that panicked while holding the lock already failed
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn user_id(&self, username: &str) -> UserId {
        self.lock()
            .user(username)
            .map(|user| user.summary.id)
            .unwrap_or_else(|| panic!("no mock user {username}"))
    }

    /// Add `count` posts by bob, returned in feed order.
    pub fn seed_posts(&self, count: usize) -> Vec<PostId> {
        let mut state = self.lock();
        let bob = state.user("bob").map(|user| user.summary.id);
        let Some(bob) = bob else { return Vec::new() };
        let first = state.posts.len();
        (0..count)
            .map(|i| {
                let post = Post {
                    id: PostId(Uuid::new_v4()),
                    content: format!("post {}", first + i + 1),
                    user_id: bob,
                    user: None,
                    image: None,
                    count: PostCounts::default(),
                    likes: Vec::new(),
                };
                let id = post.id;
                state.posts.push(post);
                id
            })
            .collect()
    }

    /// Pending and accepted follows around alice:
    /// - carol asked to follow alice (pending, received)
    /// - alice asked to follow carol (pending, sent)
    /// - dave follows alice (accepted)
    pub fn seed_social(&self) {
        let mut state = self.lock();
        let alice = state.viewer;
        let ids = ["carol", "dave"]
            .map(|name| state.user(name).map(|user| user.summary.id));
        let [Some(carol), Some(dave)] = ids else { return };
        for (status, by, to) in [
            (FollowStatus::Pending, carol, alice),
            (FollowStatus::Pending, alice, carol),
            (FollowStatus::Accepted, dave, alice),
        ] {
            state.follows.push(MockFollow {
                id: FollowRequestId(Uuid::new_v4()),
                status,
                by,
                to,
            });
        }
    }

    /// Add a comment by bob on `post_id`.
    pub fn seed_comment(&self, post_id: PostId, content: &str) -> CommentId {
        let mut state = self.lock();
        let bob = state.user("bob").map(|user| user.summary.id);
        let user_id = bob.unwrap_or(state.viewer);
        let now = Timestamp::now();
        let comment = Comment {
            id: CommentId(Uuid::new_v4()),
            content: content.into(),
            user_id,
            user: None,
            post_id,
            created_at: now,
            updated_at: now,
            count: CommentCounts::default(),
        };
        let id = comment.id;
        state.comments.push(comment);
        if let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) {
            post.count.comments += 1;
        }
        id
    }

    /// Make the next request whose path starts with `path_prefix` fail.
    /// Without `error` the response has no body.
    pub fn fail_next(
        &self,
        path_prefix: &str,
        status: StatusCode,
        error: Option<&str>,
    ) {
        self.lock().failures.push(Failure {
            path_prefix: path_prefix.into(),
            status,
            error: error.map(String::from),
        });
    }

    /// Drop the server side session; further requests get 401.
    pub fn expire_session(&self) {
        self.lock().session = None;
    }

    /// Requests made to exactly `path`, oldest first.
    pub fn hits(&self, path: &str) -> Vec<Hit> {
        self.lock()
            .hits
            .iter()
            .filter(|hit| hit.path == path)
            .cloned()
            .collect()
    }

    pub fn total_hits(&self) -> usize {
        self.lock().hits.len()
    }
}

impl MockState {
    pub fn user(&self, username: &str) -> Option<&MockUser> {
        self.users.iter().find(|u| u.summary.username == username)
    }

    pub(crate) fn user_by_id(&self, id: UserId) -> Option<&MockUser> {
        self.users.iter().find(|u| u.summary.id == id)
    }

    pub(crate) fn record(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    /// Take the first injected failure matching `path`.
    pub(crate) fn take_failure(
        &mut self,
        path: &str,
    ) -> Option<(StatusCode, Option<String>)> {
        let index = self
            .failures
            .iter()
            .position(|f| path.starts_with(&f.path_prefix))?;
        let failure = self.failures.remove(index);
        Some((failure.status, failure.error))
    }

    /// A user as the viewer sees them: with the viewer's own follow request
    /// to them, if any.
    pub fn summary(&self, id: UserId) -> Option<UserSummary> {
        let user = self.user_by_id(id)?;
        let mut summary = user.summary.clone();
        summary.followers = self
            .follows
            .iter()
            .filter(|f| f.by == self.viewer && f.to == id)
            .map(|f| FollowRef { id: f.id })
            .collect();
        Some(summary)
    }

    /// The profile page of `id` as the viewer sees it.
    pub fn profile_view(&self, id: UserId) -> Option<ProfileView> {
        let user = self.user_by_id(id)?;
        let accepted = |matches: fn(&MockFollow) -> UserId| {
            self.follows
                .iter()
                .filter(|f| f.status == FollowStatus::Accepted)
                .filter(|f| matches(f) == id)
                .count() as u64
        };
        let count = ProfileCounts {
            followers: accepted(|f| f.to),
            following: accepted(|f| f.by),
            posts: self.posts.iter().filter(|p| p.user_id == id).count()
                as u64,
        };
        let request = self
            .follows
            .iter()
            .find(|f| f.by == self.viewer && f.to == id);
        let is_following = match request.map(|f| f.status) {
            Some(FollowStatus::Accepted) => Following::True,
            Some(FollowStatus::Pending) => Following::Pending,
            None => Following::False,
        };
        let summary = &user.summary;
        Some(ProfileView {
            profile: Profile {
                id,
                username: summary.username.clone(),
                first_name: summary.first_name.clone(),
                last_name: summary.last_name.clone(),
                profile_picture: summary.profile_picture.clone(),
                count,
            },
            is_following,
            follow_request_id: request.map(|f| f.id),
            profile_type: user.profile_type,
        })
    }

    /// Users whose username or name contains `search`, ignoring case.
    pub fn search(&self, search: &str) -> Vec<UserSummary> {
        let search = search.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                let s = &user.summary;
                [&s.username, &s.first_name, &s.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&search))
            })
            .filter_map(|user| self.summary(user.summary.id))
            .collect()
    }

    pub fn profile_type(&self, id: UserId) -> Option<ProfileType> {
        self.user_by_id(id).map(|user| user.profile_type)
    }

    pub fn render_post(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.count.likes = post.likes.len() as u64;
        post.likes.retain(|like| like.id == self.viewer);
        post.user = self.summary(post.user_id);
        post
    }

    pub fn render_comment(&self, comment: &Comment) -> Comment {
        let mut comment = comment.clone();
        comment.count.replies = self
            .replies
            .iter()
            .filter(|r| r.replied_to_comment_id == comment.id)
            .count() as u64;
        comment.user = self.summary(comment.user_id);
        comment
    }

    pub fn render_reply(&self, reply: &CommentReply) -> CommentReply {
        let mut reply = reply.clone();
        reply.user = self.summary(reply.user_id);
        reply
    }

    pub fn render_follow(&self, follow: &MockFollow) -> Option<FollowRecord> {
        Some(FollowRecord {
            id: follow.id,
            status: follow.status,
            request_by: self.summary(follow.by)?,
            request_to: self.summary(follow.to)?,
        })
    }

    /// Posts from users the viewer follows, plus the viewer's own.
    pub fn feed(&self) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| {
                post.user_id == self.viewer
                    || self.follows.iter().any(|f| {
                        f.by == self.viewer
                            && f.to == post.user_id
                            && f.status == FollowStatus::Accepted
                    })
            })
            .map(|post| self.render_post(post))
            .collect()
    }

    pub fn toggle_like(&mut self, post_id: PostId) -> Option<Post> {
        let viewer = self.viewer;
        let post = self.posts.iter_mut().find(|p| p.id == post_id)?;
        if post.likes.iter().any(|like| like.id == viewer) {
            post.likes.retain(|like| like.id != viewer);
        } else {
            post.likes.push(LikeRef { id: viewer });
        }
        let post = post.clone();
        Some(self.render_post(&post))
    }
}
