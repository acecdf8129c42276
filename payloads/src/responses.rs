use crate::{
    CommentId, FollowRequestId, FollowStatus, PostId, ProfileType, UserId,
};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A reference to the viewer's own follow request towards a user. The API
/// embeds at most one of these in `UserSummary::followers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRef {
    pub id: FollowRequestId,
}

/// User identification bundled with display information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub followers: Vec<FollowRef>,
}

impl UserSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The viewer's follow request to this user, if one exists.
    pub fn viewer_follow_request(&self) -> Option<FollowRequestId> {
        self.followers.first().map(|f| f.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRef {
    pub id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostCounts {
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "_count", default)]
    pub count: PostCounts,
    /// Contains the viewer's id when the viewer liked the post.
    #[serde(default)]
    pub likes: Vec<LikeRef>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: UserId) -> bool {
        self.likes.iter().any(|like| like.id == user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentCounts {
    pub replies: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub post_id: PostId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(rename = "_count", default)]
    pub count: CommentCounts,
}

/// A reply to a top-level comment ("sub-comment" on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReply {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub replied_to_comment_id: CommentId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A follow request between two users. Accepted requests are follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRecord {
    pub id: FollowRequestId,
    pub status: FollowStatus,
    pub request_by: UserSummary,
    pub request_to: UserSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileCounts {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(rename = "_count", default)]
    pub count: ProfileCounts,
}

/// Whether the viewer follows a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Following {
    True,
    False,
    /// A request was sent to a private profile and not yet accepted.
    Pending,
}

/// Body of `GET /profile/{id}`: the profile as the viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub profile: Profile,
    pub is_following: Following,
    /// The viewer's request to this profile, accepted or pending.
    #[serde(default)]
    pub follow_request_id: Option<FollowRequestId>,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
