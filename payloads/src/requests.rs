use crate::{CommentId, PostId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const COMMENT_MIN_LEN: usize = 1;
pub const COMMENT_MAX_LEN: usize = 200;

/// One page of a paginated listing, sent as `?limit=..&page=..`.
///
/// Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    pub page: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Index of the first item of this page in the full listing.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// Query of the people search, matched against usernames and names. An
/// empty search lists everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub search: String,
}

/// Body for `POST /comments`. A comment with `replied_to_comment_id` is a
/// reply (sub-comment) to that comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub post_id: PostId,
    pub replied_to_comment_id: Option<CommentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePost {
    pub content: String,
}

/// Validation result for comment and reply bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidation {
    Valid,
    Empty,
    TooLong,
}

impl CommentValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Empty | Self::TooLong => {
                Some("Comment must be between 1 and 200 characters.")
            }
        }
    }
}

/// Validate a comment body. Surrounding whitespace does not count.
pub fn validate_comment(content: &str) -> CommentValidation {
    let len = content.trim().chars().count();
    if len < COMMENT_MIN_LEN {
        return CommentValidation::Empty;
    }
    if len > COMMENT_MAX_LEN {
        return CommentValidation::TooLong;
    }
    CommentValidation::Valid
}
