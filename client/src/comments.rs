use std::cell::Cell;
use std::future::Future;

use payloads::requests::{self, CreateComment, UpdateComment};
use payloads::responses::{Comment, CommentReply};
use payloads::{ClientError, CommentId, PostId};

use crate::Backend;
use crate::loader::{FetchState, LoadOutcome, Loader};
use crate::scope::ScopeGuard;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Rejected before reaching the server.
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Client(#[from] ClientError),
}

fn validated(content: &str) -> Result<String, SubmitError> {
    let validation = requests::validate_comment(content);
    match validation.error_message() {
        Some(message) => Err(SubmitError::Invalid(message)),
        None => Ok(content.trim().to_string()),
    }
}

/// Top-level comments of one post.
pub struct CommentsSection {
    backend: Backend,
    post_id: Option<PostId>,
    loader: Loader<Vec<Comment>>,
    is_deleting: Cell<bool>,
    _scope: ScopeGuard,
}

impl CommentsSection {
    /// `post_id` is `None` while the route has not resolved a post; nothing
    /// is fetched until it has one.
    pub fn new(backend: Backend, post_id: Option<PostId>) -> Self {
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    match post_id {
                        Some(post_id) => {
                            backend
                                .call(backend.client.get_comments(&post_id))
                                .await
                        }
                        None => Ok(Vec::new()),
                    }
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            post_id,
            loader,
            is_deleting: Cell::new(false),
            _scope: scope,
        }
    }

    pub fn loader(&self) -> &Loader<Vec<Comment>> {
        &self.loader
    }

    pub fn activate(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.activate(self.post_id.is_some())
    }

    /// Refetch, also the retry action of the error view.
    pub fn refresh(&self) -> impl Future<Output = LoadOutcome> + use<> {
        self.loader.load()
    }

    pub fn comments(&self) -> FetchState<Vec<Comment>> {
        self.loader.data()
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting.get()
    }

    pub async fn create(&self, content: &str) -> Result<(), SubmitError> {
        let content = validated(content)?;
        let Some(post_id) = self.post_id else {
            return Err(SubmitError::Invalid("No post to comment on"));
        };
        let details = CreateComment {
            content,
            post_id,
            replied_to_comment_id: None,
        };
        self.backend
            .mutate(
                "Failed to create comment",
                self.backend.client.create_comment(&details),
            )
            .await?;
        self.loader.load().await;
        Ok(())
    }

    /// Edit a comment, swapping in the server's copy without a refetch.
    pub async fn edit(
        &self,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, SubmitError> {
        let details = UpdateComment {
            content: validated(content)?,
        };
        let comment = self
            .backend
            .mutate(
                "Failed to edit comment",
                self.backend.client.update_comment(&comment_id, &details),
            )
            .await?;
        self.loader.update(|comments| {
            for existing in comments.iter_mut().filter(|c| c.id == comment.id) {
                *existing = comment.clone();
            }
        });
        Ok(comment)
    }

    pub async fn delete(&self, comment_id: CommentId) -> Result<(), ClientError> {
        self.is_deleting.set(true);
        let result = self
            .backend
            .mutate(
                "Failed to delete comment",
                self.backend.client.delete_comment(&comment_id),
            )
            .await;
        self.is_deleting.set(false);
        result?;
        self.loader.load().await;
        Ok(())
    }
}

/// Replies under one comment: hidden until expanded, loaded on expansion.
pub struct ReplyThread {
    backend: Backend,
    comment_id: CommentId,
    post_id: PostId,
    loader: Loader<Vec<CommentReply>>,
    replies_count: Cell<u64>,
    visible: Cell<bool>,
    reply_input_visible: Cell<bool>,
    _scope: ScopeGuard,
}

impl ReplyThread {
    pub fn new(backend: Backend, comment: &Comment) -> Self {
        let comment_id = comment.id;
        let loader = Loader::new({
            let backend = backend.clone();
            move || {
                let backend = backend.clone();
                async move {
                    backend.call(backend.client.get_replies(&comment_id)).await
                }
            }
        });
        let scope = loader.scope();
        Self {
            backend,
            comment_id,
            post_id: comment.post_id,
            loader,
            replies_count: Cell::new(comment.count.replies),
            visible: Cell::new(false),
            reply_input_visible: Cell::new(false),
            _scope: scope,
        }
    }

    pub fn loader(&self) -> &Loader<Vec<CommentReply>> {
        &self.loader
    }

    pub fn replies(&self) -> FetchState<Vec<CommentReply>> {
        self.loader.data()
    }

    pub fn replies_count(&self) -> u64 {
        self.replies_count.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn is_reply_input_visible(&self) -> bool {
        self.reply_input_visible.get()
    }

    pub fn show_reply_input(&self) {
        self.reply_input_visible.set(true);
    }

    pub fn cancel_replying(&self) {
        self.reply_input_visible.set(false);
    }

    /// Show or hide the replies, loading them whenever they are shown.
    pub async fn toggle_visibility(&self) -> Option<LoadOutcome> {
        let show = !self.visible.get();
        self.visible.set(show);
        if show {
            Some(self.loader.load().await)
        } else {
            None
        }
    }

    pub async fn reply(&self, content: &str) -> Result<(), SubmitError> {
        let details = CreateComment {
            content: validated(content)?,
            post_id: self.post_id,
            replied_to_comment_id: Some(self.comment_id),
        };
        self.backend
            .mutate(
                "Failed to create reply",
                self.backend.client.create_comment(&details),
            )
            .await?;
        self.replies_count.set(self.replies_count.get() + 1);
        self.reply_input_visible.set(false);
        self.visible.set(true);
        self.loader.load().await;
        Ok(())
    }

    pub async fn edit(
        &self,
        reply_id: CommentId,
        content: &str,
    ) -> Result<CommentReply, SubmitError> {
        let details = UpdateComment {
            content: validated(content)?,
        };
        let reply = self
            .backend
            .mutate(
                "Failed to edit reply",
                self.backend.client.update_reply(&reply_id, &details),
            )
            .await?;
        self.loader.update(|replies| {
            for existing in replies.iter_mut().filter(|r| r.id == reply.id) {
                *existing = reply.clone();
            }
        });
        Ok(reply)
    }

    pub async fn delete(&self, reply_id: CommentId) -> Result<(), ClientError> {
        self.backend
            .mutate(
                "Failed to delete reply",
                self.backend.client.delete_reply(&reply_id),
            )
            .await?;
        self.replies_count
            .set(self.replies_count.get().saturating_sub(1));
        self.loader.load().await;
        Ok(())
    }
}
