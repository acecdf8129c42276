use crate::{
    CommentId, FollowRequestId, PostId, UserId, requests, responses,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Message shown when a failed response carries no `{error}` body.
pub const FALLBACK_ERROR_MESSAGE: &str = "Internal Server Error";

/// An API client for interfacing with the backend.
///
/// Every request carries credentials (the session cookie), so one client
/// must be shared by everything acting on behalf of the logged in user.
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    fn format_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn with_credentials(
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        request
    }

    async fn get(&self, path: &str) -> ReqwestResult {
        let request = self.inner_client.get(self.format_url(path));
        Self::with_credentials(request).send().await
    }

    async fn get_query(
        &self,
        path: &str,
        query: &impl Serialize,
    ) -> ReqwestResult {
        let request = self.inner_client.get(self.format_url(path)).query(query);
        Self::with_credentials(request).send().await
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        let request = self.inner_client.post(self.format_url(path)).json(body);
        Self::with_credentials(request).send().await
    }

    async fn empty_post(&self, path: &str) -> ReqwestResult {
        let request = self.inner_client.post(self.format_url(path));
        Self::with_credentials(request).send().await
    }

    async fn put(&self, path: &str, body: &impl Serialize) -> ReqwestResult {
        let request = self.inner_client.put(self.format_url(path)).json(body);
        Self::with_credentials(request).send().await
    }

    async fn empty_put(&self, path: &str) -> ReqwestResult {
        let request = self.inner_client.put(self.format_url(path));
        Self::with_credentials(request).send().await
    }

    async fn delete(&self, path: &str) -> ReqwestResult {
        let request = self.inner_client.delete(self.format_url(path));
        Self::with_credentials(request).send().await
    }
}

/// Generic listing methods
impl APIClient {
    /// Fetch one page of a paginated listing: `GET {endpoint}?limit=&page=`,
    /// returning the array stored under `data_key` in the response body.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data_key: &str,
        page: &requests::PageRequest,
    ) -> Result<Vec<T>, ClientError> {
        let response = self.get_query(endpoint, page).await?;
        ok_field(response, data_key).await
    }

    /// Fetch an unpaginated listing stored under `data_key`.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        data_key: &str,
    ) -> Result<Vec<T>, ClientError> {
        let response = self.get(endpoint).await?;
        ok_field(response, data_key).await
    }
}

/// Methods on the backend API
impl APIClient {
    pub async fn login(
        &self,
        details: &requests::LoginCredentials,
    ) -> Result<responses::UserSummary, ClientError> {
        let response = self.post("auth/login", details).await?;
        ok_field(response, "user").await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.get("auth/logout").await?;
        ok_empty(response).await
    }

    /// Create an account. The new user still has to log in.
    pub async fn create_account(
        &self,
        details: &requests::CreateAccount,
    ) -> Result<(), ClientError> {
        let response = self.post("auth/register", details).await?;
        ok_empty(response).await
    }

    // Profiles

    pub async fn get_profile(
        &self,
        user_id: &UserId,
    ) -> Result<responses::ProfileView, ClientError> {
        let response = self.get(&format!("profile/{user_id}")).await?;
        ok_body(response).await
    }

    pub async fn search_users(
        &self,
        search: &str,
    ) -> Result<Vec<responses::UserSummary>, ClientError> {
        let query = requests::UserSearch {
            search: search.to_string(),
        };
        let response = self.get_query("profile/users/all", &query).await?;
        ok_field(response, "users").await
    }

    // Posts

    pub async fn get_post(
        &self,
        post_id: &PostId,
    ) -> Result<responses::Post, ClientError> {
        let response = self.get(&format!("posts/post/{post_id}")).await?;
        ok_field(response, "post").await
    }

    /// Like the post, or remove the like if the viewer already liked it.
    /// Returns the updated post.
    pub async fn like_post(
        &self,
        post_id: &PostId,
    ) -> Result<responses::Post, ClientError> {
        let response = self.empty_post(&format!("posts/like/{post_id}")).await?;
        ok_field(response, "post").await
    }

    pub async fn update_post(
        &self,
        post_id: &PostId,
        details: &requests::UpdatePost,
    ) -> Result<responses::Post, ClientError> {
        let response = self.put(&format!("posts/{post_id}"), details).await?;
        ok_field(response, "post").await
    }

    pub async fn delete_post(&self, post_id: &PostId) -> Result<(), ClientError> {
        let response = self.delete(&format!("posts/{post_id}")).await?;
        ok_empty(response).await
    }

    pub async fn get_user_posts(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<responses::Post>, ClientError> {
        self.get_list(&format!("posts/user/{user_id}"), "posts").await
    }

    // Comments

    pub async fn get_comments(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<responses::Comment>, ClientError> {
        self.get_list(&format!("comments/post/{post_id}"), "comments")
            .await
    }

    /// Create a comment, or a reply when `replied_to_comment_id` is set.
    pub async fn create_comment(
        &self,
        details: &requests::CreateComment,
    ) -> Result<(), ClientError> {
        let response = self.post("comments", details).await?;
        ok_empty(response).await
    }

    pub async fn update_comment(
        &self,
        comment_id: &CommentId,
        details: &requests::UpdateComment,
    ) -> Result<responses::Comment, ClientError> {
        let response =
            self.put(&format!("comments/{comment_id}"), details).await?;
        ok_field(response, "comment").await
    }

    pub async fn delete_comment(
        &self,
        comment_id: &CommentId,
    ) -> Result<(), ClientError> {
        let response = self.delete(&format!("comments/{comment_id}")).await?;
        ok_empty(response).await
    }

    pub async fn get_replies(
        &self,
        comment_id: &CommentId,
    ) -> Result<Vec<responses::CommentReply>, ClientError> {
        self.get_list(&format!("comments/comment/{comment_id}"), "subComments")
            .await
    }

    pub async fn update_reply(
        &self,
        reply_id: &CommentId,
        details: &requests::UpdateComment,
    ) -> Result<responses::CommentReply, ClientError> {
        let response =
            self.put(&format!("comments/sub/{reply_id}"), details).await?;
        ok_field(response, "comment").await
    }

    pub async fn delete_reply(
        &self,
        reply_id: &CommentId,
    ) -> Result<(), ClientError> {
        let response = self.delete(&format!("comments/sub/{reply_id}")).await?;
        ok_empty(response).await
    }

    // Follow requests

    /// Follow a public user directly, or send a follow request to a private
    /// one.
    pub async fn follow_user(&self, user_id: &UserId) -> Result<(), ClientError> {
        let response = self.empty_post(&format!("follow/new/{user_id}")).await?;
        ok_empty(response).await
    }

    /// Delete a follow request. Depending on who asks and the request state
    /// this cancels a sent request, rejects a received one, or unfollows.
    pub async fn delete_follow_request(
        &self,
        request_id: &FollowRequestId,
    ) -> Result<(), ClientError> {
        let response = self.delete(&format!("follow/{request_id}")).await?;
        ok_empty(response).await
    }

    pub async fn accept_follow_request(
        &self,
        request_id: &FollowRequestId,
    ) -> Result<(), ClientError> {
        let response = self
            .empty_put(&format!("follow/request/{request_id}/accept"))
            .await?;
        ok_empty(response).await
    }

    pub async fn get_followers(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<responses::FollowRecord>, ClientError> {
        self.get_list(&format!("follow/followers/{user_id}"), "followers")
            .await
    }

    pub async fn get_followings(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<responses::FollowRecord>, ClientError> {
        self.get_list(&format!("follow/followings/{user_id}"), "followings")
            .await
    }

    /// Follow requests other users sent to the viewer.
    pub async fn get_pending_follow_requests(
        &self,
    ) -> Result<Vec<responses::FollowRecord>, ClientError> {
        self.get_list("follow/pending/followRequests", "pendingFollowRequests")
            .await
    }

    /// Follow requests the viewer sent that are still pending.
    pub async fn get_sent_follow_requests(
        &self,
    ) -> Result<Vec<responses::FollowRecord>, ClientError> {
        self.get_list("follow/pending/followingRequests", "pendingFollowings")
            .await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing the `error` field of
    /// the response body or a generic fallback.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    /// The response was successful but did not contain the expected field.
    #[error("Unexpected response from server (missing `{0}`)")]
    MissingData(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::APIError(status, _) => Some(*status),
            _ => None,
        }
    }

    /// The message kept in view state for a failed load: the body's `error`
    /// field, or the generic fallback when the server gave none (transport
    /// failures included).
    pub fn display_message(&self) -> String {
        match self {
            Self::APIError(_, message) => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the session is gone and the user has to log in again.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }
}

/// Build the error for a non-2xx response, preferring the body's `error`
/// field.
async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = match response.text().await {
        Ok(text) => error_message_from_body(&text),
        Err(_) => FALLBACK_ERROR_MESSAGE.to_string(),
    };
    ClientError::APIError(status, message)
}

/// Extract the display message from an error response body.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<responses::ErrorBody>(body)
        .ok()
        .map(|body| body.error)
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Deserialize a whole successful response body.
pub async fn ok_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|_| ClientError::MissingData("body".to_string()))
}

/// Deserialize the field `key` of a successful response body, or return an
/// appropriate error.
pub async fn ok_field<T: DeserializeOwned>(
    response: reqwest::Response,
    key: &str,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let bytes = response.bytes().await?;
    let mut body = serde_json::from_slice::<serde_json::Value>(&bytes)
        .map_err(|_| ClientError::MissingData(key.to_string()))?;
    let field = body
        .get_mut(key)
        .map(serde_json::Value::take)
        .ok_or_else(|| ClientError::MissingData(key.to_string()))?;
    serde_json::from_value(field)
        .map_err(|_| ClientError::MissingData(key.to_string()))
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(())
}
