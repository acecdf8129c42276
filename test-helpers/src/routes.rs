//! HTTP surface of the mock, mirroring the social API's routes and body
//! shapes. Errors are `{"error": "..."}` bodies.

use std::sync::MutexGuard;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{
    HttpRequest, HttpResponse, ResponseError, body::BoxBody, delete, get,
    post, put, web,
};
use jiff::Timestamp;
use payloads::requests::{self, PageRequest};
use payloads::responses::{
    Comment, CommentCounts, CommentReply, UserSummary,
};
use payloads::{
    CommentId, FollowRequestId, FollowStatus, PostId, ProfileType, UserId,
};
use serde_json::json;
use uuid::Uuid;

use crate::mock::{Hit, MockBackend, MockFollow, MockState, MockUser};

type Mock = web::Data<MockBackend>;

const SESSION_COOKIE: &str = "session";

/// Paths reachable without a session.
const PUBLIC_PATHS: [&str; 2] = ["/auth/login", "/auth/register"];

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(register)
        .service(logout)
        .service(search_users)
        .service(get_profile)
        .service(feed)
        .service(get_post)
        .service(like_post)
        .service(update_post)
        .service(delete_post)
        .service(user_posts)
        .service(post_comments)
        .service(create_comment)
        .service(update_reply)
        .service(delete_reply)
        .service(comment_replies)
        .service(update_comment)
        .service(delete_comment)
        .service(follow_user)
        .service(accept_follow_request)
        .service(delete_follow_request)
        .service(followers)
        .service(followings)
        .service(pending_follow_requests)
        .service(pending_followings);
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    /// Failure queued by a test through `MockBackend::fail_next`.
    #[error("injected failure")]
    Injected(reqwest::StatusCode, Option<String>),
}

impl ResponseError for MockError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Injected(status, _) => StatusCode::from_u16(status.as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            Self::Injected(_, None) => response.finish(),
            Self::Injected(_, Some(error)) => {
                response.json(json!({ "error": error }))
            }
            _ => response.json(json!({ "error": self.to_string() })),
        }
    }
}

/// Record the request, apply any injected failure and check the session.
fn enter<'a>(
    mock: &'a MockBackend,
    request: &HttpRequest,
) -> Result<MutexGuard<'a, MockState>, MockError> {
    let mut state = mock.lock();
    state.record(Hit {
        method: request.method().to_string(),
        path: request.path().to_string(),
        query: request.query_string().to_string(),
    });
    if let Some((status, error)) = state.take_failure(request.path()) {
        tracing::debug!(path = request.path(), %status, "injected failure");
        return Err(MockError::Injected(status, error));
    }
    if !PUBLIC_PATHS.contains(&request.path()) {
        let cookie = request.cookie(SESSION_COOKIE);
        let valid = match (&state.session, &cookie) {
            (Some(session), Some(cookie)) => cookie.value() == session,
            _ => false,
        };
        if !valid {
            return Err(MockError::Unauthorized);
        }
    }
    Ok(state)
}

fn validate(content: &str) -> Result<String, MockError> {
    match requests::validate_comment(content).error_message() {
        Some(message) => Err(MockError::BadRequest(message.into())),
        None => Ok(content.trim().to_string()),
    }
}

// Auth

#[tracing::instrument(skip(request, mock, credentials))]
#[post("/auth/login")]
async fn login(
    request: HttpRequest,
    mock: Mock,
    credentials: web::Json<requests::LoginCredentials>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let viewer = state
        .user(&credentials.username)
        .filter(|user| user.password == credentials.password)
        .map(|user| user.summary.id)
        .ok_or(MockError::InvalidCredentials)?;
    state.viewer = viewer;
    let user = state.summary(viewer).ok_or(MockError::NotFound("User"))?;
    let session = Uuid::new_v4().to_string();
    state.session = Some(session.clone());
    Ok(HttpResponse::Ok()
        .cookie(Cookie::build(SESSION_COOKIE, session).path("/").finish())
        .json(json!({ "user": user })))
}

#[tracing::instrument(skip(request, mock, details))]
#[post("/auth/register")]
async fn register(
    request: HttpRequest,
    mock: Mock,
    details: web::Json<requests::CreateAccount>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let details = details.into_inner();
    let fields = [
        &details.first_name,
        &details.last_name,
        &details.username,
        &details.password,
    ];
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(MockError::BadRequest("All fields are required".into()));
    }
    if state.user(&details.username).is_some() {
        return Err(MockError::BadRequest("Username already taken".into()));
    }
    state.users.push(MockUser {
        summary: UserSummary {
            id: UserId(Uuid::new_v4()),
            username: details.username,
            first_name: details.first_name,
            last_name: details.last_name,
            profile_picture: None,
            followers: Vec::new(),
        },
        profile_type: ProfileType::Public,
        password: details.password,
    });
    Ok(HttpResponse::Created().json(json!({ "message": "User created" })))
}

#[get("/auth/logout")]
async fn logout(
    request: HttpRequest,
    mock: Mock,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    state.session = None;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}

// Profiles

#[get("/profile/users/all")]
async fn search_users(
    request: HttpRequest,
    mock: Mock,
    query: web::Query<requests::UserSearch>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let users = state.search(&query.search);
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[get("/profile/{user_id}")]
async fn get_profile(
    request: HttpRequest,
    mock: Mock,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let view = state
        .profile_view(UserId(user_id.into_inner()))
        .ok_or(MockError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(view))
}

// Posts

#[tracing::instrument(skip(request, mock))]
#[get("/posts/feed")]
async fn feed(
    request: HttpRequest,
    mock: Mock,
    page: web::Query<PageRequest>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let page = PageRequest::new(page.page, page.limit);
    let posts = state
        .feed()
        .into_iter()
        .skip(page.offset())
        .take(page.limit as usize)
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({ "posts": posts })))
}

#[get("/posts/post/{post_id}")]
async fn get_post(
    request: HttpRequest,
    mock: Mock,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let post_id = PostId(post_id.into_inner());
    let post = state
        .posts
        .iter()
        .find(|p| p.id == post_id)
        .map(|p| state.render_post(p))
        .ok_or(MockError::NotFound("Post"))?;
    Ok(HttpResponse::Ok().json(json!({ "post": post })))
}

#[post("/posts/like/{post_id}")]
async fn like_post(
    request: HttpRequest,
    mock: Mock,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let post = state
        .toggle_like(PostId(post_id.into_inner()))
        .ok_or(MockError::NotFound("Post"))?;
    Ok(HttpResponse::Ok().json(json!({ "post": post })))
}

#[put("/posts/{post_id}")]
async fn update_post(
    request: HttpRequest,
    mock: Mock,
    post_id: web::Path<Uuid>,
    details: web::Json<requests::UpdatePost>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let post_id = PostId(post_id.into_inner());
    let post = state
        .posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or(MockError::NotFound("Post"))?;
    post.content = details.into_inner().content;
    let post = post.clone();
    let post = state.render_post(&post);
    Ok(HttpResponse::Ok().json(json!({ "post": post })))
}

#[delete("/posts/{post_id}")]
async fn delete_post(
    request: HttpRequest,
    mock: Mock,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let post_id = PostId(post_id.into_inner());
    let before = state.posts.len();
    state.posts.retain(|p| p.id != post_id);
    if state.posts.len() == before {
        return Err(MockError::NotFound("Post"));
    }
    state.comments.retain(|c| c.post_id != post_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Post deleted" })))
}

#[get("/posts/user/{user_id}")]
async fn user_posts(
    request: HttpRequest,
    mock: Mock,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let user_id = UserId(user_id.into_inner());
    let posts = state
        .posts
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(|p| state.render_post(p))
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({ "posts": posts })))
}

// Comments

#[get("/comments/post/{post_id}")]
async fn post_comments(
    request: HttpRequest,
    mock: Mock,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let post_id = PostId(post_id.into_inner());
    let comments = state
        .comments
        .iter()
        .filter(|c| c.post_id == post_id)
        .map(|c| state.render_comment(c))
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({ "comments": comments })))
}

#[tracing::instrument(skip(request, mock))]
#[post("/comments")]
async fn create_comment(
    request: HttpRequest,
    mock: Mock,
    details: web::Json<requests::CreateComment>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let details = details.into_inner();
    let content = validate(&details.content)?;
    let now = Timestamp::now();
    let user_id = state.viewer;

    match details.replied_to_comment_id {
        Some(parent) => {
            if !state.comments.iter().any(|c| c.id == parent) {
                return Err(MockError::NotFound("Comment"));
            }
            state.replies.push(CommentReply {
                id: CommentId(Uuid::new_v4()),
                content,
                user_id,
                user: None,
                replied_to_comment_id: parent,
                created_at: now,
                updated_at: now,
            });
        }
        None => {
            let post = state
                .posts
                .iter_mut()
                .find(|p| p.id == details.post_id)
                .ok_or(MockError::NotFound("Post"))?;
            post.count.comments += 1;
            state.comments.push(Comment {
                id: CommentId(Uuid::new_v4()),
                content,
                user_id,
                user: None,
                post_id: details.post_id,
                created_at: now,
                updated_at: now,
                count: CommentCounts::default(),
            });
        }
    }
    Ok(HttpResponse::Created().json(json!({ "message": "Comment created" })))
}

#[put("/comments/{comment_id}")]
async fn update_comment(
    request: HttpRequest,
    mock: Mock,
    comment_id: web::Path<Uuid>,
    details: web::Json<requests::UpdateComment>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let content = validate(&details.content)?;
    let comment_id = CommentId(comment_id.into_inner());
    let comment = state
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(MockError::NotFound("Comment"))?;
    comment.content = content;
    comment.updated_at = Timestamp::now();
    let comment = comment.clone();
    let comment = state.render_comment(&comment);
    Ok(HttpResponse::Ok().json(json!({ "comment": comment })))
}

#[delete("/comments/{comment_id}")]
async fn delete_comment(
    request: HttpRequest,
    mock: Mock,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let comment_id = CommentId(comment_id.into_inner());
    let index = state
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or(MockError::NotFound("Comment"))?;
    let comment = state.comments.remove(index);
    state.replies.retain(|r| r.replied_to_comment_id != comment_id);
    if let Some(post) = state.posts.iter_mut().find(|p| p.id == comment.post_id)
    {
        post.count.comments = post.count.comments.saturating_sub(1);
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment deleted" })))
}

#[get("/comments/comment/{comment_id}")]
async fn comment_replies(
    request: HttpRequest,
    mock: Mock,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let comment_id = CommentId(comment_id.into_inner());
    let replies = state
        .replies
        .iter()
        .filter(|r| r.replied_to_comment_id == comment_id)
        .map(|r| state.render_reply(r))
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(json!({ "subComments": replies })))
}

#[put("/comments/sub/{reply_id}")]
async fn update_reply(
    request: HttpRequest,
    mock: Mock,
    reply_id: web::Path<Uuid>,
    details: web::Json<requests::UpdateComment>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let content = validate(&details.content)?;
    let reply_id = CommentId(reply_id.into_inner());
    let reply = state
        .replies
        .iter_mut()
        .find(|r| r.id == reply_id)
        .ok_or(MockError::NotFound("Comment"))?;
    reply.content = content;
    reply.updated_at = Timestamp::now();
    let reply = reply.clone();
    let reply = state.render_reply(&reply);
    Ok(HttpResponse::Ok().json(json!({ "comment": reply })))
}

#[delete("/comments/sub/{reply_id}")]
async fn delete_reply(
    request: HttpRequest,
    mock: Mock,
    reply_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let reply_id = CommentId(reply_id.into_inner());
    let before = state.replies.len();
    state.replies.retain(|r| r.id != reply_id);
    if state.replies.len() == before {
        return Err(MockError::NotFound("Comment"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment deleted" })))
}

// Follow requests

#[tracing::instrument(skip(request, mock))]
#[post("/follow/new/{user_id}")]
async fn follow_user(
    request: HttpRequest,
    mock: Mock,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let to = UserId(user_id.into_inner());
    let by = state.viewer;
    if to == by {
        return Err(MockError::BadRequest("You can not follow yourself".into()));
    }
    let profile_type =
        state.profile_type(to).ok_or(MockError::NotFound("User"))?;
    if state.follows.iter().any(|f| f.by == by && f.to == to) {
        return Err(MockError::BadRequest("Follow request already sent".into()));
    }
    let status = match profile_type {
        ProfileType::Public => FollowStatus::Accepted,
        ProfileType::Private => FollowStatus::Pending,
    };
    state.follows.push(MockFollow {
        id: FollowRequestId(Uuid::new_v4()),
        status,
        by,
        to,
    });
    Ok(HttpResponse::Created().json(json!({ "message": "Follow request sent" })))
}

#[put("/follow/request/{request_id}/accept")]
async fn accept_follow_request(
    request: HttpRequest,
    mock: Mock,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let request_id = FollowRequestId(request_id.into_inner());
    let viewer = state.viewer;
    let follow = state
        .follows
        .iter_mut()
        .find(|f| {
            f.id == request_id
                && f.to == viewer
                && f.status == FollowStatus::Pending
        })
        .ok_or(MockError::NotFound("Follow request"))?;
    follow.status = FollowStatus::Accepted;
    Ok(HttpResponse::Ok().json(json!({ "message": "Follow request accepted" })))
}

#[delete("/follow/{request_id}")]
async fn delete_follow_request(
    request: HttpRequest,
    mock: Mock,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let mut state = enter(&mock, &request)?;
    let request_id = FollowRequestId(request_id.into_inner());
    let viewer = state.viewer;
    let before = state.follows.len();
    state
        .follows
        .retain(|f| !(f.id == request_id && (f.by == viewer || f.to == viewer)));
    if state.follows.len() == before {
        return Err(MockError::NotFound("Follow request"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Follow request deleted" })))
}

fn follow_records(
    state: &MockState,
    filter: impl Fn(&MockFollow) -> bool,
) -> Vec<payloads::responses::FollowRecord> {
    state
        .follows
        .iter()
        .filter(|f| filter(f))
        .filter_map(|f| state.render_follow(f))
        .collect()
}

#[get("/follow/followers/{user_id}")]
async fn followers(
    request: HttpRequest,
    mock: Mock,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let user_id = UserId(user_id.into_inner());
    let records = follow_records(&state, |f| {
        f.to == user_id && f.status == FollowStatus::Accepted
    });
    Ok(HttpResponse::Ok().json(json!({ "followers": records })))
}

#[get("/follow/followings/{user_id}")]
async fn followings(
    request: HttpRequest,
    mock: Mock,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let user_id = UserId(user_id.into_inner());
    let records = follow_records(&state, |f| {
        f.by == user_id && f.status == FollowStatus::Accepted
    });
    Ok(HttpResponse::Ok().json(json!({ "followings": records })))
}

#[get("/follow/pending/followRequests")]
async fn pending_follow_requests(
    request: HttpRequest,
    mock: Mock,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let viewer = state.viewer;
    let records = follow_records(&state, |f| {
        f.to == viewer && f.status == FollowStatus::Pending
    });
    Ok(HttpResponse::Ok().json(json!({ "pendingFollowRequests": records })))
}

#[get("/follow/pending/followingRequests")]
async fn pending_followings(
    request: HttpRequest,
    mock: Mock,
) -> Result<HttpResponse, MockError> {
    let state = enter(&mock, &request)?;
    let viewer = state.viewer;
    let records = follow_records(&state, |f| {
        f.by == viewer && f.status == FollowStatus::Pending
    });
    Ok(HttpResponse::Ok().json(json!({ "pendingFollowings": records })))
}
