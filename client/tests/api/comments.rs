use client::{
    CommentsSection, LoadOutcome, Notification, ProfilePosts, ReplyThread,
    SubmitError,
};
use payloads::responses::Comment;
use reqwest::StatusCode;
use test_helpers::spawn_app;

use crate::alice_backend;

fn comment_contents(section: &CommentsSection) -> Vec<String> {
    section
        .comments()
        .as_ref()
        .map(|comments| comments.iter().map(|c| c.content.clone()).collect())
        .unwrap_or_default()
}

fn first_comment(section: &CommentsSection) -> Comment {
    section.comments().as_ref().unwrap()[0].clone()
}

#[tokio::test]
async fn comments_wait_for_post() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend, None);

    assert_eq!(section.activate().await, LoadOutcome::Skipped);
    assert!(!section.comments().is_fetched());
    assert_eq!(app.backend.total_hits(), 1); // the login

    let result = section.create("hello").await;
    assert!(matches!(result, Err(SubmitError::Invalid(_))));

    Ok(())
}

#[tokio::test]
async fn create_edit_delete_comment() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let post_id = app.backend.seed_posts(1)[0];
    app.backend.seed_comment(post_id, "first!");
    let (backend, notifier) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend, Some(post_id));

    assert_eq!(section.activate().await, LoadOutcome::Loaded);
    assert_eq!(comment_contents(&section), ["first!"]);

    section.create("  nice post  ").await?;
    assert_eq!(comment_contents(&section), ["first!", "nice post"]);

    let comment = first_comment(&section);
    let hits_before = app.backend.hits(&format!("/comments/post/{post_id}"));
    let edited = section.edit(comment.id, "first, edited").await?;
    assert_eq!(edited.content, "first, edited");
    assert_eq!(comment_contents(&section), ["first, edited", "nice post"]);
    // edits patch in place
    let hits_after = app.backend.hits(&format!("/comments/post/{post_id}"));
    assert_eq!(hits_before.len(), hits_after.len());

    section.delete(comment.id).await?;
    assert!(!section.is_deleting());
    assert_eq!(comment_contents(&section), ["nice post"]);
    assert!(notifier.notifications().is_empty());

    Ok(())
}

#[tokio::test]
async fn invalid_comments_never_reach_server() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let post_id = app.backend.seed_posts(1)[0];
    let (backend, _) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend, Some(post_id));
    section.activate().await;
    let before = app.backend.total_hits();

    for content in [String::new(), "   ".into(), "x".repeat(201)] {
        match section.create(&content).await {
            Err(SubmitError::Invalid(message)) => assert_eq!(
                message,
                "Comment must be between 1 and 200 characters."
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert_eq!(app.backend.total_hits(), before);

    // exactly 200 characters is fine
    section.create(&"x".repeat(200)).await?;

    Ok(())
}

#[tokio::test]
async fn failed_delete_is_notified_and_keeps_comment() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let post_id = app.backend.seed_posts(1)[0];
    let comment_id = app.backend.seed_comment(post_id, "keep me");
    let (backend, notifier) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend, Some(post_id));
    section.activate().await;

    app.backend.fail_next(
        "/comments/",
        StatusCode::INTERNAL_SERVER_ERROR,
        None,
    );
    assert!(section.delete(comment_id).await.is_err());

    assert!(!section.is_deleting());
    assert_eq!(comment_contents(&section), ["keep me"]);
    // no body, so the server gave no message of its own
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("Internal Server Error".into())]
    );

    Ok(())
}

#[tokio::test]
async fn reply_thread_lifecycle() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let post_id = app.backend.seed_posts(1)[0];
    app.backend.seed_comment(post_id, "parent");
    let (backend, _) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend.clone(), Some(post_id));
    section.activate().await;
    let thread = ReplyThread::new(backend, &first_comment(&section));

    assert_eq!(thread.replies_count(), 0);
    assert!(!thread.is_visible());
    assert!(!thread.replies().is_fetched());

    // expanding loads the replies, collapsing does not
    assert_eq!(thread.toggle_visibility().await, Some(LoadOutcome::Loaded));
    assert!(thread.is_visible());
    assert_eq!(thread.replies().as_ref().map(Vec::len), Some(0));
    assert_eq!(thread.toggle_visibility().await, None);
    assert!(!thread.is_visible());

    thread.show_reply_input();
    assert!(thread.is_reply_input_visible());
    thread.reply("a reply").await?;
    assert!(!thread.is_reply_input_visible());
    assert!(thread.is_visible());
    assert_eq!(thread.replies_count(), 1);
    let reply = thread.replies().as_ref().unwrap()[0].clone();
    assert_eq!(reply.content, "a reply");

    let edited = thread.edit(reply.id, "an edited reply").await?;
    assert_eq!(edited.content, "an edited reply");
    assert_eq!(
        thread.replies().as_ref().unwrap()[0].content,
        "an edited reply"
    );

    thread.delete(reply.id).await?;
    assert_eq!(thread.replies_count(), 0);
    assert_eq!(thread.replies().as_ref().map(Vec::len), Some(0));

    // the server's count agrees after a refresh
    section.refresh().await;
    assert_eq!(first_comment(&section).count.replies, 0);

    Ok(())
}

#[tokio::test]
async fn cancelled_reply_input_hides() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let post_id = app.backend.seed_posts(1)[0];
    app.backend.seed_comment(post_id, "parent");
    let (backend, _) = alice_backend(&app).await?;
    let section = CommentsSection::new(backend.clone(), Some(post_id));
    section.activate().await;
    let thread = ReplyThread::new(backend, &first_comment(&section));

    thread.show_reply_input();
    thread.cancel_replying();
    assert!(!thread.is_reply_input_visible());

    let result = thread.reply("").await;
    assert!(matches!(result, Err(SubmitError::Invalid(_))));
    assert_eq!(thread.replies_count(), 0);

    Ok(())
}

#[tokio::test]
async fn profile_posts_load_for_user() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(3);
    let (backend, _) = alice_backend(&app).await?;
    let bob = app.backend.user_id("bob");
    let profile = ProfilePosts::new(backend.clone(), bob);

    assert_eq!(profile.activate().await, LoadOutcome::Loaded);
    assert!(!profile.is_loading());
    let posts = profile.posts();
    let posts = posts.as_ref().unwrap();
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p.user_id == bob));
    assert_eq!(
        posts[0].user.as_ref().map(|u| u.username.as_str()),
        Some("bob")
    );

    let alice = app.backend.user_id("alice");
    let own = ProfilePosts::new(backend, alice);
    own.activate().await;
    assert_eq!(own.posts().as_ref().map(Vec::len), Some(0));
    assert_eq!(own.error(), None);

    Ok(())
}
