use client::{FollowToggle, LoadOutcome, Notification, UserProfile};
use payloads::responses::{Following, ProfileCounts};
use payloads::{ProfileType, UserId};
use reqwest::StatusCode;
use test_helpers::spawn_app;

use crate::alice_backend;

#[tokio::test]
async fn followed_public_profile_shows_posts() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_posts(3);
    let (backend, _) = alice_backend(&app).await?;
    let profile = UserProfile::new(backend, app.backend.user_id("bob"));

    assert_eq!(profile.posts_visible(), None);
    assert_eq!(profile.activate().await, LoadOutcome::Loaded);

    let view = profile.view().as_ref().cloned().unwrap();
    assert_eq!(view.profile.username, "bob");
    assert_eq!(
        view.profile.count,
        ProfileCounts {
            followers: 1,
            following: 0,
            posts: 3,
        }
    );
    assert_eq!(view.is_following, Following::True);
    assert!(view.follow_request_id.is_some());
    assert!(!profile.is_my_profile());
    assert_eq!(profile.posts_visible(), Some(true));
    assert_eq!(profile.follow_label(), Some("Unfollow"));

    Ok(())
}

#[tokio::test]
async fn private_profile_hides_posts_until_accepted() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;
    let carol = app.backend.user_id("carol");
    let profile = UserProfile::new(backend, carol);

    profile.activate().await;
    let view = profile.view().as_ref().cloned().unwrap();
    assert_eq!(view.profile_type, ProfileType::Private);
    assert_eq!(view.is_following, Following::False);
    assert_eq!(profile.posts_visible(), Some(false));
    assert_eq!(profile.follow_label(), Some("Follow"));

    assert_eq!(profile.toggle_follow().await?, FollowToggle::Followed);
    assert!(!profile.is_sending_request());
    assert_eq!(profile.follow_label(), Some("Request Sent"));
    assert_eq!(profile.posts_visible(), Some(false));

    // carol accepts
    for follow in app.backend.lock().follows.iter_mut() {
        if follow.to == carol {
            follow.status = payloads::FollowStatus::Accepted;
        }
    }
    profile.retry().await;
    assert_eq!(profile.posts_visible(), Some(true));
    assert_eq!(profile.follow_label(), Some("Unfollow"));

    Ok(())
}

#[tokio::test]
async fn pending_request_can_be_cancelled() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;
    let profile = UserProfile::new(backend, app.backend.user_id("carol"));

    profile.activate().await;
    assert_eq!(profile.follow_label(), Some("Request Sent"));

    assert_eq!(profile.toggle_follow().await?, FollowToggle::Unfollowed);
    let view = profile.view().as_ref().cloned().unwrap();
    assert_eq!(view.is_following, Following::False);
    assert_eq!(view.follow_request_id, None);
    let alice = app.backend.user_id("alice");
    let carol = app.backend.user_id("carol");
    let state = app.backend.lock();
    assert!(!state.follows.iter().any(|f| f.by == alice && f.to == carol));

    Ok(())
}

#[tokio::test]
async fn own_profile_has_no_follow_button() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;
    let profile = UserProfile::new(backend, app.backend.user_id("alice"));

    profile.activate().await;
    assert!(profile.is_my_profile());
    assert_eq!(profile.follow_label(), None);
    assert_eq!(profile.posts_visible(), Some(true));
    let view = profile.view().as_ref().cloned().unwrap();
    // dave follows alice; alice follows bob
    assert_eq!(view.profile.count.followers, 1);
    assert_eq!(view.profile.count.following, 1);

    let before = app.backend.total_hits();
    assert_eq!(profile.toggle_follow().await?, FollowToggle::Unchanged);
    assert_eq!(app.backend.total_hits(), before);

    Ok(())
}

#[tokio::test]
async fn failed_follow_from_profile_is_notified() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, notifier) = alice_backend(&app).await?;
    let profile = UserProfile::new(backend, app.backend.user_id("dave"));
    profile.activate().await;

    app.backend.fail_next("/follow/new", StatusCode::BAD_GATEWAY, None);
    assert!(profile.toggle_follow().await.is_err());
    assert!(!profile.is_sending_request());
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("Internal Server Error".into())]
    );
    assert_eq!(profile.follow_label(), Some("Follow"));

    Ok(())
}

#[tokio::test]
async fn missing_profile_fails_and_retries() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;
    let profile = UserProfile::new(backend, UserId(uuid::Uuid::new_v4()));

    let outcome = profile.activate().await;
    assert_eq!(outcome, LoadOutcome::Failed("User not found".into()));
    assert_eq!(profile.error().as_deref(), Some("User not found"));
    assert_eq!(profile.follow_label(), None);
    assert_eq!(profile.toggle_follow().await?, FollowToggle::Unchanged);

    assert!(matches!(profile.retry().await, LoadOutcome::Failed(_)));
    let path = format!("/profile/{}", profile.user_id().0);
    assert_eq!(app.backend.hits(&path).len(), 2);

    Ok(())
}
