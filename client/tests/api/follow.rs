use client::{
    FetchState, FollowList, FollowListKind, FollowRequests, FollowRequestsKind,
    FollowToggle, LoadOutcome, Notification,
};
use payloads::FollowStatus;
use payloads::responses::FollowRecord;
use reqwest::StatusCode;
use test_helpers::spawn_app;

use crate::alice_backend;

fn usernames(records: &FetchState<Vec<FollowRecord>>, by: bool) -> Vec<String> {
    records
        .as_ref()
        .map(|records| {
            records
                .iter()
                .map(|r| {
                    let user = if by { &r.request_by } else { &r.request_to };
                    user.username.clone()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn followings_toggle_unfollow_and_follow() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;
    let alice = app.backend.user_id("alice");
    let list = FollowList::new(backend, alice, FollowListKind::Followings);

    assert!(!list.users().is_fetched());
    assert_eq!(list.load().await, LoadOutcome::Loaded);
    assert_eq!(usernames(&list.users(), false), ["bob"]);

    let record = list.users().as_ref().unwrap()[0].clone();
    assert!(list.counterpart(&record).viewer_follow_request().is_some());

    let toggle = list.toggle_follow(&record).await?;
    assert_eq!(toggle, FollowToggle::Unfollowed);
    assert!(!list.is_request_loading());
    assert!(usernames(&list.users(), false).is_empty());

    // the stale record no longer carries a request, so this follows again
    let mut stale = record.clone();
    stale.request_to.followers.clear();
    let toggle = list.toggle_follow(&stale).await?;
    assert_eq!(toggle, FollowToggle::Followed);
    assert_eq!(usernames(&list.users(), false), ["bob"]);

    Ok(())
}

#[tokio::test]
async fn followers_list_follows_back() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;
    let alice = app.backend.user_id("alice");
    let list = FollowList::new(backend, alice, FollowListKind::Followers);

    list.load().await;
    assert_eq!(usernames(&list.users(), true), ["dave"]);
    let record = list.users().as_ref().unwrap()[0].clone();
    assert_eq!(list.counterpart(&record).username, "dave");
    assert_eq!(list.counterpart(&record).viewer_follow_request(), None);

    let toggle = list.toggle_follow(&record).await?;
    assert_eq!(toggle, FollowToggle::Followed);

    let record = list.users().as_ref().unwrap()[0].clone();
    assert!(list.counterpart(&record).viewer_follow_request().is_some());

    Ok(())
}

#[tokio::test]
async fn toggle_on_self_is_a_no_op() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;
    let dave = app.backend.user_id("dave");
    let list = FollowList::new(backend, dave, FollowListKind::Followings);

    list.load().await;
    let record = list.users().as_ref().unwrap()[0].clone();
    assert_eq!(record.request_to.username, "alice");

    let before = app.backend.total_hits();
    let toggle = list.toggle_follow(&record).await?;
    assert_eq!(toggle, FollowToggle::Unchanged);
    assert_eq!(app.backend.total_hits(), before);

    Ok(())
}

#[tokio::test]
async fn failed_follow_is_notified() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, notifier) = alice_backend(&app).await?;
    let alice = app.backend.user_id("alice");
    let list = FollowList::new(backend, alice, FollowListKind::Followers);
    list.load().await;
    let record = list.users().as_ref().unwrap()[0].clone();

    app.backend.fail_next(
        "/follow/new",
        StatusCode::BAD_REQUEST,
        Some("Follow request already sent"),
    );
    assert!(list.toggle_follow(&record).await.is_err());
    assert!(!list.is_request_loading());
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("Follow request already sent".into())]
    );

    Ok(())
}

#[tokio::test]
async fn accept_received_request() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;
    let requests = FollowRequests::new(backend, FollowRequestsKind::Received);

    assert_eq!(requests.activate().await, LoadOutcome::Loaded);
    // activation runs once
    assert_eq!(requests.activate().await, LoadOutcome::Skipped);
    assert_eq!(usernames(&requests.requests(), true), ["carol"]);

    let record = requests.requests().as_ref().unwrap()[0].clone();
    assert_eq!(record.status, FollowStatus::Pending);
    requests.accept(record.id).await?;

    assert!(!requests.is_updating());
    assert_eq!(requests.requests(), FetchState::Fetched(Vec::new()));

    let alice = app.backend.user_id("alice");
    let state = app.backend.lock();
    assert!(state.follows.iter().any(|f| {
        f.id == record.id && f.to == alice && f.status == FollowStatus::Accepted
    }));

    Ok(())
}

#[tokio::test]
async fn reject_received_and_cancel_sent() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, _) = alice_backend(&app).await?;

    let received =
        FollowRequests::new(backend.clone(), FollowRequestsKind::Received);
    received.activate().await;
    let record = received.requests().as_ref().unwrap()[0].clone();
    received.reject(record.id).await?;
    assert_eq!(received.requests(), FetchState::Fetched(Vec::new()));

    let sent = FollowRequests::new(backend, FollowRequestsKind::Sent);
    sent.activate().await;
    assert_eq!(usernames(&sent.requests(), false), ["carol"]);
    let record = sent.requests().as_ref().unwrap()[0].clone();
    sent.cancel(record.id).await?;
    assert_eq!(sent.requests(), FetchState::Fetched(Vec::new()));

    Ok(())
}

#[tokio::test]
async fn failed_load_can_be_retried() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.backend.seed_social();
    let (backend, notifier) = alice_backend(&app).await?;
    let requests = FollowRequests::new(backend, FollowRequestsKind::Sent);

    app.backend.fail_next(
        "/follow/pending",
        StatusCode::INTERNAL_SERVER_ERROR,
        None,
    );
    let outcome = requests.activate().await;
    assert_eq!(outcome, LoadOutcome::Failed("Internal Server Error".into()));
    assert_eq!(
        requests.loader().error().as_deref(),
        Some("Internal Server Error")
    );
    assert!(!requests.requests().is_fetched());
    // load failures show in the view, not as notifications
    assert!(notifier.notifications().is_empty());

    assert_eq!(requests.retry().await, LoadOutcome::Loaded);
    assert_eq!(requests.loader().error(), None);
    assert_eq!(usernames(&requests.requests(), false), ["carol"]);

    Ok(())
}
