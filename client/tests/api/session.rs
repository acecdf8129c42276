use client::{
    Backend, FollowRequests, FollowRequestsKind, LoadOutcome, Notification,
    RecordingNotifier, Session,
};
use payloads::requests::{CreateAccount, LoginCredentials};
use reqwest::StatusCode;
use test_helpers::{alice_credentials, assert_status_code, spawn_app};

use crate::alice_backend;

#[tokio::test]
async fn login_refused() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let client = app.client();
    let session = Session::new();

    let body = LoginCredentials {
        username: "alice".into(),
        password: "wrong".into(),
    };
    let result = session.login(&client, &body).await;

    match result {
        Err(payloads::ClientError::APIError(code, text)) => {
            assert_eq!(code, StatusCode::UNAUTHORIZED);
            assert_eq!(text, "Invalid credentials");
        }
        _ => panic!("Expected APIError"),
    }
    assert!(!session.is_authenticated());

    Ok(())
}

#[tokio::test]
async fn logout_clears_identity() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, _) = alice_backend(&app).await?;

    backend.session.logout(&backend.client).await?;

    assert!(!backend.session.is_authenticated());
    // the server session is gone too
    let result = backend.client.get_pending_follow_requests().await;
    assert_status_code(result, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn identity_cache_survives_restart() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let path = std::env::temp_dir()
        .join(format!("identity-{}.json", uuid::Uuid::new_v4()));

    let client = app.client();
    let session = Session::with_cache(&path);
    assert!(!session.is_authenticated());
    session.login(&client, &alice_credentials()).await?;

    // a new session reading the same cache starts logged in
    let restored = Session::with_cache(&path);
    assert_eq!(restored.user_id(), session.user_id());

    // and gives up the identity on the first 401
    let backend = Backend::new(app.client(), restored.clone());
    let requests = FollowRequests::new(backend, FollowRequestsKind::Received);
    let outcome = requests.activate().await;
    assert_eq!(outcome, LoadOutcome::Failed("Unauthorized".into()));
    assert!(!restored.is_authenticated());
    assert!(!path.exists());

    Ok(())
}

#[tokio::test]
async fn login_and_logout_are_announced() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let notifier = RecordingNotifier::default();
    let backend = Backend::new(app.client(), Session::new())
        .with_notifier(notifier.clone());

    let wrong = LoginCredentials {
        username: "alice".into(),
        password: "wrong".into(),
    };
    assert!(backend.login(&wrong).await.is_err());
    backend.login(&alice_credentials()).await?;
    assert!(backend.is_ready());
    backend.logout().await?;
    assert!(!backend.is_ready());

    assert_eq!(
        notifier.notifications(),
        [
            Notification::Error("Invalid credentials".into()),
            Notification::Success("User logged in successfully!".into()),
            Notification::Success("User logged out successfully!".into()),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn failed_logout_still_signs_out_locally() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (backend, notifier) = alice_backend(&app).await?;

    app.backend.expire_session();
    assert!(backend.logout().await.is_err());

    assert!(!backend.session.is_authenticated());
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("Unauthorized".into())]
    );

    Ok(())
}

#[tokio::test]
async fn registered_user_can_log_in() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let notifier = RecordingNotifier::default();
    let backend = Backend::new(app.client(), Session::new())
        .with_notifier(notifier.clone());

    let details = CreateAccount {
        first_name: "Erin".into(),
        last_name: "Hunter".into(),
        username: "erin".into(),
        password: "hunter2".into(),
    };
    backend.create_account(&details).await?;
    // registering does not log in
    assert!(!backend.is_ready());

    let credentials = LoginCredentials {
        username: "erin".into(),
        password: "hunter2".into(),
    };
    let user = backend.login(&credentials).await?;
    assert_eq!(user.first_name, "Erin");
    assert_eq!(backend.session.user_id(), Some(app.backend.user_id("erin")));

    assert!(backend.create_account(&details).await.is_err());
    assert_eq!(
        notifier.notifications(),
        [
            Notification::Success("Profile created successfully!".into()),
            Notification::Success("User logged in successfully!".into()),
            Notification::Error("Username already taken".into()),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn incomplete_registration_is_refused() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let details = CreateAccount {
        first_name: "Erin".into(),
        last_name: " ".into(),
        username: "erin".into(),
        password: "hunter2".into(),
    };

    let result = app.client().create_account(&details).await;
    assert_status_code(result, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn another_user_sees_their_own_follow_state() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.create_user("erin").await?;
    let client = app.login_as("erin").await?;

    let bob = app.backend.user_id("bob");
    let view = client.get_profile(&bob).await?;
    assert_eq!(view.is_following, payloads::responses::Following::False);
    assert_eq!(view.profile.count.followers, 1);

    let found = client.search_users("ERIN").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].last_name, "Tester");

    Ok(())
}
