mod comments;
mod feed;
mod follow;
mod profile;
mod session;

use client::{Backend, RecordingNotifier, Session, telemetry};
use test_helpers::{TestApp, alice_credentials, spawn_app};

/// Backend acting for alice, logged in, with notifications recorded.
pub async fn alice_backend(
    app: &TestApp,
) -> anyhow::Result<(Backend, RecordingNotifier)> {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = telemetry::init_subscriber(subscriber);

    let client = app.client();
    let session = Session::new();
    session.login(&client, &alice_credentials()).await?;
    let notifier = RecordingNotifier::default();
    let backend =
        Backend::new(client, session).with_notifier(notifier.clone());
    Ok((backend, notifier))
}

#[tokio::test]
async fn login_sets_identity() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let (backend, _) = alice_backend(&app).await?;

    assert!(backend.is_ready());
    let user = backend.session.user().expect("logged in");
    assert_eq!(user.username, "alice");
    assert_eq!(Some(app.backend.user_id("alice")), backend.session.user_id());

    Ok(())
}
