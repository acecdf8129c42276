use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use payloads::{APIClient, ClientError, requests, responses};

use crate::Session;

/// Shown for failures that carry no server message and no better helper.
pub const GENERIC_FAILURE: &str = "An error occurred! Please try again!";

/// Transient user notifications ("toasts") for one-off mutations, which
/// report failures here instead of in persistent view state.
pub trait Notifier {
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

/// Notifier that only logs.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error(String),
    Success(String),
}

/// Notifier that keeps what it was told, for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notifications: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.notifications
            .borrow_mut()
            .push(Notification::Error(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.notifications
            .borrow_mut()
            .push(Notification::Success(message.to_string()));
    }
}

/// The shared credentialed client together with the session it acts for.
///
/// Every consumer gets a clone; they all share one client, one identity and
/// one notifier.
#[derive(Clone)]
pub struct Backend {
    pub client: Rc<APIClient>,
    pub session: Session,
    pub notifier: Rc<dyn Notifier>,
}

impl Backend {
    pub fn new(client: APIClient, session: Session) -> Self {
        Self {
            client: Rc::new(client),
            session,
            notifier: Rc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Rc::new(notifier);
        self
    }

    /// Readiness signal gating initial fetches.
    pub fn is_ready(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Await a request, passing the result through the session interceptor.
    pub async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        self.session.intercept(request.await)
    }

    /// Like [`Backend::call`], but failures are also reported as a transient
    /// notification. `helper` is shown when the server gave no message.
    pub async fn mutate<T>(
        &self,
        helper: &str,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        let result = self.call(request).await;
        if let Err(e) = &result {
            self.report(e, helper);
        }
        result
    }

    /// Log in through the session, announcing the outcome.
    pub async fn login(
        &self,
        credentials: &requests::LoginCredentials,
    ) -> Result<responses::UserSummary, ClientError> {
        let result = self.session.login(&self.client, credentials).await;
        match &result {
            Ok(_) => self.notifier.success("User logged in successfully!"),
            Err(e) => self.report(e, GENERIC_FAILURE),
        }
        result
    }

    /// Log out. The local identity is cleared even when the request fails,
    /// since the cookie may already be gone.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.session.logout(&self.client).await;
        match &result {
            Ok(()) => self.notifier.success("User logged out successfully!"),
            Err(e) => {
                self.report(e, GENERIC_FAILURE);
                self.session.clear();
            }
        }
        result
    }

    /// Register a new user. They still have to log in afterwards.
    pub async fn create_account(
        &self,
        details: &requests::CreateAccount,
    ) -> Result<(), ClientError> {
        self.mutate("Failed to register!", self.client.create_account(details))
            .await?;
        self.notifier.success("Profile created successfully!");
        Ok(())
    }

    pub fn report(&self, error: &ClientError, helper: &str) {
        tracing::warn!("{helper}: {error}");
        let message = match error {
            ClientError::APIError(_, message) => message.as_str(),
            _ => helper,
        };
        self.notifier.error(message);
    }
}
