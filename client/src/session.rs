//! The logged in identity, shared read-only by everything that needs to
//! know whether requests will be authorized.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use payloads::{APIClient, ClientError, UserId, requests, responses};

/// Where the identity is kept between runs, as JSON.
pub trait IdentityStore {
    fn load(&self) -> Option<String>;
    fn save(&self, json: &str);
    fn remove(&self);
}

/// Identity cache in a file.
pub struct FileStore(pub PathBuf);

impl IdentityStore for FileStore {
    fn load(&self) -> Option<String> {
        std::fs::read_to_string(&self.0).ok()
    }

    fn save(&self, json: &str) {
        if let Err(e) = std::fs::write(&self.0, json) {
            tracing::warn!(path = %self.0.display(), "failed to cache identity: {e}");
        }
    }

    fn remove(&self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

type Listener = Rc<dyn Fn(Option<&responses::UserSummary>)>;

#[derive(Default)]
struct Inner {
    user: Option<responses::UserSummary>,
    store: Option<Box<dyn IdentityStore>>,
    listeners: Vec<Listener>,
}

/// Cached identity of the logged in user.
///
/// Cloning yields another handle to the same identity.
#[derive(Clone, Default)]
pub struct Session {
    inner: Rc<RefCell<Inner>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session kept in `store`, starting from whatever identity it holds.
    /// An unreadable identity counts as logged out.
    pub fn with_store(store: impl IdentityStore + 'static) -> Self {
        let user = store.load().and_then(|json| {
            serde_json::from_str(&json)
                .inspect_err(|e| {
                    tracing::warn!("ignoring corrupt identity cache: {e}");
                })
                .ok()
        });
        Self {
            inner: Rc::new(RefCell::new(Inner {
                user,
                store: Some(Box::new(store)),
                listeners: Vec::new(),
            })),
        }
    }

    /// A session persisted as JSON at `path`.
    pub fn with_cache(path: impl Into<PathBuf>) -> Self {
        Self::with_store(FileStore(path.into()))
    }

    /// Called with the new identity whenever it is set or cleared.
    pub fn on_change(
        &self,
        listener: impl Fn(Option<&responses::UserSummary>) + 'static,
    ) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn user(&self) -> Option<responses::UserSummary> {
        self.inner.borrow().user.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner.borrow().user.as_ref().map(|user| user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().user.is_some()
    }

    pub fn sign_in(&self, user: responses::UserSummary) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(store) = &inner.store {
                match serde_json::to_string(&user) {
                    Ok(json) => store.save(&json),
                    Err(e) => tracing::warn!("failed to cache identity: {e}"),
                }
            }
            tracing::info!(user = %user.username, "signed in");
            inner.user = Some(user);
        }
        self.emit_change();
    }

    pub fn clear(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(store) = &inner.store {
                store.remove();
            }
            inner.user = None;
        }
        self.emit_change();
    }

    fn emit_change(&self) {
        let (user, listeners) = {
            let inner = self.inner.borrow();
            (inner.user.clone(), inner.listeners.clone())
        };
        for listener in listeners {
            listener(user.as_ref());
        }
    }

    /// Global handling of expired sessions: any 401/403 clears the cached
    /// identity. The result itself is passed through unchanged.
    pub fn intercept<T>(
        &self,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(e) = &result {
            if e.is_auth_expired() && self.is_authenticated() {
                tracing::warn!("session expired, clearing cached identity");
                self.clear();
            }
        }
        result
    }

    pub async fn login(
        &self,
        client: &APIClient,
        credentials: &requests::LoginCredentials,
    ) -> Result<responses::UserSummary, ClientError> {
        let user = client.login(credentials).await?;
        self.sign_in(user.clone());
        Ok(user)
    }

    pub async fn logout(&self, client: &APIClient) -> Result<(), ClientError> {
        let result = self.intercept(client.logout().await);
        if result.is_ok() {
            self.clear();
            tracing::info!("logged out");
        }
        result
    }
}
