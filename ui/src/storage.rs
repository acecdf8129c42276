use client::IdentityStore;

/// Key the logged in user is kept under.
const IDENTITY_KEY: &str = "twinstagram_logged_in_user";

/// Keeps the identity in the browser's local storage, so that a reload or a
/// new tab starts signed in.
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl IdentityStore for LocalStorage {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(IDENTITY_KEY).ok().flatten()
    }

    fn save(&self, json: &str) {
        let stored = Self::storage()
            .is_some_and(|storage| storage.set_item(IDENTITY_KEY, json).is_ok());
        if !stored {
            tracing::warn!("failed to keep identity in local storage");
        }
    }

    fn remove(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(IDENTITY_KEY);
        }
    }
}
