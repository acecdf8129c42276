use payloads::responses;
use yewdux::prelude::*;

#[derive(Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn(responses::UserSummary),
}

/// Mirrors the client session so that components re-render when the
/// identity changes. The session itself stays the source of truth.
#[derive(Default, Clone, PartialEq, Store)]
pub struct State {
    pub auth_state: AuthState,
}

impl State {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state, AuthState::LoggedIn(_))
    }

    pub fn user(&self) -> Option<&responses::UserSummary> {
        match &self.auth_state {
            AuthState::LoggedIn(user) => Some(user),
            AuthState::LoggedOut => None,
        }
    }
}
