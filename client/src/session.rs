use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::AuthenticatedUser;

#[derive(Debug, Default)]
struct Inner {
    access_token: Option<String>,
    user: Option<AuthenticatedUser>,
}

/// In-memory holder of the current access token and user profile. Lives for
/// the duration of the process; nothing is persisted. Cloning shares the
/// underlying state, so one store can be handed to a client and inspected
/// from elsewhere. The only writers are login, refresh, and explicit clear.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn user(&self) -> Option<AuthenticatedUser> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    /// Login path: replaces both token and profile.
    pub fn set_session(&self, access_token: String, user: AuthenticatedUser) {
        let mut inner = self.write();
        inner.access_token = Some(access_token);
        inner.user = Some(user);
    }

    /// Refresh path: swaps the token, keeps the profile.
    pub fn set_access_token(&self, access_token: String) {
        self.write().access_token = Some(access_token);
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.access_token = None;
        inner.user = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "1".into(),
            account_id: "1".into(),
            account_name: "Administrator".into(),
            account_type: "HQ".into(),
            user_roles: vec!["ROLE_ADMIN".into()],
            company_id: "1".into(),
            company_name: "FacilityHub HQ".into(),
            building_id: "1".into(),
            building_name: "Headquarters".into(),
        }
    }

    #[test]
    fn set_session_then_clear() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.set_session("token-1".into(), sample_user());
        assert_eq!(store.access_token().as_deref(), Some("token-1"));
        assert!(store.user().is_some());

        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn refresh_keeps_the_profile() {
        let store = SessionStore::new();
        store.set_session("token-1".into(), sample_user());
        store.set_access_token("token-2".into());
        assert_eq!(store.access_token().as_deref(), Some("token-2"));
        assert_eq!(store.user().map(|u| u.user_id).as_deref(), Some("1"));
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set_session("token-1".into(), sample_user());
        assert_eq!(other.access_token().as_deref(), Some("token-1"));
    }
}
