//! # Session
//!
//! Authenticated state is an explicit object handed to whoever needs it
//! (handlers, guards, API clients) rather than ambient global state.
//! Persistence goes through the injected `KeyValueStore` under the
//! `token` and `user` keys.

use crate::error::{AppError, Result};
use crate::models::lenient;
use crate::traits::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_EVENT_MANAGER: &str = "EVENT_MANAGER";

/// Profile of the logged-in user. Server fields beyond the three the client
/// relies on are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Builds a profile from whatever the server returned, filling gaps:
    /// non-object payloads count as empty, a blank email falls back to the
    /// one the user typed.
    pub fn from_profile(raw: Option<&Value>, fallback_email: &str) -> Self {
        let mut user = match raw {
            Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).unwrap_or_default(),
            _ => User::default(),
        };
        if user.email.is_empty() {
            user.email = fallback_email.to_string();
        }
        user
    }
}

/// A bearer token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// What a protected view demands of the caller.
#[derive(Debug, Clone, Default)]
pub struct AccessRequirement {
    pub require_auth: bool,
    /// Any one of these roles suffices
    pub roles: Vec<String>,
    /// Any one of these permissions suffices
    pub permissions: Vec<String>,
}

impl AccessRequirement {
    pub fn authenticated() -> Self {
        Self { require_auth: true, ..Default::default() }
    }

    pub fn with_roles<I: IntoIterator<Item = S>, S: Into<String>>(mut self, roles: I) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permissions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, perms: I) -> Self {
        self.permissions = perms.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not logged in; send to the login page
    RequireLogin,
    /// Logged in but missing a role/permission
    Forbidden,
}

/// Owner of the current session and its persisted copy.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, current: RwLock::new(None) }
    }

    /// Restores a previously persisted session. A missing or unreadable
    /// entry leaves the manager logged out.
    pub async fn init(&self) -> Option<Session> {
        let token = self.store.get_item(TOKEN_KEY).await.ok().flatten();
        let user = self.store.get_item(USER_KEY).await.ok().flatten();

        let restored = match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<User>(&user) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    log::warn!("discarding unreadable stored user: {e}");
                    None
                }
            },
            _ => None,
        };

        *self.write() = restored.clone();
        restored
    }

    /// Persists both keys, then makes `session` current.
    pub async fn establish(&self, session: Session) -> Result<()> {
        let user = serde_json::to_string(&session.user).map_err(|e| AppError::Internal(e.to_string()))?;
        self.store
            .set_item(TOKEN_KEY, &session.token)
            .await
            .map_err(|e| AppError::Internal(format!("persisting token: {e}")))?;
        self.store
            .set_item(USER_KEY, &user)
            .await
            .map_err(|e| AppError::Internal(format!("persisting user: {e}")))?;

        log::info!("session established for {}", session.user.email);
        *self.write() = Some(session);
        Ok(())
    }

    /// Clears the in-memory session and removes the persisted keys.
    /// Storage failures are logged; the in-memory state is cleared regardless.
    pub async fn logout(&self) {
        *self.write() = None;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove_item(key).await {
                log::warn!("failed to remove `{key}` on logout: {e}");
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().as_ref().is_some_and(|s| !s.token.is_empty())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.read().as_ref().is_some_and(|s| s.user.roles.iter().any(|r| r == role))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|s| s.user.permissions.iter().any(|p| p == permission))
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_event_manager(&self) -> bool {
        self.has_role(ROLE_EVENT_MANAGER)
    }

    /// Route-guard decision for a protected view.
    pub fn authorize(&self, requirement: &AccessRequirement) -> Access {
        if requirement.require_auth && !self.is_authenticated() {
            return Access::RequireLogin;
        }
        if !requirement.roles.is_empty() && !self.has_any_role(&requirement.roles) {
            return Access::Forbidden;
        }
        if !requirement.permissions.is_empty() && !self.has_any_permission(&requirement.permissions) {
            return Access::Forbidden;
        }
        Access::Granted
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
