// File: ./src/session.rs
//! Authentication session: who is signed in and with which bearer token.
//!
//! The session is an ordinary value. It is loaded once at start-up through
//! [`SessionStore`], handed to whatever needs it (client construction,
//! route access checks) and written back through the same store.
use crate::context::AppContext;
use crate::model::{User, UserPatch, UserRole};
use crate::routes::Route;
use crate::storage::{LocalStorage, SESSION_FILE_VERSION};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

/// Outcome of a route access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Refused: the login route when signed out, the dashboard when the
    /// role is not allowed.
    Redirect(Route),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn set_auth(&mut self, user: User, token: String) {
        self.user = Some(user);
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.token = None;
    }

    /// Merges profile changes into the signed-in user. No-op when signed out.
    pub fn update_user(&mut self, patch: UserPatch) {
        if let Some(user) = self.user.as_mut() {
            user.apply(patch);
        }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Signed-out users go to the login route; signed-in users whose role
    /// is not in `roles` go to the dashboard. An empty `roles` admits any
    /// signed-in user.
    pub fn authorize(&self, roles: &[UserRole]) -> Access {
        if !self.is_authenticated() {
            return Access::Redirect(Route::Login);
        }
        match self.role() {
            Some(role) if roles.is_empty() || roles.contains(&role) => Access::Granted,
            _ => Access::Redirect(Route::Dashboard),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    version: u32,
    session: Session,
}

/// Narrow persistence interface for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self {
            path: ctx.get_session_path()?,
        })
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Never fails: a missing, outdated or unreadable file yields a signed-out session.
    pub fn load(&self) -> Session {
        match LocalStorage::read_json::<SessionFile>(&self.path) {
            Ok(Some(file)) if file.version == SESSION_FILE_VERSION => file.session,
            Ok(Some(file)) => {
                log::info!(
                    "Discarding session file with version {} (expected {})",
                    file.version,
                    SESSION_FILE_VERSION
                );
                Session::default()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                log::warn!("Ignoring unreadable session file: {:#}", e);
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if !session.is_authenticated() {
            return LocalStorage::remove(&self.path);
        }
        LocalStorage::write_json(
            &self.path,
            &SessionFile {
                version: SESSION_FILE_VERSION,
                session: session.clone(),
            },
        )
    }
}
