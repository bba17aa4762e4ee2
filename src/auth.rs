// File: ./src/auth.rs
//! Sign-in flow: owns the [`Session`], keeps the client's bearer token in
//! step with it and writes every change through the [`SessionStore`].
use crate::client::{ApiClient, ApiError};
use crate::model::{LoginRequest, RegisterRequest, User, UserPatch, UserRole};
use crate::notify::Notifier;
use crate::routes::{Navigator, Route};
use crate::session::{Access, Session, SessionStore};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Password must be at least 6 characters long")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Invalid reset token")]
    MissingToken,
    #[error("Only administrators can create users")]
    AdminOnly,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checks a new password and its confirmation.
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    if password != confirmation {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}

pub struct Auth {
    client: ApiClient,
    store: SessionStore,
    session: Session,
    notifier: Notifier,
    navigator: Navigator,
}

impl Auth {
    /// Restores the persisted session and authenticates `client` with it.
    pub fn new(
        client: ApiClient,
        store: SessionStore,
        notifier: Notifier,
        navigator: Navigator,
    ) -> Self {
        let session = store.load();
        let client = client.with_token(session.bearer());
        Self {
            client,
            store,
            session,
            notifier,
            navigator,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Client carrying the current session's token.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.client.login(&credentials).await?;
        log::info!("Signed in as {}", response.user.email);
        self.adopt(response.user.clone(), response.token);
        self.navigator.go(Route::Dashboard);
        Ok(response.user)
    }

    pub async fn register(
        &mut self,
        data: RegisterRequest,
        confirmation: &str,
    ) -> Result<User, AuthError> {
        check_new_password(&data.password, confirmation)?;
        let response = self.client.register(&data).await?;
        log::info!("Registered {} as {}", response.user.email, response.user.role);
        self.adopt(response.user.clone(), response.token);
        self.navigator.go(Route::Dashboard);
        Ok(response.user)
    }

    /// Registers another account on behalf of the signed-in admin. The
    /// admin's session is kept; the new account's token is discarded.
    pub async fn create_user(
        &self,
        data: RegisterRequest,
        confirmation: &str,
    ) -> Result<User, AuthError> {
        if self.session.authorize(&[UserRole::Admin]) != Access::Granted {
            return Err(AuthError::AdminOnly);
        }
        check_new_password(&data.password, confirmation)?;
        let response = self.client.register(&data).await?;
        log::info!("Created {} user {}", response.user.role, response.user.email);
        self.notifier.success("Operator user created successfully!");
        self.navigator.go(Route::Users);
        Ok(response.user)
    }

    /// Always ends signed out, whatever the server says.
    pub async fn logout(&mut self) {
        if self.session.is_authenticated()
            && let Err(e) = self.client.logout().await
        {
            log::warn!("Logout request failed: {}", e);
        }
        self.drop_session();
        self.navigator.go(Route::Login);
    }

    /// Confirms the stored token with the server. A rejected token clears
    /// the session.
    pub async fn check_auth(&mut self) -> Option<User> {
        if !self.session.is_authenticated() {
            return None;
        }
        match self.client.current_user().await {
            Ok(user) => {
                self.session.user = Some(user.clone());
                self.persist();
                Some(user)
            }
            Err(e) => {
                log::info!("Stored session rejected: {}", e);
                self.drop_session();
                None
            }
        }
    }

    /// Swaps the token for a fresh one.
    pub async fn refresh(&mut self) -> Result<(), AuthError> {
        let response = self.client.refresh_token().await?;
        self.session.token = Some(response.token);
        self.client = self.client.with_token(self.session.bearer());
        self.persist();
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let response = self.client.forgot_password(email.trim()).await?;
        log::debug!("forgot-password: {}", response.message);
        self.notifier
            .success("Password reset link sent! Check your email.");
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        check_new_password(password, confirmation)?;
        self.client.reset_password(token.trim(), password).await?;
        self.notifier
            .success("Password reset successfully! Redirecting to login...");
        self.navigator.go(Route::Login);
        Ok(())
    }

    /// Merges a profile change into the signed-in user.
    pub fn update_user(&mut self, patch: UserPatch) {
        self.session.update_user(patch);
        self.persist();
    }

    /// Reaction to a 401 from any call: sign out locally and go to login.
    pub fn handle_unauthorized(&mut self) {
        if self.session.is_authenticated() {
            self.notifier.warning("Session expired, please sign in again");
        }
        self.drop_session();
        self.navigator.go(Route::Login);
    }

    fn adopt(&mut self, user: User, token: String) {
        self.session.set_auth(user, token);
        self.client = self.client.with_token(self.session.bearer());
        self.persist();
    }

    fn drop_session(&mut self) {
        self.session.clear();
        self.client = self.client.with_token(None);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.session) {
            log::error!("Failed to save session: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert_eq!(check_new_password("abc", "abc"), Err(AuthError::WeakPassword));
        assert_eq!(
            check_new_password("abcdef", "abcdeg"),
            Err(AuthError::PasswordMismatch)
        );
        assert_eq!(check_new_password("abcdef", "abcdef"), Ok(()));
    }
}
