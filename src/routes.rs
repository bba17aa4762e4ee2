// File: ./src/routes.rs
// Route table and the channel views use to request navigation.
use crate::model::EventId;
use std::fmt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Events,
    EventCreate,
    EventDetail(EventId),
    EventEdit(EventId),
    EventTimer(EventId),
    Categories,
    CategoryCreate,
    Users,
    UserCreate,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Events => "/events".to_string(),
            Route::EventCreate => "/events/create".to_string(),
            Route::EventDetail(id) => format!("/events/{}", id),
            Route::EventEdit(id) => format!("/events/{}/edit", id),
            Route::EventTimer(id) => format!("/events/{}/timer", id),
            Route::Categories => "/categories".to_string(),
            Route::CategoryCreate => "/categories/create".to_string(),
            Route::Users => "/users".to_string(),
            Route::UserCreate => "/users/create".to_string(),
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Home
                | Route::Login
                | Route::Register
                | Route::ForgotPassword
                | Route::ResetPassword
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Sending half of the navigation channel. Cheap to clone; sends after the
/// front end has gone away are dropped.
#[derive(Clone, Debug)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl Navigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn go(&self, route: Route) {
        log::debug!("navigate -> {}", route);
        let _ = self.tx.send(route);
    }
}
