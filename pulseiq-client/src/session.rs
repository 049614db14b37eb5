//! Session flag and route guard
//!
//! Access control is a pure function of one persisted flag: present means
//! logged in. [`guard`] decides whether a route may render or where to
//! redirect; [`SessionStore`] owns the flag and the mock login/signup forms.

use std::fmt;
use std::sync::Arc;

use config_engine::AccountConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::storage::{KeyValueStore, SESSION_KEY};

/// Longest redirect chain [`resolve`] follows; `/unknown` → `/` → `/dashboard`
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Landing,
    Login,
    Dashboard,
    Profile,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 { trimmed.trim_end_matches('/') } else { trimmed };
        match normalized {
            "/" | "" => Some(Route::Landing),
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/profile" => Some(Route::Profile),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
        }
    }

    /// Protected routes need the session flag
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Profile)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of guarding one navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Decide whether `route` may render given the current flag state
pub fn guard(route: Route, logged_in: bool) -> Navigation {
    match (route.is_protected(), logged_in) {
        (true, false) => Navigation::Redirect(Route::Login),
        // public-only views are closed to a logged-in user
        (false, true) => Navigation::Redirect(Route::Dashboard),
        _ => Navigation::Render(route),
    }
}

/// Final route a path lands on, after following redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub redirected: bool,
}

/// Follow guard redirects from `path` until a route renders
pub fn resolve(path: &str, logged_in: bool) -> Resolution {
    let (mut route, mut redirected) = match Route::from_path(path) {
        Some(route) => (route, false),
        None => (Route::Landing, true),
    };

    for _ in 0..MAX_REDIRECTS {
        match guard(route, logged_in) {
            Navigation::Render(target) => return Resolution { route: target, redirected },
            Navigation::Redirect(target) => {
                route = target;
                redirected = true;
            }
        }
    }

    // guard redirects always land on a renderable route within two hops
    Resolution { route, redirected }
}

/// Signup form fields, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Owner of the persisted session flag
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    account: AccountConfig,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, account: AccountConfig) -> Self {
        Self { storage, account }
    }

    /// Current flag value, read fresh on every call
    pub async fn current_user(&self) -> ClientResult<Option<String>> {
        self.storage.get(SESSION_KEY).await
    }

    pub async fn is_logged_in(&self) -> ClientResult<bool> {
        Ok(self.current_user().await?.is_some())
    }

    /// Compare against the mock account; on match set the flag
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        if email != self.account.email || password != self.account.password {
            tracing::info!("login rejected");
            return Err(ClientError::InvalidCredentials);
        }
        self.storage.set(SESSION_KEY, email).await?;
        tracing::info!(user = email, "session started");
        Ok(())
    }

    /// Validate the signup form; no account or session is created
    pub fn signup(&self, form: &SignupForm) -> ClientResult<()> {
        if form.full_name.is_empty() || form.email.is_empty() || form.password.is_empty() {
            return Err(ClientError::Validation("Fill all fields.".to_string()));
        }
        if form.password != form.confirm_password {
            return Err(ClientError::PasswordMismatch);
        }
        tracing::info!(user = %form.email, "signup accepted, login required");
        Ok(())
    }

    pub async fn sign_out(&self) -> ClientResult<()> {
        self.storage.remove(SESSION_KEY).await?;
        tracing::info!("session ended");
        Ok(())
    }
}
