//! Login form.

use super::Navigation;
use crate::session::{Session, SessionController};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign in with the current form values.
    ///
    /// The username is trimmed; the password is sent as typed. On failure the
    /// backend's `detail` is shown, or a generic message when it sent none.
    pub async fn submit(&mut self, session: &SessionController) -> Option<Navigation> {
        self.error = None;
        match session.login(self.username.trim(), &self.password).await {
            Ok(_) => Some(Navigation::Home),
            Err(e) => {
                self.error = Some(e.detail().unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_owned()));
                None
            }
        }
    }

    /// The submit control is disabled while an auth exchange is in flight.
    #[must_use]
    pub fn submit_disabled(session: &Session) -> bool {
        session.loading
    }

    #[must_use]
    pub fn submit_label(session: &Session) -> &'static str {
        if session.loading { "Signing in..." } else { "Login" }
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
