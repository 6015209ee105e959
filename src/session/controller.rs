//! Session state controller.
//!
//! DESIGN
//! ======
//! The [`Session`] lives in a `watch` channel owned by the controller.
//! Observers get copies or a receiver; only the controller writes. The
//! controller is a cheap `Clone` handle built once at startup and passed to
//! every consumer.
//!
//! STATE MACHINE
//! =============
//! Initializing -> (Unauthenticated | Authenticated) seeded from the
//! persisted snapshot; `login` goes through Authenticating, `logout` through
//! Authenticating-out. `ready` flips to true once, when the startup health
//! probe settles either way.
//!
//! CONCURRENCY
//! ===========
//! No lock is held across a network call. Two overlapping logins both race
//! on `user` and `loading`; whichever resolves last wins. Each transition
//! itself is applied in a single `send_modify`.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::snapshot::{LoginResponse, UserSnapshot, load_snapshot, persist_snapshot};
use crate::api::{ApiClient, ApiError};
use crate::storage::KeyValueStore;

/// What the UI reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserSnapshot>,
    /// True only while a login or logout exchange is in flight.
    pub loading: bool,
    /// True once the startup probe has settled. Never reverts.
    pub ready: bool,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Session>,
}

impl SessionController {
    /// Seed the session from the persisted snapshot and spawn the startup
    /// probe. Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let user = match load_snapshot(store.as_ref()) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "session snapshot unreadable; starting signed out");
                None
            }
        };
        if let Some(user) = &user {
            debug!(username = user.display_name(), "restored session snapshot");
        }

        let (state, _) = watch::channel(Session { user, loading: false, ready: false });
        let controller = Self { inner: Arc::new(Inner { api, store, state }) };
        controller.spawn_startup_probe();
        controller
    }

    fn spawn_startup_probe(&self) {
        let api = self.inner.api.clone();
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let outcome = api.health().await;
            // The controller may be gone by the time the probe settles.
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if let Err(e) = outcome {
                debug!(error = %e, "startup health probe failed");
            }
            inner.state.send_if_modified(|session| {
                if session.ready {
                    return false;
                }
                session.ready = true;
                true
            });
        });
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Copy of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserSnapshot> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.state.borrow().ready
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Resolve once the startup probe has settled.
    pub async fn wait_ready(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|session| session.ready).await;
    }

    /// The API client shared with this session (same cookie jar).
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Authenticate and make the returned user current.
    ///
    /// # Errors
    ///
    /// Returns the API client's error unchanged; the session keeps its
    /// previous user.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSnapshot, ApiError> {
        self.set_loading(true);
        match self.inner.api.login(username, password).await {
            Ok(body) => {
                let user = LoginResponse::classify(body).into_snapshot(username);
                info!(username = user.display_name(), "signed in");
                self.commit_user(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.set_loading(false);
                Err(e)
            }
        }
    }

    /// Drop the session locally. Always succeeds, even if the backend call
    /// does not.
    pub async fn logout(&self) {
        self.set_loading(true);
        if let Err(e) = self.inner.api.logout().await {
            warn!(error = %e, "backend logout failed; clearing local session anyway");
        }
        self.commit_user(None);
        info!("signed out");
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_modify(|session| session.loading = loading);
    }

    fn commit_user(&self, user: Option<UserSnapshot>) {
        if let Err(e) = persist_snapshot(self.inner.store.as_ref(), user.as_ref()) {
            warn!(error = %e, "failed to persist session snapshot");
        }
        self.inner.state.send_modify(|session| {
            session.user = user;
            session.loading = false;
        });
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
