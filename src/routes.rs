//! Route guard.
//!
//! Maps a path and the current [`Session`] to what the app should show:
//! a loading view, a page, or a redirect.

use crate::session::Session;

/// Where a page or the guard sends the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Home,
    Login,
}

impl Navigation {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    CustomerList,
    NewCustomer,
    EditCustomer(i64),
    Login,
    Unknown,
}

impl Route {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::CustomerList,
            "/login" => Self::Login,
            "/customers/new" => Self::NewCustomer,
            _ => trimmed
                .strip_prefix("/customers/")
                .and_then(|id| id.parse().ok())
                .map_or(Self::Unknown, Self::EditCustomer),
        }
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::CustomerList | Self::NewCustomer | Self::EditCustomer(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// An auth exchange is in flight; show the loading view.
    Loading,
    Render(Route),
    Redirect(Navigation),
}

#[must_use]
pub fn resolve(path: &str, session: &Session) -> RouteDecision {
    if session.loading {
        return RouteDecision::Loading;
    }
    let authenticated = session.is_authenticated();
    match Route::parse(path) {
        route if route.requires_auth() && !authenticated => RouteDecision::Redirect(Navigation::Login),
        Route::Login if authenticated => RouteDecision::Redirect(Navigation::Home),
        Route::Unknown if authenticated => RouteDecision::Redirect(Navigation::Home),
        Route::Unknown => RouteDecision::Redirect(Navigation::Login),
        route => RouteDecision::Render(route),
    }
}

/// Navbar text for the signed-in user.
#[must_use]
pub fn navbar_label(session: &Session) -> Option<String> {
    session
        .user
        .as_ref()
        .map(|user| format!("Signed in as {}", user.display_name()))
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
