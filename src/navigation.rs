//! Navigation and notification boundaries: read the current location, redirect, show a notice.

use std::fmt;

/// Current navigable location: path plus raw query string (without the leading `?`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Location {
            path: path.into(),
            query: String::new(),
        }
    }

    /// Split `"/a/b?x=1"` into path and query.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Location {
                path: path.to_string(),
                query: query.to_string(),
            },
            None => Location::new(href),
        }
    }

    /// Path with `?query` appended when there is one.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl Redirect {
    pub fn replace(to: impl Into<String>) -> Self {
        Redirect {
            to: to.into(),
            replace: true,
        }
    }
}

/// Router boundary. Redirects are fire-and-forget; the resulting navigation arrives later as a
/// new location.
pub trait Navigator: Send + Sync {
    fn location(&self) -> Location;
    fn redirect(&self, redirect: Redirect);
}

/// Transient user-visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    AccessDenied { organization_id: String },
    LoadFailed { organization_id: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AccessDenied { .. } => f.write_str("You do not have access to this institute"),
            Notice::LoadFailed { .. } => f.write_str("Failed to load institute data"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs, for hosts without a toast surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{}", notice);
    }
}
