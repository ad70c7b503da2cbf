//! Typed errors for resource loading, configuration, and route synchronization.

use thiserror::Error;

/// Outcome of a failed resource fetch. `Clone` so one settled fetch can be handed to every joined caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    Denied(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
    /// The fetch that owned this key was dropped before it settled.
    #[error("fetch abandoned: {0}")]
    Abandoned(String),
}

impl LoadError {
    /// Not-found and denied are the same condition for propagation: the entity is not reachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_) | LoadError::Denied(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Transport(_) | LoadError::Abandoned(_))
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFound(_) => "not_found",
            LoadError::Denied(_) => "denied",
            LoadError::Transport(_) => "transport",
            LoadError::Decode(_) => "decode",
            LoadError::Abandoned(_) => "abandoned",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("env {var}: {message}")]
    Env { var: &'static str, message: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Failure resolving a required ancestor (the institute) during upward sync.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("no access to institute '{organization_id}'")]
    AccessDenied { organization_id: String },
}
