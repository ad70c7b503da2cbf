//! Route context: keeps a hierarchical institute/class/subject/child selection consistent with
//! the navigable route.

pub mod case;
pub mod config;
pub mod error;
pub mod model;
pub mod navigation;
pub mod reactors;
pub mod response;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod store;

pub use config::{load_from_path, validate, SyncConfig};
pub use error::{ConfigError, LoadError, SyncError};
pub use model::{Child, ClassInfo, EntityId, Organization, Subject};
pub use navigation::{Location, Navigator, Notice, Notifier, Redirect, TracingNotifier};
pub use reactors::{clear_for_route, RouteContext, RouteSynchronizer, UpwardOutcome, UpwardSync};
pub use routes::{RouteBranch, RouteIdentifiers, RouteSnapshot, SelectionStep};
pub use service::{FetchKey, ResourceClient, ResourceLoader};
pub use session::{Session, SessionIdentity, User, UserRole};
pub use state::ContextState;
pub use store::{Level, Selection, SelectionChange, SelectionStore};
