//! Route observation and route builders.

pub mod paths;
mod snapshot;
pub use snapshot::{RouteBranch, RouteIdentifiers, RouteSnapshot, SelectionStep};
