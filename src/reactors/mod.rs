//! The two reactors keeping the selection and the route consistent, and the synchronizer that
//! drives them.

mod downward;
mod synchronizer;
mod upward;

#[cfg(test)]
mod fixtures;

pub use downward::clear_for_route;
pub use synchronizer::{RouteContext, RouteSynchronizer};
pub use upward::{UpwardOutcome, UpwardSync};
