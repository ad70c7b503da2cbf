//! Resource loading: keyed in-flight deduplication and the cached read-through loader.

mod inflight;
mod loader;
pub use inflight::{Claim, FetchKey, InFlight, Pending, Waiter};
pub use loader::{normalize_path, ResourceClient, ResourceLoader};
