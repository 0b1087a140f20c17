//! Waypoint State Management
//!
//! Persists the last known state of managed resources between runs.
//!
//! - **StateFile**: the state document holding every managed resource
//! - **StateBackend**: a trait for state storage backends
//! - **LocalBackend**: a JSON file on local disk

pub mod backend;
pub mod local;
pub mod state;

pub use backend::{BackendError, BackendResult, StateBackend};
pub use local::LocalBackend;
pub use state::{ResourceState, StateFile};
