//! Waypoint Client - Access to the Waypoint server API
//!
//! `WaypointApi` is the set of remote operations the provider uses;
//! `WaypointClient` implements it over the server's HTTP/JSON gateway.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use api::WaypointApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::WaypointClient;
