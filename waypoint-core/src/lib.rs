//! Waypoint Core
//!
//! Attribute model, schemas and provider traits shared by the Waypoint
//! provider and the command line driver.

pub mod differ;
pub mod effect;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
