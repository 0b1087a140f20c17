//! The remote operations the provider relies on

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{AuthMethod, Project, RunnerConfig};

/// Waypoint server API
///
/// Lookups of objects that do not exist fail with `ClientError::NotFound`.
#[async_trait]
pub trait WaypointApi: Send + Sync {
    /// Fetch a project by name
    async fn get_project(&self, name: &str) -> ClientResult<Project>;

    /// Create or replace a project, returning the stored project
    async fn upsert_project(&self, project: &Project) -> ClientResult<Project>;

    /// Create or update a runner profile. The returned config carries the
    /// server-assigned id.
    async fn create_runner_profile(&self, config: &RunnerConfig) -> ClientResult<RunnerConfig>;

    /// Fetch a runner profile by id
    async fn get_runner_profile(&self, id: &str) -> ClientResult<RunnerConfig>;

    /// Create or update an auth method
    async fn upsert_oidc(&self, method: &AuthMethod) -> ClientResult<AuthMethod>;

    /// Fetch an auth method by name
    async fn get_oidc_auth_method(&self, name: &str) -> ClientResult<AuthMethod>;

    /// Delete an auth method by name
    async fn delete_oidc(&self, name: &str) -> ClientResult<()>;
}
