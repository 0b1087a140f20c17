//! Waypoint Provider
//!
//! Manages Waypoint projects, runner profiles and OIDC auth methods, and
//! exposes read-only data sources for the same three objects.

mod attrs;
mod auth_method_oidc;
mod data_sources;
mod project;
mod runner_profile;
pub mod schemas;

#[cfg(test)]
mod testing;

use std::collections::HashMap;
use std::sync::Arc;

use waypoint_client::{ClientConfig, ClientError, WaypointApi, WaypointClient};
use waypoint_core::provider::{
    BoxFuture, Provider, ProviderError, ProviderFactory, ProviderResult,
};
use waypoint_core::resource::{Resource, ResourceId, State, Value};
use waypoint_core::schema::ResourceSchema;

/// Value written into required fields of objects the server cannot delete
pub(crate) const TOMBSTONE: &str = "RESOURCE DELETED";

/// Declares the Waypoint provider and builds configured instances of it
#[derive(Debug, Default, Clone, Copy)]
pub struct WaypointProviderFactory;

impl ProviderFactory for WaypointProviderFactory {
    fn name(&self) -> &'static str {
        "waypoint"
    }

    fn config_schema(&self) -> ResourceSchema {
        schemas::provider_schema()
    }

    fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        schemas::resource_schemas()
    }

    fn data_source_schemas(&self) -> HashMap<String, ResourceSchema> {
        schemas::data_source_schemas()
    }

    fn configure(&self, config: &HashMap<String, Value>) -> ProviderResult<Box<dyn Provider>> {
        let client_config = ClientConfig::new(
            attrs::string(config, "waypoint_addr"),
            attrs::string(config, "token"),
        )
        .with_tls_skip_verify(attrs::flag(config, "tls_skip_verify"));

        let client = WaypointClient::new(client_config).map_err(ProviderError::from_cause)?;
        log::debug!("configured Waypoint client for {}", client.base_url());

        Ok(Box::new(WaypointProvider::new(Arc::new(client))))
    }
}

/// Configured Waypoint provider
///
/// Holds one API handle for its whole lifetime.
#[derive(Clone)]
pub struct WaypointProvider {
    api: Arc<dyn WaypointApi>,
}

impl WaypointProvider {
    pub fn new(api: Arc<dyn WaypointApi>) -> Self {
        Self { api }
    }
}

/// Wrap a client error for a resource, keeping the server's message
pub(crate) fn api_error(id: &ResourceId, err: ClientError) -> ProviderError {
    ProviderError::from_cause(err).for_resource(id.clone())
}

impl Provider for WaypointProvider {
    fn name(&self) -> &'static str {
        "waypoint"
    }

    fn read(&self, id: &ResourceId, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let current = current.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                schemas::project::RESOURCE_TYPE => self.read_project(id, &current).await,
                schemas::runner_profile::RESOURCE_TYPE => {
                    self.read_runner_profile(id, &current).await
                }
                schemas::auth_method_oidc::RESOURCE_TYPE => {
                    self.read_auth_method_oidc(id, &current).await
                }
                other => Err(ProviderError::unsupported(other).for_resource(id.clone())),
            }
        })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move {
            match resource.id.resource_type.as_str() {
                schemas::project::RESOURCE_TYPE => self.upsert_project(resource).await,
                schemas::runner_profile::RESOURCE_TYPE => {
                    self.create_runner_profile(resource).await
                }
                schemas::auth_method_oidc::RESOURCE_TYPE => {
                    self.upsert_auth_method_oidc(resource).await
                }
                other => Err(ProviderError::unsupported(other).for_resource(resource.id.clone())),
            }
        })
    }

    fn update(
        &self,
        id: &ResourceId,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move {
            match id.resource_type.as_str() {
                schemas::project::RESOURCE_TYPE => self.upsert_project(to).await,
                schemas::runner_profile::RESOURCE_TYPE => {
                    self.update_runner_profile(&from, to).await
                }
                schemas::auth_method_oidc::RESOURCE_TYPE => {
                    self.upsert_auth_method_oidc(to).await
                }
                other => Err(ProviderError::unsupported(other).for_resource(id.clone())),
            }
        })
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        let current = current.clone();
        Box::pin(async move {
            match current.id.resource_type.as_str() {
                schemas::project::RESOURCE_TYPE => self.delete_project(&current).await,
                schemas::runner_profile::RESOURCE_TYPE => {
                    self.delete_runner_profile(&current).await
                }
                schemas::auth_method_oidc::RESOURCE_TYPE => {
                    self.delete_auth_method_oidc(&current).await
                }
                other => Err(ProviderError::unsupported(other).for_resource(current.id.clone())),
            }
        })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move {
            match resource.id.resource_type.as_str() {
                schemas::project::RESOURCE_TYPE => self.read_project_data_source(resource).await,
                schemas::runner_profile::RESOURCE_TYPE => {
                    self.read_runner_profile_data_source(resource).await
                }
                schemas::auth_method_oidc::RESOURCE_TYPE => {
                    self.read_auth_method_oidc_data_source(resource).await
                }
                other => Err(ProviderError::unsupported(other).for_resource(resource.id.clone())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[test]
    fn configure_without_token_fails() {
        let mut config = HashMap::new();
        config.insert("waypoint_addr".to_string(), Value::from("localhost:9702"));

        let err = match WaypointProviderFactory.configure(&config) {
            Ok(_) => panic!("configure should fail without a token"),
            Err(e) => e,
        };
        assert_eq!(err.to_string(), "no Waypoint token set");
    }

    #[test]
    fn configure_with_token_succeeds() {
        let mut config = HashMap::new();
        config.insert("waypoint_addr".to_string(), Value::from("localhost:9702"));
        config.insert("token".to_string(), Value::from("test-token"));

        let provider = WaypointProviderFactory.configure(&config).unwrap();
        assert_eq!(provider.name(), "waypoint");
    }

    #[test]
    fn configure_reads_token_from_environment() {
        // SAFETY: no other test in this crate reads these variables.
        unsafe {
            std::env::set_var("WAYPOINT_TOKEN", "env-token");
            std::env::set_var("WAYPOINT_ADDR", "waypoint.internal:9702");
        }

        let mut config = HashMap::new();
        WaypointProviderFactory.config_schema().apply_defaults(&mut config);
        assert_eq!(config["token"], Value::from("env-token"));
        assert_eq!(config["waypoint_addr"], Value::from("waypoint.internal:9702"));

        let provider = WaypointProviderFactory.configure(&config).unwrap();
        assert_eq!(provider.name(), "waypoint");
    }

    #[test]
    fn schema_json_lists_everything() {
        let doc = WaypointProviderFactory.schema_json();
        assert!(doc["provider"]["block"]["attributes"]["token"]["sensitive"]
            .as_bool()
            .unwrap());
        assert!(doc["resource_schemas"]["waypoint_project"].is_object());
        assert!(doc["data_source_schemas"]["waypoint_auth_method_oidc"].is_object());
    }

    #[tokio::test]
    async fn unknown_resource_type_is_unsupported() {
        let provider = WaypointProvider::new(Arc::new(FakeApi::default()));
        let err = provider
            .create(&Resource::new("waypoint_deployment", "web"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[waypoint_deployment.web] unsupported resource type: waypoint_deployment"
        );
    }
}
