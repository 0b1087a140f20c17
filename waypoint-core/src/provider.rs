//! Provider - Traits abstracting resource operations
//!
//! A `ProviderFactory` declares the provider configuration and turns a
//! configuration attribute map into a configured `Provider`. The configured
//! Provider converts resource attribute maps into remote API calls.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    /// Wrap an error, keeping its message unchanged
    pub fn from_cause(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(cause.to_string()).with_cause(cause)
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn unsupported(resource_type: &str) -> Self {
        Self::new(format!("unsupported resource type: {}", resource_type))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Declares a provider and builds configured instances of it
pub trait ProviderFactory: Send + Sync {
    /// Name of this Provider (e.g., "waypoint")
    fn name(&self) -> &'static str;

    /// Schema of the provider configuration block
    fn config_schema(&self) -> ResourceSchema;

    /// Schemas of every managed resource type, keyed by type name
    fn resource_schemas(&self) -> HashMap<String, ResourceSchema>;

    /// Schemas of every data source, keyed by type name
    fn data_source_schemas(&self) -> HashMap<String, ResourceSchema>;

    /// Build a configured Provider from the provider configuration attributes
    ///
    /// Environment defaults declared in `config_schema` have already been applied.
    fn configure(&self, config: &HashMap<String, Value>) -> ProviderResult<Box<dyn Provider>>;

    /// Terraform-style schema document covering provider, resources and data sources
    fn schema_json(&self) -> serde_json::Value {
        let sorted = |schemas: HashMap<String, ResourceSchema>| {
            let mut names: Vec<&String> = schemas.keys().collect();
            names.sort();
            names
                .into_iter()
                .map(|name| (name.clone(), schemas[name].to_json()))
                .collect::<serde_json::Map<String, serde_json::Value>>()
        };

        serde_json::json!({
            "provider": self.config_schema().to_json(),
            "resource_schemas": sorted(self.resource_schemas()),
            "data_source_schemas": sorted(self.data_source_schemas()),
        })
    }
}

/// Configured Provider
///
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "waypoint")
    fn name(&self) -> &'static str;

    /// Get the current state of a managed resource
    ///
    /// `current` is the last known state, carrying the remote identifier.
    /// Returns `State::not_found()` if the resource no longer exists remotely.
    fn read(&self, id: &ResourceId, current: &State) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the remote identifier
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place
    fn update(
        &self,
        id: &ResourceId,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>>;

    /// Read a data source
    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read(&self, id: &ResourceId, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(id, current)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        id: &ResourceId,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(id, from, to)
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(current)
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read_data_source(resource)
    }
}
