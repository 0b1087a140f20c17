//! Read-only data sources
//!
//! Each reuses the fetch and flatten code of the matching resource. A missing
//! object is an error here rather than an empty state, and so is one that
//! only exists as a deleted placeholder.

use waypoint_core::provider::{ProviderError, ProviderResult};
use waypoint_core::resource::{Resource, State};

use crate::attrs::{self, Attributes};
use crate::project::{flatten_project, is_tombstone, variables_list};
use crate::runner_profile::flatten_runner_profile;
use crate::{TOMBSTONE, WaypointProvider, api_error};

fn lookup_key(resource: &Resource, key: &str) -> ProviderResult<String> {
    let value = attrs::string(&resource.attributes, key);
    if value.is_empty() {
        return Err(
            ProviderError::new(format!("{} is required", key)).for_resource(resource.id.clone())
        );
    }
    Ok(value)
}

impl WaypointProvider {
    pub(crate) async fn read_project_data_source(
        &self,
        resource: Resource,
    ) -> ProviderResult<State> {
        let name = lookup_key(&resource, "project_name")?;
        let project = self
            .api
            .get_project(&name)
            .await
            .map_err(|e| api_error(&resource.id, e))?;
        if is_tombstone(&project) {
            return Err(ProviderError::new(format!("project '{}' not found", name))
                .for_resource(resource.id));
        }

        let mut attributes = flatten_project(&project);
        attributes.insert("project_variables".to_string(), variables_list(&project));
        Ok(State::existing(resource.id, attributes).with_identifier(name))
    }

    pub(crate) async fn read_runner_profile_data_source(
        &self,
        resource: Resource,
    ) -> ProviderResult<State> {
        let id = lookup_key(&resource, "id")?;
        let config = self
            .api
            .get_runner_profile(&id)
            .await
            .map_err(|e| api_error(&resource.id, e))?;
        if config.name == TOMBSTONE {
            return Err(ProviderError::new(format!("runner profile '{}' not found", id))
                .for_resource(resource.id));
        }

        Ok(State::existing(resource.id, flatten_runner_profile(&config)).with_identifier(id))
    }

    pub(crate) async fn read_auth_method_oidc_data_source(
        &self,
        resource: Resource,
    ) -> ProviderResult<State> {
        let name = lookup_key(&resource, "name")?;
        match self.fetch_oidc(&resource.id, &name, &Attributes::new()).await? {
            Some(attributes) => Ok(State::existing(resource.id, attributes).with_identifier(name)),
            None => Err(ProviderError::new(format!("auth method '{}' not found", name))
                .for_resource(resource.id)),
        }
    }
}
