//! waypoint_runner_profile: expand, flatten and CRUD

use waypoint_client::types::{
    ConfigFormat, Empty, RunnerConfig, RunnerId, RunnerLabels, RunnerTarget,
};
use waypoint_core::provider::{ProviderError, ProviderResult};
use waypoint_core::resource::{Resource, ResourceId, State, Value};

use crate::attrs::{self, Attributes};
use crate::{TOMBSTONE, WaypointProvider, api_error};

/// Build the runner config to send from resource attributes
///
/// `id` is empty when creating a new profile.
pub(crate) fn expand_runner_profile(
    attributes: &Attributes,
    id: &str,
) -> Result<RunnerConfig, String> {
    let format = attrs::int(attributes, "plugin_config_format");
    let config_format = ConfigFormat::from_index(format).ok_or_else(|| {
        format!(
            "plugin_config_format must be 0 (HCL) or 1 (JSON), got {}",
            format
        )
    })?;

    let target_id = attrs::string(attributes, "target_runner_id");
    let target_labels = attrs::string_map(attributes, "target_runner_labels");
    // Labels take precedence over an id
    let target_runner = if !target_labels.is_empty() {
        RunnerTarget::Labels(RunnerLabels {
            labels: target_labels,
        })
    } else if !target_id.is_empty() {
        RunnerTarget::Id(RunnerId { id: target_id })
    } else {
        RunnerTarget::Any(Empty {})
    };

    Ok(RunnerConfig {
        id: id.to_string(),
        name: attrs::string(attributes, "profile_name"),
        oci_url: attrs::string(attributes, "oci_url"),
        environment_variables: attrs::string_map(attributes, "environment_variables"),
        plugin_type: attrs::string(attributes, "plugin_type"),
        plugin_config: attrs::string(attributes, "plugin_config").into_bytes(),
        config_format,
        default: attrs::flag(attributes, "default"),
        target_runner: Some(target_runner),
    })
}

pub(crate) fn flatten_runner_profile(config: &RunnerConfig) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("id".to_string(), Value::from(config.id.as_str()));
    attributes.insert("profile_name".to_string(), Value::from(config.name.as_str()));
    attributes.insert("oci_url".to_string(), Value::from(config.oci_url.as_str()));
    attributes.insert("plugin_type".to_string(), Value::from(config.plugin_type.as_str()));
    attributes.insert(
        "plugin_config".to_string(),
        Value::String(String::from_utf8_lossy(&config.plugin_config).into_owned()),
    );
    attributes.insert(
        "plugin_config_format".to_string(),
        Value::Int(config.config_format.index()),
    );
    attributes.insert("default".to_string(), Value::Bool(config.default));
    attributes.insert(
        "environment_variables".to_string(),
        attrs::map_value(&config.environment_variables),
    );

    match &config.target_runner {
        Some(RunnerTarget::Id(target)) => {
            attributes.insert("target_runner_id".to_string(), Value::from(target.id.as_str()));
        }
        Some(RunnerTarget::Labels(target)) => {
            attributes.insert(
                "target_runner_labels".to_string(),
                attrs::map_value(&target.labels),
            );
        }
        Some(RunnerTarget::Any(_)) | None => {}
    }

    attributes
}

/// The placeholder written in place of a delete
pub(crate) fn tombstone_runner_profile(id: &str) -> RunnerConfig {
    RunnerConfig {
        id: id.to_string(),
        name: TOMBSTONE.to_string(),
        oci_url: TOMBSTONE.to_string(),
        plugin_type: TOMBSTONE.to_string(),
        ..RunnerConfig::default()
    }
}

fn profile_id(current: &State) -> Option<String> {
    current
        .identifier
        .clone()
        .or_else(|| current.attributes.get("id")?.as_str().map(str::to_string))
        .filter(|id| !id.is_empty())
}

impl WaypointProvider {
    async fn fetch_runner_profile(
        &self,
        id: ResourceId,
        profile_id: &str,
    ) -> ProviderResult<State> {
        let config = match self.api.get_runner_profile(profile_id).await {
            Ok(config) => config,
            Err(e) if e.is_not_found() => return Ok(State::not_found(id)),
            Err(e) => return Err(api_error(&id, e)),
        };
        if config.name == TOMBSTONE {
            log::debug!("runner profile '{}' only exists as a deleted placeholder", profile_id);
            return Ok(State::not_found(id));
        }

        let identifier = config.id.clone();
        Ok(State::existing(id, flatten_runner_profile(&config)).with_identifier(identifier))
    }

    pub(crate) async fn read_runner_profile(
        &self,
        id: ResourceId,
        current: &State,
    ) -> ProviderResult<State> {
        match profile_id(current) {
            Some(profile_id) => self.fetch_runner_profile(id, &profile_id).await,
            None => Ok(State::not_found(id)),
        }
    }

    async fn send_runner_profile(
        &self,
        resource: Resource,
        profile_id: &str,
    ) -> ProviderResult<State> {
        let config = expand_runner_profile(&resource.attributes, profile_id)
            .map_err(|e| ProviderError::new(e).for_resource(resource.id.clone()))?;

        let stored = self
            .api
            .create_runner_profile(&config)
            .await
            .map_err(|e| api_error(&resource.id, e))?;
        if stored.id.is_empty() {
            return Err(ProviderError::new("server returned no runner profile id")
                .for_resource(resource.id));
        }

        self.fetch_runner_profile(resource.id, &stored.id).await
    }

    pub(crate) async fn create_runner_profile(&self, resource: Resource) -> ProviderResult<State> {
        let name = attrs::string(&resource.attributes, "profile_name");
        let state = self.send_runner_profile(resource, "").await?;
        log::trace!("created runner profile '{}'", name);
        Ok(state)
    }

    pub(crate) async fn update_runner_profile(
        &self,
        from: &State,
        to: Resource,
    ) -> ProviderResult<State> {
        let profile_id = profile_id(from).ok_or_else(|| {
            ProviderError::new("runner profile id unknown; refresh the state")
                .for_resource(to.id.clone())
        })?;
        let state = self.send_runner_profile(to, &profile_id).await?;
        log::trace!("updated runner profile '{}'", profile_id);
        Ok(state)
    }

    /// Runner profiles cannot be deleted remotely; overwrite with a placeholder instead
    pub(crate) async fn delete_runner_profile(&self, current: &State) -> ProviderResult<()> {
        let profile_id = profile_id(current).ok_or_else(|| {
            ProviderError::new("runner profile id unknown").for_resource(current.id.clone())
        })?;

        self.api
            .create_runner_profile(&tombstone_runner_profile(&profile_id))
            .await
            .map_err(|e| api_error(&current.id, e))?;
        log::trace!("deleted runner profile '{}'", profile_id);
        Ok(())
    }
}
