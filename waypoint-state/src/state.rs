//! State file structures for persisting managed resources

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use waypoint_core::resource::{ResourceId, State, Value, attributes_from_json};

/// The state file persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Monotonically increasing number for each state modification
    pub serial: u64,
    /// Unique identifier for this state lineage (prevents accidental overwrites)
    pub lineage: String,
    /// Version of the provider that last modified this state
    pub provider_version: String,
    /// All managed resources and their last known state
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    /// Current state file format version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new empty state file
    pub fn new() -> Self {
        Self::with_lineage(uuid::Uuid::new_v4().to_string())
    }

    /// Create a new state file with a specific lineage
    pub fn with_lineage(lineage: String) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage,
            provider_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Increment serial and update the provider version for a new state write
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.provider_version = env!("CARGO_PKG_VERSION").to_string();
    }

    /// Find a resource by type and name
    pub fn find_resource(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    /// Add or replace a resource, keeping resources sorted by type and name
    pub fn upsert_resource(&mut self, resource: ResourceState) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.resource_type == resource.resource_type && r.name == resource.name)
        {
            Some(existing) => *existing = resource,
            None => {
                self.resources.push(resource);
                self.resources.sort_by(|a, b| {
                    (a.resource_type.as_str(), a.name.as_str())
                        .cmp(&(b.resource_type.as_str(), b.name.as_str()))
                });
            }
        }
    }

    /// Remove a resource from the state
    pub fn remove_resource(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        let pos = self
            .resources
            .iter()
            .position(|r| r.resource_type == resource_type && r.name == name)?;
        Some(self.resources.remove(pos))
    }

    /// Record the outcome of an operation: existing states are upserted,
    /// missing ones removed
    pub fn record(&mut self, state: &State) {
        if state.exists {
            self.upsert_resource(ResourceState::from_state(state));
        } else {
            self.remove_resource(&state.id.resource_type, &state.id.name);
        }
    }

    /// All recorded resources as provider states
    pub fn current_states(&self) -> HashMap<ResourceId, State> {
        self.resources
            .iter()
            .map(|r| {
                let state = r.to_state();
                (state.id.clone(), state)
            })
            .collect()
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a single managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type (e.g., "waypoint_project")
    pub resource_type: String,
    /// Resource name from the configuration
    pub name: String,
    /// Remote identifier (project name, runner profile id, auth method name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// All attributes of the resource as JSON values
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            identifier: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Set an attribute value
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn from_state(state: &State) -> Self {
        let attributes = match Value::Map(state.attributes.clone()).to_json() {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            resource_type: state.id.resource_type.clone(),
            name: state.id.name.clone(),
            identifier: state.identifier.clone(),
            attributes,
        }
    }

    pub fn to_state(&self) -> State {
        let id = ResourceId::new(&self.resource_type, &self.name);
        let state = State::existing(id, attributes_from_json(&self.attributes));
        match &self.identifier {
            Some(identifier) => state.with_identifier(identifier.clone()),
            None => state,
        }
    }
}
