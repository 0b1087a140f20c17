//! Waypoint schema definitions

pub mod auth_method_oidc;
pub mod project;
pub mod runner_profile;

use std::collections::HashMap;

use waypoint_core::resource::Value;
use waypoint_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Returns the provider configuration schema
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new("waypoint")
        .with_description("Waypoint server connection")
        .attribute(
            AttributeSchema::new("waypoint_addr", AttributeType::String)
                .with_env_default("WAYPOINT_ADDR")
                .with_description("Address of the Waypoint server, e.g. localhost:9701"),
        )
        .attribute(
            AttributeSchema::new("token", AttributeType::String)
                .sensitive()
                .with_env_default("WAYPOINT_TOKEN")
                .with_description("Token used to authenticate with the Waypoint server"),
        )
        .attribute(
            AttributeSchema::new("tls_skip_verify", AttributeType::Bool)
                .with_env_default("WAYPOINT_TLS_SKIP_VERIFY")
                .with_default(Value::Bool(false))
                .with_description("Accept self-signed server certificates"),
        )
}

/// Returns all managed resource schemas keyed by type name
pub fn resource_schemas() -> HashMap<String, ResourceSchema> {
    [
        project::resource_schema(),
        runner_profile::resource_schema(),
        auth_method_oidc::resource_schema(),
    ]
    .into_iter()
    .map(|schema| (schema.resource_type.clone(), schema))
    .collect()
}

/// Returns all data source schemas keyed by type name
pub fn data_source_schemas() -> HashMap<String, ResourceSchema> {
    [
        project::data_source_schema(),
        runner_profile::data_source_schema(),
        auth_method_oidc::data_source_schema(),
    ]
    .into_iter()
    .map(|schema| (schema.resource_type.clone(), schema))
    .collect()
}

/// Read-only copy of a resource schema: `key` is the only required input,
/// everything else is computed.
pub(crate) fn data_source_mirror(resource: ResourceSchema, key: &str) -> ResourceSchema {
    let mut schema = ResourceSchema::new(resource.resource_type.clone());
    if let Some(desc) = &resource.description {
        schema = schema.with_description(desc.clone());
    }

    for (name, attr) in resource.attributes {
        let attr = if name == key {
            AttributeSchema {
                required: true,
                optional: false,
                computed: false,
                conflicts_with: Vec::new(),
                ..attr
            }
        } else {
            AttributeSchema {
                conflicts_with: Vec::new(),
                ..attr
            }
            .computed()
        };
        schema = schema.attribute(attr);
    }
    schema
}
