//! waypoint_runner_profile schema definitions

use waypoint_core::resource::Value;
use waypoint_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::data_source_mirror;

pub const RESOURCE_TYPE: &str = "waypoint_runner_profile";

/// Plugin configuration format: 0 for HCL, 1 for JSON
fn config_format() -> AttributeType {
    AttributeType::Custom {
        name: "ConfigFormat".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(0 | 1) => Ok(()),
            Value::Int(n) => Err(format!("must be 0 (HCL) or 1 (JSON), got {}", n)),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// Returns the schema for the runner profile resource
pub fn resource_schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("An on-demand runner profile")
        .attribute(
            AttributeSchema::new("id", AttributeType::String)
                .computed()
                .with_description("Server-assigned id of the profile"),
        )
        .attribute(AttributeSchema::new("profile_name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("oci_url", AttributeType::String)
                .with_description("OCI image of the on-demand runner"),
        )
        .attribute(
            AttributeSchema::new("plugin_type", AttributeType::String)
                .with_description("Platform plugin the runner launches on, such as docker"),
        )
        .attribute(AttributeSchema::new("plugin_config", AttributeType::String))
        .attribute(
            AttributeSchema::new("plugin_config_format", config_format())
                .with_description("Format of plugin_config: 0 for HCL, 1 for JSON"),
        )
        .attribute(
            AttributeSchema::new("default", AttributeType::Bool)
                .with_description("Use this profile when a project names none"),
        )
        .attribute(
            AttributeSchema::new("target_runner_id", AttributeType::String)
                .conflicts_with("target_runner_labels"),
        )
        .attribute(
            AttributeSchema::new("target_runner_labels", types::string_map())
                .conflicts_with("target_runner_id"),
        )
        .attribute(
            AttributeSchema::new("environment_variables", types::string_map())
                .with_description("Environment variables set on the runner"),
        )
}

/// Returns the schema for the runner profile data source, looked up by id
pub fn data_source_schema() -> ResourceSchema {
    data_source_mirror(resource_schema(), "id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use waypoint_core::schema::TypeError;

    #[test]
    fn invalid_config_format() {
        let mut attrs = HashMap::new();
        attrs.insert("profile_name".to_string(), Value::from("docker"));
        attrs.insert("plugin_config_format".to_string(), Value::Int(2));

        assert!(resource_schema().validate(&attrs).is_err());
    }

    #[test]
    fn target_runner_id_conflicts_with_labels() {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), Value::from("payments"));

        let mut attrs = HashMap::new();
        attrs.insert("profile_name".to_string(), Value::from("docker"));
        attrs.insert("target_runner_id".to_string(), Value::from("01GRUNNER"));
        attrs.insert("target_runner_labels".to_string(), Value::Map(labels));

        let errors = resource_schema().validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], TypeError::Conflict { .. }));
    }

    #[test]
    fn id_cannot_be_configured_on_resource() {
        let mut attrs = HashMap::new();
        attrs.insert("profile_name".to_string(), Value::from("docker"));
        attrs.insert("id".to_string(), Value::from("01GABC"));

        assert!(resource_schema().validate(&attrs).is_err());
    }

    #[test]
    fn data_source_is_looked_up_by_id() {
        let schema = data_source_schema();
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), Value::from("01GABC"));
        assert!(schema.validate(&attrs).is_ok());
        assert!(schema.attributes["profile_name"].computed);
    }
}
