//! Configuration file loading
//!
//! The configuration is a subset of Terraform's JSON syntax:
//!
//! ```json
//! { "provider": { "waypoint_addr": "...", "token": "..." },
//!   "resource": { "waypoint_project": { "example": { "project_name": "example" } } },
//!   "data": { "waypoint_runner_profile": { "odr": { "id": "01G..." } } } }
//! ```
//!
//! The provider block may also be nested under its name, as in
//! `{ "provider": { "waypoint": { ... } } }`.

use std::collections::HashMap;
use std::path::Path;

use waypoint_core::provider::ProviderFactory;
use waypoint_core::resource::{Resource, Value, attributes_from_json};
use waypoint_core::schema::ResourceSchema;

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Resource and data source schemas of one provider
pub struct Schemas {
    resources: HashMap<String, ResourceSchema>,
    data_sources: HashMap<String, ResourceSchema>,
}

impl Schemas {
    pub fn from_factory(factory: &dyn ProviderFactory) -> Self {
        Self {
            resources: factory.resource_schemas(),
            data_sources: factory.data_source_schemas(),
        }
    }

    /// Managed resource schemas by type
    pub fn resources(&self) -> &HashMap<String, ResourceSchema> {
        &self.resources
    }

    pub fn get(&self, resource_type: &str, data_source: bool) -> Option<&ResourceSchema> {
        if data_source {
            self.data_sources.get(resource_type)
        } else {
            self.resources.get(resource_type)
        }
    }

    /// Attributes with sensitive values hidden, for display
    pub fn redact(
        &self,
        resource_type: &str,
        data_source: bool,
        attributes: &HashMap<String, Value>,
    ) -> HashMap<String, Value> {
        match self.get(resource_type, data_source) {
            Some(schema) => schema.redact(attributes),
            None => attributes.clone(),
        }
    }
}

/// A parsed configuration file
#[derive(Debug, Default)]
pub struct Configuration {
    pub provider: HashMap<String, Value>,
    /// Managed resources followed by data sources, each sorted by id
    pub resources: Vec<Resource>,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let json: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))?;
        let root = json
            .as_object()
            .ok_or("Parse error: configuration must be a JSON object")?;

        if let Some(key) = root
            .keys()
            .find(|k| !matches!(k.as_str(), "provider" | "resource" | "data"))
        {
            return Err(format!("Parse error: unknown top-level key '{}'", key));
        }

        let provider = match root.get("provider") {
            Some(value) => provider_block(value)?,
            None => HashMap::new(),
        };

        let mut resources = named_blocks(root.get("resource"), "resource", false)?;
        resources.extend(named_blocks(root.get("data"), "data", true)?);

        Ok(Self {
            provider,
            resources,
        })
    }

    /// Normalize, default and validate every resource and data source
    ///
    /// All errors are collected and returned as one message, one line each.
    pub fn prepare(&mut self, schemas: &Schemas) -> Result<(), String> {
        let mut all_errors = Vec::new();

        for resource in &mut self.resources {
            let kind = if resource.read_only {
                "data source"
            } else {
                "resource type"
            };
            let Some(schema) = schemas.get(&resource.id.resource_type, resource.read_only) else {
                all_errors.push(format!(
                    "{}: unknown {} '{}'",
                    resource.id, kind, resource.id.resource_type
                ));
                continue;
            };

            schema.normalize(&mut resource.attributes);
            schema.apply_defaults(&mut resource.attributes);
            if let Err(errors) = schema.validate(&resource.attributes) {
                for error in errors {
                    all_errors.push(format!("{}: {}", resource.id, error));
                }
            }
        }

        if all_errors.is_empty() {
            Ok(())
        } else {
            Err(all_errors.join("\n"))
        }
    }

    /// Provider configuration with environment defaults applied, validated
    pub fn provider_config(
        &self,
        factory: &dyn ProviderFactory,
    ) -> Result<HashMap<String, Value>, String> {
        let schema = factory.config_schema();
        let mut config = self.provider.clone();
        schema.normalize(&mut config);
        schema.apply_defaults(&mut config);

        schema.validate(&config).map_err(|errors| {
            errors
                .iter()
                .map(|e| format!("provider.{}: {}", factory.name(), e))
                .collect::<Vec<_>>()
                .join("\n")
        })?;
        Ok(config)
    }
}

fn provider_block(value: &serde_json::Value) -> Result<HashMap<String, Value>, String> {
    let object = value
        .as_object()
        .ok_or("Parse error: provider must be an object")?;

    match object.get("waypoint") {
        Some(serde_json::Value::Object(inner)) if object.len() == 1 => {
            Ok(attributes_from_json(inner))
        }
        _ => Ok(attributes_from_json(object)),
    }
}

fn as_object<'a>(value: &'a serde_json::Value, path: &str) -> Result<&'a JsonObject, String> {
    value
        .as_object()
        .ok_or_else(|| format!("Parse error: {} must be an object", path))
}

/// Read a `{ type: { name: { attributes } } }` section
fn named_blocks(
    section: Option<&serde_json::Value>,
    label: &str,
    read_only: bool,
) -> Result<Vec<Resource>, String> {
    let Some(section) = section else {
        return Ok(Vec::new());
    };

    let mut resources = Vec::new();
    for (resource_type, named) in as_object(section, label)? {
        let path = format!("{}.{}", label, resource_type);
        for (name, body) in as_object(named, &path)? {
            let body = as_object(body, &format!("{}.{}", path, name))?;
            resources.push(
                Resource::new(resource_type.as_str(), name.as_str())
                    .with_attributes(attributes_from_json(body))
                    .with_read_only(read_only),
            );
        }
    }
    resources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_provider::WaypointProviderFactory;

    const EXAMPLE: &str = r#"{
        "provider": { "waypoint": { "waypoint_addr": "localhost:9701", "token": "t0k3n" } },
        "resource": {
            "waypoint_project": {
                "example": {
                    "project_name": "example",
                    "remote_runners_enabled": true,
                    "data_source_git": { "git_url": "https://github.com/hashicorp/waypoint" }
                }
            }
        },
        "data": {
            "waypoint_runner_profile": { "odr": { "id": "01GABC" } }
        }
    }"#;

    #[test]
    fn parse_resources_and_data_sources() {
        let config = Configuration::parse(EXAMPLE).unwrap();

        assert_eq!(config.provider["token"], Value::from("t0k3n"));
        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.resources[0].id.to_string(), "waypoint_project.example");
        assert!(!config.resources[0].read_only);
        assert_eq!(config.resources[1].id.resource_type, "waypoint_runner_profile");
        assert!(config.resources[1].read_only);
    }

    #[test]
    fn parse_rejects_unknown_top_level_key() {
        let err = Configuration::parse(r#"{"module": {}}"#).unwrap_err();
        assert_eq!(err, "Parse error: unknown top-level key 'module'");
    }

    #[test]
    fn parse_rejects_non_object_body() {
        let err = Configuration::parse(r#"{"resource": {"waypoint_project": {"x": 1}}}"#)
            .unwrap_err();
        assert_eq!(err, "Parse error: resource.waypoint_project.x must be an object");
    }

    #[test]
    fn prepare_wraps_single_blocks() {
        let mut config = Configuration::parse(EXAMPLE).unwrap();
        let schemas = Schemas::from_factory(&WaypointProviderFactory);
        config.prepare(&schemas).unwrap();

        let git = config.resources[0].attributes["data_source_git"]
            .as_list()
            .unwrap();
        assert_eq!(git.len(), 1);
    }

    #[test]
    fn prepare_reports_every_error() {
        let mut config = Configuration::parse(
            r#"{
                "resource": {
                    "waypoint_project": { "a": { "project_name": "a" } },
                    "waypoint_widget": { "b": {} }
                }
            }"#,
        )
        .unwrap();
        let schemas = Schemas::from_factory(&WaypointProviderFactory);

        let err = config.prepare(&schemas).unwrap_err();
        let lines: Vec<&str> = err.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("waypoint_project.a: "));
        assert!(lines[0].contains("data_source_git"));
        assert_eq!(
            lines[1],
            "waypoint_widget.b: unknown resource type 'waypoint_widget'"
        );
    }

    #[test]
    fn provider_config_rejects_unknown_attribute() {
        let config = Configuration::parse(r#"{"provider": {"region": "eu"}}"#).unwrap();
        let err = config.provider_config(&WaypointProviderFactory).unwrap_err();
        assert!(err.starts_with("provider.waypoint: "));
        assert!(err.contains("region"));
    }
}
