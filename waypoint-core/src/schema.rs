//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type, data source and for the
//! provider configuration itself. Schemas drive validation of configuration,
//! environment defaults, redaction of sensitive values, and the JSON schema
//! document exposed to consumers.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde_json::json;

use crate::resource::Value;

/// Placeholder shown in place of sensitive values
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive)";

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested block, held as a list of attribute maps
    Block(Box<BlockSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(block), Value::List(items)) => block.validate_items(items),

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }

    /// Terraform type expression (`"string"`, `["list", "string"]`, ...)
    fn terraform_type(&self) -> serde_json::Value {
        match self {
            AttributeType::String | AttributeType::Enum(_) => json!("string"),
            AttributeType::Int => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::Custom { base, .. } => base.terraform_type(),
            AttributeType::List(inner) => json!(["list", inner.terraform_type()]),
            AttributeType::Map(inner) => json!(["map", inner.terraform_type()]),
            AttributeType::Block(block) => {
                let fields: serde_json::Map<String, serde_json::Value> = block
                    .sorted_attributes()
                    .map(|a| (a.name.clone(), a.attr_type.terraform_type()))
                    .collect();
                json!(["list", ["object", fields]])
            }
        }
    }

    /// Parse a raw string (e.g., from an environment variable) into a value of this type
    fn parse_raw(&self, raw: &str) -> Option<Value> {
        match self {
            AttributeType::String | AttributeType::Enum(_) => Some(Value::String(raw.to_string())),
            AttributeType::Int => raw.trim().parse().ok().map(Value::Int),
            AttributeType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Some(Value::Bool(true)),
                "0" | "false" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            AttributeType::Custom { base, .. } => base.parse_raw(raw),
            AttributeType::List(_) | AttributeType::Map(_) | AttributeType::Block(_) => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("Attribute '{name}' conflicts with '{other}'")]
    Conflict { name: String, other: String },

    #[error("Block '{name}' allows at most {max} item(s), got {got}")]
    TooManyItems { name: String, max: usize, got: usize },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("Block item at index {index}: {inner}")]
    BlockError { index: usize, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub conflicts_with: Vec<String>,
    /// Environment variable consulted when the attribute is absent
    pub env_default: Option<String>,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
            conflicts_with: Vec::new(),
            env_default: None,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Mark as computed-only: set by the provider, never by configuration
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.required = false;
        self.optional = false;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn conflicts_with(mut self, other: impl Into<String>) -> Self {
        self.conflicts_with.push(other.into());
        self
    }

    pub fn with_env_default(mut self, var: impl Into<String>) -> Self {
        self.env_default = Some(var.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set by the provider only, never from configuration
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    fn to_json(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert("type".to_string(), self.attr_type.terraform_type());
        if let Some(desc) = &self.description {
            doc.insert("description".to_string(), json!(desc));
        }
        if self.required {
            doc.insert("required".to_string(), json!(true));
        }
        if self.optional {
            doc.insert("optional".to_string(), json!(true));
        }
        if self.computed {
            doc.insert("computed".to_string(), json!(true));
        }
        if self.sensitive {
            doc.insert("sensitive".to_string(), json!(true));
        }
        serde_json::Value::Object(doc)
    }
}

/// Schema of a nested block
#[derive(Debug, Clone, Default)]
pub struct BlockSchema {
    pub attributes: HashMap<String, AttributeSchema>,
    pub max_items: Option<usize>,
}

impl BlockSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    fn sorted_attributes(&self) -> impl Iterator<Item = &AttributeSchema> {
        let mut attrs: Vec<&AttributeSchema> = self.attributes.values().collect();
        attrs.sort_by(|a, b| a.name.cmp(&b.name));
        attrs.into_iter()
    }

    fn validate_items(&self, items: &[Value]) -> Result<(), TypeError> {
        for (index, item) in items.iter().enumerate() {
            let Value::Map(map) = item else {
                return Err(TypeError::BlockError {
                    index,
                    inner: Box::new(TypeError::TypeMismatch {
                        expected: "Map".to_string(),
                        got: item.type_name(),
                    }),
                });
            };
            if let Some(first) = validate_attributes(&self.attributes, map).into_iter().next() {
                return Err(TypeError::BlockError {
                    index,
                    inner: Box::new(first),
                });
            }
        }
        Ok(())
    }

    /// Terraform nested block document (`{"attributes": ..., "block_types": ...}`)
    fn to_json(&self) -> serde_json::Value {
        let mut attributes = serde_json::Map::new();
        let mut block_types = serde_json::Map::new();

        for attr in self.sorted_attributes() {
            match &attr.attr_type {
                AttributeType::Block(block) => {
                    let mut nested = serde_json::Map::new();
                    nested.insert("nesting_mode".to_string(), json!("list"));
                    nested.insert("block".to_string(), block.to_json());
                    if let Some(max) = block.max_items {
                        nested.insert("max_items".to_string(), json!(max));
                    }
                    if attr.required {
                        nested.insert("min_items".to_string(), json!(1));
                    }
                    // Computed or sensitive blocks have no block_types form
                    if attr.computed || attr.sensitive {
                        attributes.insert(attr.name.clone(), attr.to_json());
                    } else {
                        block_types.insert(attr.name.clone(), serde_json::Value::Object(nested));
                    }
                }
                _ => {
                    attributes.insert(attr.name.clone(), attr.to_json());
                }
            }
        }

        let mut doc = serde_json::Map::new();
        doc.insert("attributes".to_string(), serde_json::Value::Object(attributes));
        if !block_types.is_empty() {
            doc.insert("block_types".to_string(), serde_json::Value::Object(block_types));
        }
        serde_json::Value::Object(doc)
    }
}

/// Validate an attribute map against a set of attribute schemas
fn validate_attributes(
    schemas: &HashMap<String, AttributeSchema>,
    attributes: &HashMap<String, Value>,
) -> Vec<TypeError> {
    let mut errors = Vec::new();

    let mut names: Vec<&String> = schemas.keys().collect();
    names.sort();

    // Check required attributes
    for name in &names {
        let schema = &schemas[*name];
        if schema.required && !attributes.contains_key(*name) && schema.default.is_none() {
            errors.push(TypeError::MissingRequired {
                name: (*name).clone(),
            });
        }
    }

    let mut keys: Vec<&String> = attributes.keys().collect();
    keys.sort();

    // Type check each attribute
    for name in &keys {
        let value = &attributes[*name];
        let Some(schema) = schemas.get(*name) else {
            errors.push(TypeError::UnknownAttribute {
                name: (*name).clone(),
            });
            continue;
        };

        if schema.is_computed_only() {
            errors.push(TypeError::ComputedOnly {
                name: (*name).clone(),
            });
            continue;
        }

        // A required block needs at least one item
        if schema.required
            && matches!(schema.attr_type, AttributeType::Block(_))
            && value.is_empty()
        {
            errors.push(TypeError::MissingRequired {
                name: (*name).clone(),
            });
            continue;
        }

        if let AttributeType::Block(block) = &schema.attr_type
            && let (Some(max), Value::List(items)) = (block.max_items, value)
            && items.len() > max
        {
            errors.push(TypeError::TooManyItems {
                name: (*name).clone(),
                max,
                got: items.len(),
            });
            continue;
        }

        if let Err(e) = schema.attr_type.validate(value) {
            errors.push(TypeError::AttributeError {
                name: (*name).clone(),
                inner: Box::new(e),
            });
        }
    }

    // Conflicting attributes, each pair reported once
    let mut reported = BTreeSet::new();
    for name in &keys {
        let Some(schema) = schemas.get(*name) else {
            continue;
        };
        if attributes[*name].is_empty() {
            continue;
        }
        for other in &schema.conflicts_with {
            let set = attributes.get(other).is_some_and(|v| !v.is_empty());
            let pair = if *name < other {
                ((*name).clone(), other.clone())
            } else {
                (other.clone(), (*name).clone())
            };
            if set && reported.insert(pair.clone()) {
                errors.push(TypeError::Conflict {
                    name: pair.0,
                    other: pair.1,
                });
            }
        }
    }

    errors
}

fn redact_attributes(
    schemas: &HashMap<String, AttributeSchema>,
    attributes: &HashMap<String, Value>,
) -> HashMap<String, Value> {
    attributes
        .iter()
        .map(|(name, value)| {
            let redacted = match schemas.get(name) {
                Some(schema) if schema.sensitive => {
                    Value::String(SENSITIVE_PLACEHOLDER.to_string())
                }
                Some(AttributeSchema {
                    attr_type: AttributeType::Block(block),
                    ..
                }) => match value {
                    Value::List(items) => Value::List(
                        items
                            .iter()
                            .map(|item| match item {
                                Value::Map(map) => {
                                    Value::Map(redact_attributes(&block.attributes, map))
                                }
                                other => other.clone(),
                            })
                            .collect(),
                    ),
                    other => other.clone(),
                },
                _ => value.clone(),
            };
            (name.clone(), redacted)
        })
        .collect()
}

fn normalize_attributes(
    schemas: &HashMap<String, AttributeSchema>,
    attributes: &mut HashMap<String, Value>,
) {
    for (name, value) in attributes.iter_mut() {
        let Some(AttributeSchema {
            attr_type: AttributeType::Block(block),
            ..
        }) = schemas.get(name)
        else {
            continue;
        };

        if let Value::Map(map) = value {
            *value = Value::List(vec![Value::Map(std::mem::take(map))]);
        }
        if let Value::List(items) = value {
            for item in items.iter_mut() {
                if let Value::Map(map) = item {
                    normalize_attributes(&block.attributes, map);
                }
            }
        }
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
    pub version: u64,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
            version: 0,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let errors = validate_attributes(&self.attributes, attributes);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill absent attributes from their environment variable, then their default
    pub fn apply_defaults(&self, attributes: &mut HashMap<String, Value>) {
        for (name, schema) in &self.attributes {
            if attributes.contains_key(name) {
                continue;
            }

            let from_env = schema
                .env_default
                .as_ref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|raw| !raw.is_empty())
                .and_then(|raw| schema.attr_type.parse_raw(&raw));

            if let Some(value) = from_env.or_else(|| schema.default.clone()) {
                attributes.insert(name.clone(), value);
            }
        }
    }

    /// Wrap block values written as a single object into a one-element list
    pub fn normalize(&self, attributes: &mut HashMap<String, Value>) {
        normalize_attributes(&self.attributes, attributes);
    }

    /// Copy of the attributes with sensitive values replaced by a placeholder
    pub fn redact(&self, attributes: &HashMap<String, Value>) -> HashMap<String, Value> {
        redact_attributes(&self.attributes, attributes)
    }

    /// Terraform-style schema document for this resource
    pub fn to_json(&self) -> serde_json::Value {
        let block = BlockSchema {
            attributes: self.attributes.clone(),
            max_items: None,
        };
        let mut block_doc = block.to_json();
        if let (Some(desc), serde_json::Value::Object(map)) = (&self.description, &mut block_doc)
        {
            map.insert("description".to_string(), json!(desc));
        }
        json!({
            "version": self.version,
            "block": block_doc,
        })
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Integer greater than or equal to zero
    pub fn non_negative_int() -> AttributeType {
        AttributeType::Custom {
            name: "NonNegativeInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| match value {
                Value::Int(n) if *n >= 0 => Ok(()),
                Value::Int(_) => Err("Value must not be negative".to_string()),
                _ => Err("Expected integer".to_string()),
            },
        }
    }

    pub fn string_list() -> AttributeType {
        AttributeType::List(Box::new(AttributeType::String))
    }

    pub fn string_map() -> AttributeType {
        AttributeType::Map(Box::new(AttributeType::String))
    }

    pub fn block(block: BlockSchema) -> AttributeType {
        AttributeType::Block(Box::new(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_schema() -> ResourceSchema {
        ResourceSchema::new("waypoint_project")
            .attribute(AttributeSchema::new("project_name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new(
                    "git_auth_basic",
                    types::block(
                        BlockSchema::new()
                            .attribute(
                                AttributeSchema::new("username", AttributeType::String).required(),
                            )
                            .attribute(
                                AttributeSchema::new("password", AttributeType::String)
                                    .required()
                                    .sensitive(),
                            )
                            .max_items(1),
                    ),
                )
                .conflicts_with("git_auth_ssh"),
            )
            .attribute(
                AttributeSchema::new(
                    "git_auth_ssh",
                    types::block(
                        BlockSchema::new()
                            .attribute(
                                AttributeSchema::new("git_user", AttributeType::String).required(),
                            )
                            .max_items(1),
                    ),
                )
                .conflicts_with("git_auth_basic"),
            )
            .attribute(
                AttributeSchema::new(
                    "applications",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .computed(),
            )
    }

    fn basic_block(username: &str, password: &str) -> Value {
        let mut map = HashMap::new();
        map.insert("username".to_string(), Value::from(username));
        map.insert("password".to_string(), Value::from(password));
        Value::List(vec![Value::Map(map)])
    }

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_enum_type() {
        let t = AttributeType::Enum(vec!["a".to_string(), "b".to_string()]);
        assert!(t.validate(&Value::String("a".to_string())).is_ok());
        assert!(t.validate(&Value::String("c".to_string())).is_err());
    }

    #[test]
    fn validate_non_negative_int() {
        let t = types::non_negative_int();
        assert!(t.validate(&Value::Int(0)).is_ok());
        assert!(t.validate(&Value::Int(90)).is_ok());
        assert!(t.validate(&Value::Int(-1)).is_err());
        assert!(t.validate(&Value::from("90")).is_err());
    }

    #[test]
    fn missing_required_attribute() {
        let schema = auth_schema();
        let errors = schema.validate(&HashMap::new()).unwrap_err();
        assert!(matches!(
            &errors[0],
            TypeError::MissingRequired { name } if name == "project_name"
        ));
    }

    #[test]
    fn unknown_and_computed_attributes_are_rejected() {
        let schema = auth_schema();
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("demo"));
        attrs.insert("bogus".to_string(), Value::Bool(true));
        attrs.insert("applications".to_string(), Value::List(vec![]));

        let errors = schema.validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, TypeError::ComputedOnly { .. })));
        assert!(errors.iter().any(|e| matches!(e, TypeError::UnknownAttribute { .. })));
    }

    #[test]
    fn conflicting_blocks_reported_once() {
        let schema = auth_schema();
        let mut ssh = HashMap::new();
        ssh.insert("git_user".to_string(), Value::from("git"));

        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("demo"));
        attrs.insert("git_auth_basic".to_string(), basic_block("u", "p"));
        attrs.insert(
            "git_auth_ssh".to_string(),
            Value::List(vec![Value::Map(ssh)]),
        );

        let errors = schema.validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            TypeError::Conflict { name, other }
                if name == "git_auth_basic" && other == "git_auth_ssh"
        ));
    }

    #[test]
    fn empty_block_does_not_conflict() {
        let schema = auth_schema();
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("demo"));
        attrs.insert("git_auth_basic".to_string(), basic_block("u", "p"));
        attrs.insert("git_auth_ssh".to_string(), Value::List(vec![]));

        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn block_max_items_enforced() {
        let schema = auth_schema();
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("demo"));
        let Value::List(mut items) = basic_block("a", "b") else {
            unreachable!()
        };
        items.extend(match basic_block("c", "d") {
            Value::List(more) => more,
            _ => unreachable!(),
        });
        attrs.insert("git_auth_basic".to_string(), Value::List(items));

        let errors = schema.validate(&attrs).unwrap_err();
        assert!(matches!(
            &errors[0],
            TypeError::TooManyItems { max: 1, got: 2, .. }
        ));
    }

    #[test]
    fn required_block_with_no_items_is_missing() {
        let schema = ResourceSchema::new("waypoint_project").attribute(
            AttributeSchema::new(
                "data_source_git",
                types::block(
                    BlockSchema::new()
                        .attribute(AttributeSchema::new("git_url", AttributeType::String))
                        .max_items(1),
                ),
            )
            .required(),
        );
        let mut attrs = HashMap::new();
        attrs.insert("data_source_git".to_string(), Value::List(vec![]));

        let errors = schema.validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            TypeError::MissingRequired { name } if name == "data_source_git"
        ));
    }

    #[test]
    fn block_missing_nested_required() {
        let schema = auth_schema();
        let mut block = HashMap::new();
        block.insert("username".to_string(), Value::from("u"));

        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("demo"));
        attrs.insert(
            "git_auth_basic".to_string(),
            Value::List(vec![Value::Map(block)]),
        );

        let errors = schema.validate(&attrs).unwrap_err();
        assert!(errors[0].to_string().contains("password"));
    }

    #[test]
    fn normalize_wraps_single_block_object() {
        let schema = auth_schema();
        let mut block = HashMap::new();
        block.insert("username".to_string(), Value::from("u"));
        block.insert("password".to_string(), Value::from("p"));

        let mut attrs = HashMap::new();
        attrs.insert("git_auth_basic".to_string(), Value::Map(block));
        schema.normalize(&mut attrs);

        assert_eq!(attrs["git_auth_basic"], basic_block("u", "p"));
    }

    #[test]
    fn redact_hides_nested_sensitive_values() {
        let schema = auth_schema();
        let mut attrs = HashMap::new();
        attrs.insert("git_auth_basic".to_string(), basic_block("u", "hunter2"));

        let redacted = schema.redact(&attrs);
        assert_eq!(redacted["git_auth_basic"], basic_block("u", SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn apply_defaults_uses_declared_default() {
        let schema = ResourceSchema::new("provider").attribute(
            AttributeSchema::new("tls_skip_verify", AttributeType::Bool)
                .with_env_default("WAYPOINT_CORE_TEST_UNSET_VARIABLE")
                .with_default(Value::Bool(false)),
        );
        let mut attrs = HashMap::new();
        schema.apply_defaults(&mut attrs);
        assert_eq!(attrs.get("tls_skip_verify"), Some(&Value::Bool(false)));
    }

    #[test]
    fn parse_raw_bool_and_int() {
        assert_eq!(AttributeType::Bool.parse_raw("TRUE"), Some(Value::Bool(true)));
        assert_eq!(AttributeType::Bool.parse_raw("0"), Some(Value::Bool(false)));
        assert_eq!(AttributeType::Int.parse_raw(" 42 "), Some(Value::Int(42)));
        assert_eq!(AttributeType::Int.parse_raw("x"), None);
    }

    #[test]
    fn schema_json_separates_blocks_from_attributes() {
        let doc = auth_schema().to_json();
        let block = &doc["block"];

        assert_eq!(block["attributes"]["project_name"]["type"], "string");
        assert_eq!(block["attributes"]["project_name"]["required"], true);
        assert_eq!(block["attributes"]["applications"]["computed"], true);
        assert_eq!(block["block_types"]["git_auth_basic"]["nesting_mode"], "list");
        assert_eq!(block["block_types"]["git_auth_basic"]["max_items"], 1);
        assert_eq!(
            block["block_types"]["git_auth_basic"]["block"]["attributes"]["password"]["sensitive"],
            true
        );
    }
}
