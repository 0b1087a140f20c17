//! waypoint_project schema definitions

use waypoint_core::schema::{AttributeSchema, AttributeType, BlockSchema, ResourceSchema, types};

use super::data_source_mirror;

pub const RESOURCE_TYPE: &str = "waypoint_project";

fn data_source_git_block() -> BlockSchema {
    BlockSchema::new()
        .attribute(
            AttributeSchema::new("git_url", AttributeType::String)
                .with_description("URL of the Git repository to clone"),
        )
        .attribute(
            AttributeSchema::new("git_path", AttributeType::String)
                .with_description("Path in the repository holding waypoint.hcl"),
        )
        .attribute(
            AttributeSchema::new("git_ref", AttributeType::String)
                .with_description("Git ref to check out: a branch, tag or commit"),
        )
        .attribute(
            AttributeSchema::new("ignore_changes_outside_path", AttributeType::Bool)
                .with_description("Only trigger on changes below git_path"),
        )
        .attribute(
            AttributeSchema::new("git_poll_interval_seconds", types::non_negative_int())
                .with_description("Poll the repository every N seconds; 0 disables polling"),
        )
        .attribute(
            AttributeSchema::new("file_change_signal", AttributeType::String)
                .with_description("Signal sent to the application when a file changes"),
        )
        .max_items(1)
}

fn git_auth_basic_block() -> BlockSchema {
    BlockSchema::new()
        .attribute(AttributeSchema::new("username", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("password", AttributeType::String)
                .required()
                .sensitive(),
        )
        .max_items(1)
}

fn git_auth_ssh_block() -> BlockSchema {
    BlockSchema::new()
        .attribute(
            AttributeSchema::new("git_user", AttributeType::String)
                .required()
                .with_description("Username used for the SSH connection"),
        )
        .attribute(
            AttributeSchema::new("passphrase", AttributeType::String)
                .sensitive()
                .with_description("Passphrase of the private key"),
        )
        .attribute(
            AttributeSchema::new("ssh_private_key", AttributeType::String)
                .required()
                .sensitive()
                .with_description("PEM encoded private key"),
        )
        .max_items(1)
}

fn applications_type() -> AttributeType {
    types::block(
        BlockSchema::new().attribute(AttributeSchema::new("name", AttributeType::String)),
    )
}

/// Returns the schema for the project resource
pub fn resource_schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("A Waypoint project sourced from Git")
        .attribute(
            AttributeSchema::new("project_name", AttributeType::String)
                .required()
                .with_description("Name of the project"),
        )
        .attribute(
            AttributeSchema::new("project_variables", types::string_map())
                .with_description("String variables set on the server for this project"),
        )
        .attribute(
            AttributeSchema::new("data_source_git", types::block(data_source_git_block()))
                .required()
                .with_description("Git repository the project is built from"),
        )
        .attribute(
            AttributeSchema::new("remote_runners_enabled", AttributeType::Bool)
                .with_description("Run operations on remote runners"),
        )
        .attribute(
            AttributeSchema::new("app_status_poll_seconds", types::non_negative_int())
                .with_description("Poll application status every N seconds; 0 disables polling"),
        )
        .attribute(
            AttributeSchema::new("git_auth_basic", types::block(git_auth_basic_block()))
                .conflicts_with("git_auth_ssh")
                .with_description("Username and password for the Git repository"),
        )
        .attribute(
            AttributeSchema::new("git_auth_ssh", types::block(git_auth_ssh_block()))
                .conflicts_with("git_auth_basic")
                .with_description("SSH credentials for the Git repository"),
        )
        .attribute(
            AttributeSchema::new("applications", applications_type())
                .computed()
                .with_description("Applications defined in the project"),
        )
}

/// Returns the schema for the project data source
///
/// Variables are exposed as a list of `{name, value}` objects.
pub fn data_source_schema() -> ResourceSchema {
    let variables = types::block(
        BlockSchema::new()
            .attribute(AttributeSchema::new("name", AttributeType::String))
            .attribute(AttributeSchema::new("value", AttributeType::String)),
    );

    data_source_mirror(resource_schema(), "project_name")
        .attribute(AttributeSchema::new("project_variables", variables).computed())
        .attribute(
            AttributeSchema::new("git_auth_basic", types::block(git_auth_basic_block()))
                .computed()
                .sensitive(),
        )
        .attribute(
            AttributeSchema::new("git_auth_ssh", types::block(git_auth_ssh_block()))
                .computed()
                .sensitive(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use waypoint_core::resource::Value;
    use waypoint_core::schema::TypeError;

    fn git(url: &str) -> Value {
        let mut item = HashMap::new();
        item.insert("git_url".to_string(), Value::from(url));
        item.insert("git_poll_interval_seconds".to_string(), Value::Int(60));
        Value::List(vec![Value::Map(item)])
    }

    fn basic_auth() -> Value {
        let mut item = HashMap::new();
        item.insert("username".to_string(), Value::from("rob"));
        item.insert("password".to_string(), Value::from("hunter2"));
        Value::List(vec![Value::Map(item)])
    }

    #[test]
    fn valid_project() {
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("example"));
        attrs.insert("data_source_git".to_string(), git("https://example.com/repo"));
        attrs.insert("git_auth_basic".to_string(), basic_auth());
        attrs.insert("app_status_poll_seconds".to_string(), Value::Int(30));

        assert!(resource_schema().validate(&attrs).is_ok());
    }

    #[test]
    fn project_requires_git_source() {
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("example"));

        let errors = resource_schema().validate(&attrs).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            TypeError::MissingRequired { name } if name == "data_source_git"
        )));
    }

    #[test]
    fn applications_are_computed() {
        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("example"));
        attrs.insert("data_source_git".to_string(), git("https://example.com/repo"));
        attrs.insert("applications".to_string(), Value::List(vec![]));

        let errors = resource_schema().validate(&attrs).unwrap_err();
        assert!(matches!(&errors[0], TypeError::ComputedOnly { .. }));
    }

    #[test]
    fn data_source_only_takes_project_name() {
        let schema = data_source_schema();
        assert!(schema.attributes["project_name"].required);
        assert!(schema.attributes["remote_runners_enabled"].computed);
        assert!(schema.attributes["git_auth_ssh"].sensitive);

        let mut attrs = HashMap::new();
        attrs.insert("project_name".to_string(), Value::from("example"));
        assert!(schema.validate(&attrs).is_ok());

        attrs.insert("data_source_git".to_string(), git("https://example.com/repo"));
        assert!(schema.validate(&attrs).is_err());
    }
}
