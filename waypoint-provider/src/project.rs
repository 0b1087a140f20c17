//! waypoint_project: expand, flatten and CRUD

use waypoint_client::types::{
    DataSource, Git, GitAuth, GitAuthBasic, GitAuthSsh, Poll, Project, Variable,
};
use waypoint_core::provider::{ProviderError, ProviderResult};
use waypoint_core::resource::{Resource, ResourceId, State, Value};

use crate::attrs::{self, Attributes};
use crate::{TOMBSTONE, WaypointProvider, api_error};

/// Sensitive block fields the server does not echo back
const SECRET_FIELDS: &[(&str, &str)] = &[
    ("git_auth_basic", "password"),
    ("git_auth_ssh", "ssh_private_key"),
    ("git_auth_ssh", "passphrase"),
];

/// Build the project to upsert from resource attributes
pub(crate) fn expand_project(attributes: &Attributes) -> Project {
    let mut project = Project::new(attrs::string(attributes, "project_name"));
    project.remote_enabled = attrs::flag(attributes, "remote_runners_enabled");
    project.status_report_poll = Some(Poll::every(attrs::seconds(
        attributes,
        "app_status_poll_seconds",
    )));

    let mut variables: Vec<Variable> = attrs::string_map(attributes, "project_variables")
        .into_iter()
        .map(|(name, value)| Variable::server_str(name, value))
        .collect();
    variables.sort_by(|a, b| a.name.cmp(&b.name));
    project.variables = variables;

    let empty = Attributes::new();
    let source = attrs::block(attributes, "data_source_git").unwrap_or(&empty);
    project.data_source_poll = Some(Poll::every(attrs::seconds(
        source,
        "git_poll_interval_seconds",
    )));
    project.file_change_signal = attrs::string(source, "file_change_signal");
    project.data_source = Some(DataSource::Git(Git {
        url: attrs::string(source, "git_url"),
        git_ref: attrs::string(source, "git_ref"),
        path: attrs::string(source, "git_path"),
        ignore_changes_outside_path: attrs::flag(source, "ignore_changes_outside_path"),
        auth: expand_git_auth(attributes),
    }));

    project
}

fn expand_git_auth(attributes: &Attributes) -> Option<GitAuth> {
    if let Some(basic) = attrs::block(attributes, "git_auth_basic") {
        return Some(GitAuth::Basic(GitAuthBasic {
            username: attrs::string(basic, "username"),
            password: attrs::string(basic, "password"),
        }));
    }
    attrs::block(attributes, "git_auth_ssh").map(|ssh| {
        GitAuth::Ssh(GitAuthSsh {
            user: attrs::string(ssh, "git_user"),
            private_key_pem: attrs::string(ssh, "ssh_private_key").into_bytes(),
            password: attrs::string(ssh, "passphrase"),
        })
    })
}

/// The placeholder project written in place of a delete
pub(crate) fn tombstone_project(name: &str) -> Project {
    let mut project = Project::new(name);
    project.data_source = Some(DataSource::Git(Git {
        url: TOMBSTONE.to_string(),
        git_ref: TOMBSTONE.to_string(),
        path: TOMBSTONE.to_string(),
        ignore_changes_outside_path: true,
        auth: None,
    }));
    project.data_source_poll = Some(Poll::default());
    project.status_report_poll = Some(Poll::default());
    project
}

pub(crate) fn is_tombstone(project: &Project) -> bool {
    project.git().is_some_and(|git| git.url == TOMBSTONE)
}

/// Attributes shared by the resource and the data source
///
/// `project_variables` is left to the caller since the two expose it
/// differently.
pub(crate) fn flatten_project(project: &Project) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("project_name".to_string(), Value::from(project.name.as_str()));
    attributes.insert(
        "remote_runners_enabled".to_string(),
        Value::Bool(project.remote_enabled),
    );
    attributes.insert(
        "applications".to_string(),
        Value::List(
            project
                .applications
                .iter()
                .map(|app| {
                    let mut item = Attributes::new();
                    item.insert("name".to_string(), Value::from(app.name.as_str()));
                    Value::Map(item)
                })
                .collect(),
        ),
    );
    attributes.insert(
        "app_status_poll_seconds".to_string(),
        Value::Int(poll_seconds(project.status_report_poll.as_ref())),
    );

    if let Some(git) = project.git() {
        let mut source = Attributes::new();
        source.insert("git_url".to_string(), Value::from(git.url.as_str()));
        source.insert("git_path".to_string(), Value::from(git.path.as_str()));
        source.insert("git_ref".to_string(), Value::from(git.git_ref.as_str()));
        source.insert(
            "ignore_changes_outside_path".to_string(),
            Value::Bool(git.ignore_changes_outside_path),
        );
        source.insert(
            "git_poll_interval_seconds".to_string(),
            Value::Int(poll_seconds(project.data_source_poll.as_ref())),
        );
        source.insert(
            "file_change_signal".to_string(),
            Value::from(project.file_change_signal.as_str()),
        );
        attributes.insert("data_source_git".to_string(), attrs::block_value(source));

        match &git.auth {
            Some(GitAuth::Basic(basic)) => {
                let mut item = Attributes::new();
                item.insert("username".to_string(), Value::from(basic.username.as_str()));
                item.insert("password".to_string(), Value::from(basic.password.as_str()));
                attributes.insert("git_auth_basic".to_string(), attrs::block_value(item));
            }
            Some(GitAuth::Ssh(ssh)) => {
                let mut item = Attributes::new();
                item.insert("git_user".to_string(), Value::from(ssh.user.as_str()));
                item.insert(
                    "ssh_private_key".to_string(),
                    Value::String(String::from_utf8_lossy(&ssh.private_key_pem).into_owned()),
                );
                item.insert("passphrase".to_string(), Value::from(ssh.password.as_str()));
                attributes.insert("git_auth_ssh".to_string(), attrs::block_value(item));
            }
            None => {}
        }
    }

    attributes
}

fn poll_seconds(poll: Option<&Poll>) -> i64 {
    poll.map(|p| i64::try_from(p.interval_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Variables as a name to value map
pub(crate) fn variables_map(project: &Project) -> Value {
    Value::Map(
        project
            .variables
            .iter()
            .map(|var| (var.name.clone(), Value::String(var.value.display())))
            .collect(),
    )
}

/// Variables as a list of `{name, value}` objects, sorted by name
pub(crate) fn variables_list(project: &Project) -> Value {
    let mut variables: Vec<&Variable> = project.variables.iter().collect();
    variables.sort_by(|a, b| a.name.cmp(&b.name));
    Value::List(
        variables
            .into_iter()
            .map(|var| {
                let mut item = Attributes::new();
                item.insert("name".to_string(), Value::from(var.name.as_str()));
                item.insert("value".to_string(), Value::String(var.value.display()));
                Value::Map(item)
            })
            .collect(),
    )
}

fn project_name(current: &State) -> Option<String> {
    current
        .identifier
        .clone()
        .or_else(|| current.attributes.get("project_name")?.as_str().map(str::to_string))
        .filter(|name| !name.is_empty())
}

impl WaypointProvider {
    /// Read a project; `prior` supplies secrets the server does not return
    async fn fetch_project(
        &self,
        id: ResourceId,
        name: &str,
        prior: &Attributes,
    ) -> ProviderResult<State> {
        let project = match self.api.get_project(name).await {
            Ok(project) => project,
            Err(e) if e.is_not_found() => return Ok(State::not_found(id)),
            Err(e) => return Err(api_error(&id, e)),
        };
        if is_tombstone(&project) {
            log::debug!("project '{}' only exists as a deleted placeholder", name);
            return Ok(State::not_found(id));
        }

        let mut attributes = flatten_project(&project);
        attributes.insert("project_variables".to_string(), variables_map(&project));
        attrs::carry_over_secrets(&mut attributes, prior, SECRET_FIELDS);

        Ok(State::existing(id, attributes).with_identifier(project.name))
    }

    pub(crate) async fn read_project(
        &self,
        id: ResourceId,
        current: &State,
    ) -> ProviderResult<State> {
        match project_name(current) {
            Some(name) => self.fetch_project(id, &name, &current.attributes).await,
            None => Ok(State::not_found(id)),
        }
    }

    /// Create or update a project
    pub(crate) async fn upsert_project(&self, resource: Resource) -> ProviderResult<State> {
        let project = expand_project(&resource.attributes);
        if project.name.is_empty() {
            return Err(ProviderError::new("project_name is required").for_resource(resource.id));
        }

        self.api
            .upsert_project(&project)
            .await
            .map_err(|e| api_error(&resource.id, e))?;
        log::trace!("upserted project '{}'", project.name);

        self.fetch_project(resource.id.clone(), &project.name, &resource.attributes)
            .await
    }

    /// Projects cannot be deleted remotely; overwrite with a placeholder instead
    pub(crate) async fn delete_project(&self, current: &State) -> ProviderResult<()> {
        let name = project_name(current).ok_or_else(|| {
            ProviderError::new("project name unknown").for_resource(current.id.clone())
        })?;

        self.api
            .upsert_project(&tombstone_project(&name))
            .await
            .map_err(|e| api_error(&current.id, e))?;
        log::trace!("deleted project '{}'", name);
        Ok(())
    }
}
