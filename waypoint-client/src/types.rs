//! Wire types of the Waypoint HTTP API.
//!
//! Bodies follow the protobuf JSON mapping used by the server gateway:
//! camelCase field names, `oneof` members appearing as a field named after
//! the chosen member, bytes as base64 and durations as Go duration strings (`"90s"`, `"1m30s"`).

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Empty message, used by `oneof` members that carry no data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// A Waypoint project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<Application>,
    pub remote_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_poll: Option<Poll>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_change_signal: String,
    pub variables: Vec<Variable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_report_poll: Option<Poll>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Git settings, when the project is sourced from Git
    pub fn git(&self) -> Option<&Git> {
        match &self.data_source {
            Some(DataSource::Git(git)) => Some(git),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub name: String,
}

/// Polling settings; `interval` is a Go duration string such as `"90s"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interval: String,
}

impl Poll {
    /// Polling every `seconds`, disabled when zero
    pub fn every(seconds: u64) -> Self {
        if seconds == 0 {
            Self::default()
        } else {
            Self {
                enabled: true,
                interval: format!("{}s", seconds),
            }
        }
    }

    /// Polling interval, `None` when disabled
    ///
    /// Go renders durations without spaces (`"1m30s"`), which humantime
    /// accepts as well.
    pub fn interval(&self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        match humantime::parse_duration(self.interval.trim()) {
            Ok(interval) => Some(interval),
            Err(e) => {
                log::warn!("ignoring poll interval '{}': {}", self.interval, e);
                None
            }
        }
    }

    /// Interval in whole seconds, zero when disabled
    pub fn interval_secs(&self) -> u64 {
        self.interval().map_or(0, |interval| interval.as_secs())
    }
}

/// Where a project's `waypoint.hcl` comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    Local(Empty),
    Git(Git),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Git {
    pub url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub path: String,
    pub ignore_changes_outside_path: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub auth: Option<GitAuth>,
}

/// Git credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GitAuth {
    Basic(GitAuthBasic),
    Ssh(GitAuthSsh),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitAuthBasic {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitAuthSsh {
    pub user: String,
    #[serde(with = "base64_bytes")]
    pub private_key_pem: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// A project input variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub value: VariableValue,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub source: Option<VariableSource>,
}

impl Variable {
    /// A string variable set on the server
    pub fn server_str(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: VariableValue::Str(value.into()),
            source: Some(VariableSource::Server(Empty {})),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableValue {
    Str(String),
    Hcl(String),
    Bool(bool),
    /// int64 values arrive as JSON strings or numbers
    Num(serde_json::Value),
}

impl VariableValue {
    /// Value rendered as a string
    pub fn display(&self) -> String {
        match self {
            VariableValue::Str(s) | VariableValue::Hcl(s) => s.clone(),
            VariableValue::Bool(b) => b.to_string(),
            VariableValue::Num(serde_json::Value::String(s)) => s.clone(),
            VariableValue::Num(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableSource {
    Cli(Empty),
    File(Empty),
    Env(Empty),
    Vcs(Empty),
    Server(Empty),
    Dynamic(Empty),
}

/// Format of a runner plugin configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfigFormat {
    #[default]
    Hcl,
    Json,
}

impl ConfigFormat {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(ConfigFormat::Hcl),
            1 => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            ConfigFormat::Hcl => 0,
            ConfigFormat::Json => 1,
        }
    }
}

/// Which runners a profile's jobs may be assigned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunnerTarget {
    Any(Empty),
    Id(RunnerId),
    Labels(RunnerLabels),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerId {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerLabels {
    pub labels: HashMap<String, String>,
}

/// On-demand runner configuration, a.k.a. runner profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunnerConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub oci_url: String,
    pub environment_variables: HashMap<String, String>,
    pub plugin_type: String,
    #[serde(with = "base64_bytes")]
    pub plugin_config: Vec<u8>,
    pub config_format: ConfigFormat,
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_runner: Option<RunnerTarget>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            oci_url: String::new(),
            environment_variables: HashMap::new(),
            plugin_type: String::new(),
            plugin_config: Vec::new(),
            config_format: ConfigFormat::Hcl,
            default: false,
            target_runner: Some(RunnerTarget::Any(Empty {})),
        }
    }
}

/// An auth method registered with the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethod {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access_selector: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub method: Option<AuthMethodKind>,
}

impl AuthMethod {
    pub fn oidc(&self) -> Option<&OidcConfig> {
        match &self.method {
            Some(AuthMethodKind::Oidc(oidc)) => Some(oidc),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMethodKind {
    Oidc(OidcConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OidcConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub allowed_redirect_uris: Vec<String>,
    pub signing_algs: Vec<String>,
    pub auds: Vec<String>,
    pub discovery_url: String,
    pub discovery_ca_pem: Vec<String>,
    pub claim_mappings: HashMap<String, String>,
    pub list_claim_mappings: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertProjectRequest<'a> {
    pub project: &'a Project,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectResponse {
    pub project: Option<Project>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertRunnerConfigRequest<'a> {
    pub config: &'a RunnerConfig,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunnerConfigResponse {
    pub config: Option<RunnerConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertAuthMethodRequest<'a> {
    pub auth_method: &'a AuthMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthMethodResponse {
    pub auth_method: Option<AuthMethod>,
}

/// Error body returned by the gateway
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorBody {
    pub code: i32,
    pub message: String,
}

/// Serde adapter for protobuf `bytes` fields (standard base64)
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn poll_interval_from_go_duration() {
        let poll = |interval: &str| Poll {
            enabled: true,
            interval: interval.to_string(),
        };
        assert_eq!(poll("90s").interval_secs(), 90);
        assert_eq!(poll("1m30s").interval_secs(), 90);
        assert_eq!(poll("2m0s").interval_secs(), 120);
        assert_eq!(poll("1h0m0s").interval_secs(), 3600);
        assert_eq!(poll("1500ms").interval(), Some(Duration::from_millis(1500)));
        assert_eq!(poll("soon").interval(), None);
        assert_eq!(poll("").interval_secs(), 0);
    }

    #[test]
    fn disabled_poll_has_no_interval() {
        let poll = Poll {
            enabled: false,
            interval: "30s".to_string(),
        };
        assert_eq!(poll.interval(), None);
        assert_eq!(poll.interval_secs(), 0);
    }

    #[test]
    fn poll_every_zero_is_disabled() {
        assert_eq!(Poll::every(0), Poll::default());
        let poll = Poll::every(90);
        assert!(poll.enabled);
        assert_eq!(poll.interval, "90s");
        assert_eq!(poll.interval_secs(), 90);
    }

    #[test]
    fn git_basic_auth_is_flattened() {
        let git = Git {
            url: "https://github.com/hashicorp/waypoint-examples".to_string(),
            git_ref: "HEAD".to_string(),
            path: "docker/go".to_string(),
            ignore_changes_outside_path: false,
            auth: Some(GitAuth::Basic(GitAuthBasic {
                username: "test".to_string(),
                password: "secret".to_string(),
            })),
        };

        let value = serde_json::to_value(DataSource::Git(git.clone())).unwrap();
        assert_eq!(value["git"]["ref"], "HEAD");
        assert_eq!(value["git"]["basic"]["username"], "test");

        let back: DataSource = serde_json::from_value(value).unwrap();
        assert_eq!(back, DataSource::Git(git));
    }

    #[test]
    fn git_ssh_key_is_base64() {
        let json = json!({
            "url": "git@github.com:hashicorp/waypoint-examples.git",
            "ssh": {"user": "git", "privateKeyPem": "a2V5"}
        });
        let git: Git = serde_json::from_value(json).unwrap();
        match git.auth {
            Some(GitAuth::Ssh(ssh)) => {
                assert_eq!(ssh.user, "git");
                assert_eq!(ssh.private_key_pem, b"key".to_vec());
            }
            other => panic!("expected ssh auth, got {:?}", other),
        }
    }

    #[test]
    fn git_without_auth() {
        let git: Git = serde_json::from_value(json!({"url": "https://example.com"})).unwrap();
        assert!(git.auth.is_none());
    }

    #[test]
    fn variable_value_and_source() {
        let var = Variable::server_str("name", "rob");
        let value = serde_json::to_value(&var).unwrap();
        assert_eq!(value, json!({"name": "name", "str": "rob", "server": {}}));

        let num: Variable = serde_json::from_value(json!({"name": "n", "num": "42"})).unwrap();
        assert_eq!(num.value.display(), "42");
        assert!(num.source.is_none());
    }

    #[test]
    fn runner_target_labels() {
        let json = json!({
            "id": "01G5GNJEYC7RVJNXFGMHD0HCDT",
            "name": "docker-odr",
            "pluginConfig": "e30=",
            "configFormat": "JSON",
            "targetRunner": {"labels": {"labels": {"app": "payments"}}}
        });
        let config: RunnerConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.plugin_config, b"{}".to_vec());
        assert_eq!(config.config_format, ConfigFormat::Json);
        match config.target_runner {
            Some(RunnerTarget::Labels(l)) => assert_eq!(l.labels["app"], "payments"),
            other => panic!("expected labels, got {:?}", other),
        }
    }

    #[test]
    fn default_runner_config_targets_any() {
        let value = serde_json::to_value(RunnerConfig::default()).unwrap();
        assert_eq!(value["targetRunner"], json!({"any": {}}));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn auth_method_oidc_member() {
        let json = json!({
            "name": "google",
            "displayName": "Google",
            "oidc": {
                "clientId": "abc",
                "discoveryUrl": "https://accounts.google.com",
                "allowedRedirectUris": ["https://localhost:9702/auth/oidc-callback"]
            }
        });
        let method: AuthMethod = serde_json::from_value(json).unwrap();
        let oidc = method.oidc().unwrap();
        assert_eq!(oidc.client_id, "abc");
        assert_eq!(oidc.allowed_redirect_uris.len(), 1);
    }

    #[test]
    fn auth_method_without_oidc() {
        let method: AuthMethod = serde_json::from_value(json!({"name": "token"})).unwrap();
        assert!(method.oidc().is_none());
    }
}
