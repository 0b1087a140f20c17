//! In-memory Waypoint server used by the provider tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use waypoint_client::types::{AuthMethod, Project, RunnerConfig};
use waypoint_client::{ClientError, ClientResult, WaypointApi};

#[derive(Default)]
pub(crate) struct FakeApi {
    pub projects: Mutex<HashMap<String, Project>>,
    pub runner_configs: Mutex<HashMap<String, RunnerConfig>>,
    pub auth_methods: Mutex<HashMap<String, AuthMethod>>,
    next_id: Mutex<u32>,
    /// Blank out secrets in responses, the way the server does
    pub redact_secrets: bool,
}

impl FakeApi {
    pub fn redacting() -> Self {
        Self {
            redact_secrets: true,
            ..Self::default()
        }
    }

    pub fn project(&self, name: &str) -> Option<Project> {
        self.projects.lock().unwrap().get(name).cloned()
    }

    pub fn runner_config(&self, id: &str) -> Option<RunnerConfig> {
        self.runner_configs.lock().unwrap().get(id).cloned()
    }

    fn redact_project(&self, mut project: Project) -> Project {
        use waypoint_client::types::{DataSource, GitAuth};

        if self.redact_secrets
            && let Some(DataSource::Git(git)) = &mut project.data_source
        {
            match &mut git.auth {
                Some(GitAuth::Basic(basic)) => basic.password.clear(),
                Some(GitAuth::Ssh(ssh)) => {
                    ssh.private_key_pem.clear();
                    ssh.password.clear();
                }
                None => {}
            }
        }
        project
    }
}

#[async_trait]
impl WaypointApi for FakeApi {
    async fn get_project(&self, name: &str) -> ClientResult<Project> {
        let project = self.project(name).ok_or_else(|| ClientError::NotFound {
            kind: "project",
            name: name.to_string(),
        })?;
        Ok(self.redact_project(project))
    }

    async fn upsert_project(&self, project: &Project) -> ClientResult<Project> {
        if project.name.is_empty() {
            return Err(ClientError::Api {
                status: 400,
                message: "project name is required".to_string(),
            });
        }
        self.projects
            .lock()
            .unwrap()
            .insert(project.name.clone(), project.clone());
        Ok(self.redact_project(project.clone()))
    }

    async fn create_runner_profile(&self, config: &RunnerConfig) -> ClientResult<RunnerConfig> {
        let mut config = config.clone();
        if config.id.is_empty() {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            config.id = format!("01GRUNNERPROFILE{:04}", *next);
        }
        self.runner_configs
            .lock()
            .unwrap()
            .insert(config.id.clone(), config.clone());
        Ok(config)
    }

    async fn get_runner_profile(&self, id: &str) -> ClientResult<RunnerConfig> {
        self.runner_config(id).ok_or_else(|| ClientError::NotFound {
            kind: "runner profile",
            name: id.to_string(),
        })
    }

    async fn upsert_oidc(&self, method: &AuthMethod) -> ClientResult<AuthMethod> {
        self.auth_methods
            .lock()
            .unwrap()
            .insert(method.name.clone(), method.clone());
        Ok(method.clone())
    }

    async fn get_oidc_auth_method(&self, name: &str) -> ClientResult<AuthMethod> {
        let mut method = self
            .auth_methods
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind: "auth method",
                name: name.to_string(),
            })?;
        if self.redact_secrets
            && let Some(waypoint_client::types::AuthMethodKind::Oidc(oidc)) = &mut method.method
        {
            oidc.client_secret.clear();
        }
        Ok(method)
    }

    async fn delete_oidc(&self, name: &str) -> ClientResult<()> {
        self.auth_methods
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound {
                kind: "auth method",
                name: name.to_string(),
            })
    }
}
