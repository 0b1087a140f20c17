//! reqwest implementation of `WaypointApi`

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::WaypointApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    AuthMethod, AuthMethodResponse, ErrorBody, Project, ProjectResponse, RunnerConfig,
    RunnerConfigResponse, UpsertAuthMethodRequest, UpsertProjectRequest,
    UpsertRunnerConfigRequest,
};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("terraform-provider-waypoint/", env!("CARGO_PKG_VERSION"));

/// gRPC status code the gateway reports for missing objects
const GRPC_NOT_FOUND: i32 = 5;

/// Longest response body echoed into error messages
const MAX_ERROR_BODY: usize = 200;

/// Client for the Waypoint server HTTP API
#[derive(Debug, Clone)]
pub struct WaypointClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl WaypointClient {
    /// Build a client
    ///
    /// Fails with `ClientError::MissingToken` when no token is configured.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.token.trim().is_empty() {
            return Err(ClientError::MissingToken);
        }
        let base_url = config.base_url()?;

        if config.tls_skip_verify {
            log::warn!("TLS certificate verification is disabled for {}", base_url);
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.tls_skip_verify)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        log::debug!("{} {}", method, url);
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: &'static str,
        name: &str,
    ) -> ClientResult<T> {
        let body = self.send_raw(request, kind, name).await?;
        let body = if body.trim().is_empty() { "{}" } else { &body };
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_raw(
        &self,
        request: RequestBuilder,
        kind: &'static str,
        name: &str,
    ) -> ClientResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        if status == StatusCode::NOT_FOUND || error.code == GRPC_NOT_FOUND {
            return Err(ClientError::NotFound {
                kind,
                name: name.to_string(),
            });
        }

        let message = if error.message.is_empty() {
            truncate(&body)
        } else {
            error.message
        };
        log::debug!("{} {} failed: {}", kind, name, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        kind: &'static str,
        name: &str,
    ) -> ClientResult<T> {
        let request = self.request(Method::PUT, path).json(body);
        self.send(request, kind, name).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: &'static str,
        name: &str,
    ) -> ClientResult<T> {
        let request = self.request(Method::GET, path);
        self.send(request, kind, name).await
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

fn missing(kind: &'static str, name: &str) -> ClientError {
    ClientError::Decode(format!("response for {} '{}' has no {}", kind, name, kind))
}

#[async_trait]
impl WaypointApi for WaypointClient {
    async fn get_project(&self, name: &str) -> ClientResult<Project> {
        let path = format!("v1/projects/{}", urlencoding::encode(name));
        let response: ProjectResponse = self.get(&path, "project", name).await?;
        response.project.ok_or_else(|| missing("project", name))
    }

    async fn upsert_project(&self, project: &Project) -> ClientResult<Project> {
        let body = UpsertProjectRequest { project };
        let response: ProjectResponse = self
            .put("v1/projects", &body, "project", &project.name)
            .await?;
        response.project.ok_or_else(|| missing("project", &project.name))
    }

    async fn create_runner_profile(&self, config: &RunnerConfig) -> ClientResult<RunnerConfig> {
        let body = UpsertRunnerConfigRequest { config };
        let response: RunnerConfigResponse = self
            .put("v1/runner-profiles", &body, "runner profile", &config.name)
            .await?;
        response
            .config
            .ok_or_else(|| missing("runner profile", &config.name))
    }

    async fn get_runner_profile(&self, id: &str) -> ClientResult<RunnerConfig> {
        let path = format!("v1/runner-profiles/{}", urlencoding::encode(id));
        let response: RunnerConfigResponse = self.get(&path, "runner profile", id).await?;
        response.config.ok_or_else(|| missing("runner profile", id))
    }

    async fn upsert_oidc(&self, method: &AuthMethod) -> ClientResult<AuthMethod> {
        let body = UpsertAuthMethodRequest {
            auth_method: method,
        };
        let response: AuthMethodResponse = self
            .put("v1/auth-methods", &body, "auth method", &method.name)
            .await?;
        response
            .auth_method
            .ok_or_else(|| missing("auth method", &method.name))
    }

    async fn get_oidc_auth_method(&self, name: &str) -> ClientResult<AuthMethod> {
        let path = format!("v1/auth-methods/{}", urlencoding::encode(name));
        let response: AuthMethodResponse = self.get(&path, "auth method", name).await?;
        response.auth_method.ok_or_else(|| missing("auth method", name))
    }

    async fn delete_oidc(&self, name: &str) -> ClientResult<()> {
        let path = format!("v1/auth-methods/{}", urlencoding::encode(name));
        let request = self.request(Method::DELETE, &path);
        self.send_raw(request, "auth method", name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_fails_construction() {
        let err = WaypointClient::new(ClientConfig::new("localhost:9702", "")).unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
    }

    #[test]
    fn whitespace_token_is_missing() {
        let err = WaypointClient::new(ClientConfig::new("localhost:9702", "  ")).unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
    }

    #[test]
    fn invalid_address_fails_construction() {
        let err = WaypointClient::new(ClientConfig::new("ftp://localhost", "token")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress { .. }));
    }

    #[test]
    fn url_joins_path() {
        let client = WaypointClient::new(ClientConfig::new("http://127.0.0.1:9702", "t")).unwrap();
        assert_eq!(client.url("v1/projects"), "http://127.0.0.1:9702/v1/projects");
    }

    #[test]
    fn user_agent_names_provider() {
        assert!(USER_AGENT.starts_with("terraform-provider-waypoint/"));
    }

    #[test]
    fn truncate_long_bodies() {
        let body = "x".repeat(500);
        let out = truncate(&body);
        assert_eq!(out.len(), MAX_ERROR_BODY + 3);
        assert!(out.ends_with("..."));
        assert_eq!(truncate(" short "), "short");
    }
}
