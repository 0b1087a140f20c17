//! waypoint_auth_method_oidc: expand, flatten and CRUD

use waypoint_client::types::{AuthMethod, AuthMethodKind, OidcConfig};
use waypoint_core::provider::{ProviderError, ProviderResult};
use waypoint_core::resource::{Resource, ResourceId, State, Value};

use crate::attrs::{self, Attributes};
use crate::{WaypointProvider, api_error};

pub(crate) fn expand_auth_method(attributes: &Attributes) -> AuthMethod {
    AuthMethod {
        name: attrs::string(attributes, "name"),
        display_name: attrs::string(attributes, "display_name"),
        description: attrs::string(attributes, "description"),
        access_selector: attrs::string(attributes, "accessor_selector"),
        method: Some(AuthMethodKind::Oidc(OidcConfig {
            client_id: attrs::string(attributes, "client_id"),
            client_secret: attrs::string(attributes, "client_secret"),
            scopes: attrs::string_list(attributes, "scopes"),
            allowed_redirect_uris: attrs::string_list(attributes, "allowed_redirect_urls"),
            signing_algs: attrs::string_list(attributes, "signing_algs"),
            auds: attrs::string_list(attributes, "auds"),
            discovery_url: attrs::string(attributes, "discovery_url"),
            discovery_ca_pem: attrs::string_list(attributes, "discovery_ca_pem"),
            claim_mappings: attrs::string_map(attributes, "claim_mappings"),
            list_claim_mappings: attrs::string_map(attributes, "list_claim_mappings"),
        })),
    }
}

pub(crate) fn flatten_auth_method(method: &AuthMethod, oidc: &OidcConfig) -> Attributes {
    let mut attributes = Attributes::new();
    let strings = [
        ("name", &method.name),
        ("display_name", &method.display_name),
        ("description", &method.description),
        ("accessor_selector", &method.access_selector),
        ("client_id", &oidc.client_id),
        ("client_secret", &oidc.client_secret),
        ("discovery_url", &oidc.discovery_url),
    ];
    for (key, value) in strings {
        attributes.insert(key.to_string(), Value::from(value.as_str()));
    }

    let lists = [
        ("allowed_redirect_urls", &oidc.allowed_redirect_uris),
        ("discovery_ca_pem", &oidc.discovery_ca_pem),
        ("signing_algs", &oidc.signing_algs),
        ("scopes", &oidc.scopes),
        ("auds", &oidc.auds),
    ];
    for (key, value) in lists {
        attributes.insert(key.to_string(), attrs::list_value(value));
    }

    attributes.insert(
        "claim_mappings".to_string(),
        attrs::map_value(&oidc.claim_mappings),
    );
    attributes.insert(
        "list_claim_mappings".to_string(),
        attrs::map_value(&oidc.list_claim_mappings),
    );
    attributes
}

fn method_name(current: &State) -> Option<String> {
    current
        .identifier
        .clone()
        .or_else(|| current.attributes.get("name")?.as_str().map(str::to_string))
        .filter(|name| !name.is_empty())
}

impl WaypointProvider {
    /// Fetch an auth method and check it is OIDC
    ///
    /// Returns `None` when the server has no method by that name.
    pub(crate) async fn fetch_oidc(
        &self,
        id: &ResourceId,
        name: &str,
        prior: &Attributes,
    ) -> ProviderResult<Option<Attributes>> {
        let method = match self.api.get_oidc_auth_method(name).await {
            Ok(method) => method,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(api_error(id, e)),
        };
        let oidc = method.oidc().ok_or_else(|| {
            ProviderError::new(format!("auth method '{}' is not an OIDC auth method", name))
                .for_resource(id.clone())
        })?;

        let mut attributes = flatten_auth_method(&method, oidc);
        attrs::carry_over_secret(&mut attributes, prior, "client_secret");
        Ok(Some(attributes))
    }

    pub(crate) async fn read_auth_method_oidc(
        &self,
        id: ResourceId,
        current: &State,
    ) -> ProviderResult<State> {
        let Some(name) = method_name(current) else {
            return Ok(State::not_found(id));
        };
        match self.fetch_oidc(&id, &name, &current.attributes).await? {
            Some(attributes) => Ok(State::existing(id, attributes).with_identifier(name)),
            None => Ok(State::not_found(id)),
        }
    }

    /// Create or update an OIDC auth method
    pub(crate) async fn upsert_auth_method_oidc(
        &self,
        resource: Resource,
    ) -> ProviderResult<State> {
        let method = expand_auth_method(&resource.attributes);
        self.api
            .upsert_oidc(&method)
            .await
            .map_err(|e| api_error(&resource.id, e))?;
        log::trace!("upserted OIDC auth method '{}'", method.name);

        match self
            .fetch_oidc(&resource.id, &method.name, &resource.attributes)
            .await?
        {
            Some(attributes) => {
                Ok(State::existing(resource.id, attributes).with_identifier(method.name))
            }
            None => Err(ProviderError::new(format!(
                "auth method '{}' not found after upsert",
                method.name
            ))
            .for_resource(resource.id)),
        }
    }

    pub(crate) async fn delete_auth_method_oidc(&self, current: &State) -> ProviderResult<()> {
        let name = method_name(current).ok_or_else(|| {
            ProviderError::new("auth method name unknown").for_resource(current.id.clone())
        })?;

        self.api
            .delete_oidc(&name)
            .await
            .map_err(|e| api_error(&current.id, e))?;
        log::trace!("deleted OIDC auth method '{}'", name);
        Ok(())
    }
}
