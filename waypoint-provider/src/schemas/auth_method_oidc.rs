//! waypoint_auth_method_oidc schema definitions

use waypoint_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::data_source_mirror;

pub const RESOURCE_TYPE: &str = "waypoint_auth_method_oidc";

/// Returns the schema for the OIDC auth method resource
pub fn resource_schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("An OIDC auth method used to log in to Waypoint")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .with_description("Name shown in the UI and CLI"),
        )
        .attribute(AttributeSchema::new("description", AttributeType::String))
        .attribute(
            AttributeSchema::new("accessor_selector", AttributeType::String)
                .with_description("Selector expression restricting which users may log in"),
        )
        .attribute(AttributeSchema::new("client_id", AttributeType::String).required())
        .attribute(AttributeSchema::new("client_secret", AttributeType::String).sensitive())
        .attribute(
            AttributeSchema::new("discovery_url", AttributeType::String)
                .required()
                .with_description("OIDC discovery URL, without the .well-known component"),
        )
        .attribute(
            AttributeSchema::new("allowed_redirect_urls", types::string_list())
                .required()
                .with_description("Redirect URLs accepted at the end of the OIDC flow"),
        )
        .attribute(
            AttributeSchema::new("claim_mappings", types::string_map())
                .with_description("Claims mapped to string metadata"),
        )
        .attribute(
            AttributeSchema::new("list_claim_mappings", types::string_map())
                .with_description("Claims mapped to list metadata"),
        )
        .attribute(
            AttributeSchema::new("discovery_ca_pem", types::string_list())
                .with_description("CA certificates used to verify the discovery URL"),
        )
        .attribute(
            AttributeSchema::new("signing_algs", types::string_list())
                .with_description("Accepted signing algorithms; the server defaults to RS256"),
        )
        .attribute(AttributeSchema::new("scopes", types::string_list()))
        .attribute(
            AttributeSchema::new("auds", types::string_list())
                .with_description("Audiences that must be present in the token"),
        )
}

pub fn data_source_schema() -> ResourceSchema {
    data_source_mirror(resource_schema(), "name")
}
