//! Effect - A single side effect to perform against a Provider
//!
//! Effects are values: building them performs no API calls. They are
//! executed when a Plan is applied.

use crate::resource::{Resource, ResourceId, State};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Read a data source
    Read(Resource),
    /// Create a resource
    Create(Resource),
    /// Update an existing resource in place
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
    },
    /// Delete a resource, using its last known state
    Delete(State),
}

impl Effect {
    /// Returns true if this Effect changes remote objects
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Effect::Read(_))
    }

    pub fn resource_id(&self) -> &ResourceId {
        match self {
            Effect::Read(r) | Effect::Create(r) => &r.id,
            Effect::Update { id, .. } => id,
            Effect::Delete(state) => &state.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_not_mutating() {
        let effect = Effect::Read(Resource::new("waypoint_project", "p").with_read_only(true));
        assert!(!effect.is_mutating());
        assert_eq!(effect.resource_id().name, "p");
    }

    #[test]
    fn delete_is_mutating() {
        let id = ResourceId::new("waypoint_auth_method_oidc", "google");
        let effect = Effect::Delete(State::not_found(id.clone()));
        assert!(effect.is_mutating());
        assert_eq!(effect.resource_id(), &id);
    }
}
