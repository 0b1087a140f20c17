//! Differ - Compare desired state with current state to generate a Plan
//!
//! Compares the "desired state" declared in configuration with the "current
//! state" recorded from the Provider, and generates the Effects (Plan)
//! required to converge.

use std::collections::{HashMap, HashSet};

use crate::effect::Effect;
use crate::plan::Plan;
use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Result of a diff operation
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// Resource does not exist -> needs creation
    Create(Resource),
    /// Resource exists with differences -> needs update
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// Resource exists with no differences -> no action needed
    NoChange(ResourceId),
    /// Resource exists but not in desired state -> needs deletion
    Delete(State),
}

impl Diff {
    /// Returns whether this Diff involves a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange(_))
    }
}

/// Compare desired state with current state to compute a Diff
///
/// With a schema, configurable attributes that are set remotely but absent
/// from the desired resource count as changes, so removing an attribute from
/// the configuration clears it on the next apply.
pub fn diff(desired: &Resource, current: &State, schema: Option<&ResourceSchema>) -> Diff {
    if !current.exists {
        return Diff::Create(desired.clone());
    }

    let changed = find_changed_attributes(
        &desired.attributes,
        &current.attributes,
        schema.map(|s| &s.attributes),
    );

    if changed.is_empty() {
        Diff::NoChange(desired.id.clone())
    } else {
        Diff::Update {
            id: desired.id.clone(),
            from: current.clone(),
            to: desired.clone(),
            changed_attributes: changed,
        }
    }
}

/// Find changed attributes between desired and current state
fn find_changed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
    schemas: Option<&HashMap<String, AttributeSchema>>,
) -> Vec<String> {
    let mut changed: Vec<String> = desired
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .filter(|(key, desired_value)| match current.get(*key) {
            Some(current_value) => {
                let schema = schemas.and_then(|s| s.get(*key));
                !matches_desired(desired_value, current_value, schema)
            }
            None => !desired_value.is_empty(),
        })
        .map(|(key, _)| key.clone())
        .collect();

    if let Some(schemas) = schemas {
        changed.extend(
            current
                .iter()
                .filter(|(key, value)| !desired.contains_key(*key) && is_set(value))
                .filter(|(key, _)| schemas.get(*key).is_some_and(|s| !s.is_computed_only()))
                .map(|(key, _)| key.clone()),
        );
    }

    changed.sort();
    changed
}

/// Whether a remote value differs from what an unset attribute reads back as
fn is_set(value: &Value) -> bool {
    !value.is_empty() && !matches!(value, Value::Bool(false) | Value::Int(0))
}

/// Whether the current value satisfies the desired one
///
/// Block items (maps inside lists) match when every desired key matches, so
/// attributes filled in by the remote side do not show up as changes unless
/// the block schema says they are configurable. Plain map attributes must
/// match exactly.
fn matches_desired(desired: &Value, current: &Value, schema: Option<&AttributeSchema>) -> bool {
    match (desired, current) {
        (Value::List(d), Value::List(c)) => {
            let block = schema.and_then(|s| match &s.attr_type {
                AttributeType::Block(block) => Some(&block.attributes),
                _ => None,
            });
            d.len() == c.len() && d.iter().zip(c).all(|(d, c)| block_item_matches(d, c, block))
        }
        _ => desired == current,
    }
}

fn block_item_matches(
    desired: &Value,
    current: &Value,
    block: Option<&HashMap<String, AttributeSchema>>,
) -> bool {
    match (desired, current) {
        (Value::Map(d), Value::Map(c)) => find_changed_attributes(d, c, block).is_empty(),
        _ => desired == current,
    }
}

/// Compute Diff for multiple resources and generate a Plan
///
/// Entries in `current_states` with no desired counterpart are deleted.
/// `schemas` holds the resource schemas by type, see [`diff`].
pub fn create_plan(
    desired: &[Resource],
    current_states: &HashMap<ResourceId, State>,
    schemas: &HashMap<String, ResourceSchema>,
) -> Plan {
    let mut plan = Plan::new();

    for resource in desired.iter().filter(|r| r.is_data_source()) {
        plan.add(Effect::Read(resource.clone()));
    }

    for resource in desired.iter().filter(|r| !r.is_data_source()) {
        let current = current_states
            .get(&resource.id)
            .cloned()
            .unwrap_or_else(|| State::not_found(resource.id.clone()));

        match diff(resource, &current, schemas.get(&resource.id.resource_type)) {
            Diff::Create(r) => plan.add(Effect::Create(r)),
            Diff::Update { id, from, to, .. } => {
                plan.add(Effect::Update { id, from, to });
            }
            Diff::NoChange(_) => {}
            Diff::Delete(state) => plan.add(Effect::Delete(state)),
        }
    }

    let wanted: HashSet<&ResourceId> = desired
        .iter()
        .filter(|r| !r.is_data_source())
        .map(|r| &r.id)
        .collect();
    let mut orphans: Vec<&State> = current_states
        .values()
        .filter(|s| s.exists && !wanted.contains(&s.id))
        .collect();
    orphans.sort_by(|a, b| a.id.cmp(&b.id));
    for state in orphans {
        plan.add(Effect::Delete(state.clone()));
    }

    plan
}
