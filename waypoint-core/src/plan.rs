//! Ordered effects computed by the differ
//!
//! Data source reads come first, then creates and updates in configuration
//! order, then deletes. Nothing is sent to the server until each effect is
//! applied.

use std::fmt;

use crate::effect::Effect;

#[derive(Debug, Clone, Default)]
pub struct Plan {
    effects: Vec<Effect>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects that write to the server, reads excluded
    pub fn change_count(&self) -> usize {
        self.effects.iter().filter(|e| e.is_mutating()).count()
    }

    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    pub fn summary(&self) -> PlanSummary {
        self.effects
            .iter()
            .fold(PlanSummary::default(), |mut counts, effect| {
                match effect {
                    Effect::Read(_) => counts.read += 1,
                    Effect::Create(_) => counts.create += 1,
                    Effect::Update { .. } => counts.update += 1,
                    Effect::Delete(_) => counts.delete += 1,
                }
                counts
            })
    }
}

/// Effect counts by kind
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub read: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

/// `Plan: 1 to add, 0 to change, 2 to destroy.`, with data source reads
/// listed first when there are any
impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plan: ")?;
        if self.read > 0 {
            write!(f, "{} to read, ", self.read)?;
        }
        write!(
            f,
            "{} to add, {} to change, {} to destroy.",
            self.create, self.update, self.delete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Resource, ResourceId, State};

    fn lookup() -> Effect {
        Effect::Read(Resource::new("waypoint_runner_profile", "odr").with_read_only(true))
    }

    #[test]
    fn empty_plan() {
        let plan = Plan::new();
        assert!(plan.is_empty());
        assert!(!plan.has_changes());
        assert_eq!(plan.summary(), PlanSummary::default());
    }

    #[test]
    fn reads_alone_are_not_changes() {
        let mut plan = Plan::new();
        plan.add(lookup());
        assert!(!plan.is_empty());
        assert!(!plan.has_changes());
    }

    #[test]
    fn summary_counts_each_kind() {
        let mut plan = Plan::new();
        plan.add(lookup());
        plan.add(Effect::Create(Resource::new("waypoint_project", "a")));
        plan.add(Effect::Create(Resource::new("waypoint_project", "b")));
        plan.add(Effect::Delete(State::not_found(ResourceId::new(
            "waypoint_auth_method_oidc",
            "c",
        ))));

        let summary = plan.summary();
        assert_eq!(plan.change_count(), 3);
        assert_eq!(
            summary.to_string(),
            "Plan: 1 to read, 2 to add, 0 to change, 1 to destroy."
        );
    }

    #[test]
    fn summary_omits_reads_when_none() {
        let summary = PlanSummary {
            update: 1,
            ..PlanSummary::default()
        };
        assert_eq!(summary.to_string(), "Plan: 0 to add, 1 to change, 0 to destroy.");
    }
}
