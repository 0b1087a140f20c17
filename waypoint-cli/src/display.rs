//! Plan and effect output

use std::collections::HashMap;

use colored::Colorize;
use waypoint_core::differ::{Diff, diff};
use waypoint_core::effect::Effect;
use waypoint_core::plan::Plan;
use waypoint_core::resource::Value;

use crate::config::Schemas;

pub fn format_effect(effect: &Effect) -> String {
    match effect {
        Effect::Read(r) => format!("{} data.{}", "<=".cyan().bold(), r.id),
        Effect::Create(r) => format!("{} {}", "+".green().bold(), r.id),
        Effect::Update { id, .. } => format!("{} {}", "~".yellow().bold(), id),
        Effect::Delete(state) => format!("{} {}", "-".red().bold(), state.id),
    }
}

/// Render a value for display, map keys sorted
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let strs: Vec<_> = keys
                .into_iter()
                .map(|k| format!("{}: {}", k, format_value(&map[k])))
                .collect();
            format!("{{{}}}", strs.join(", "))
        }
    }
}

/// One `key: value` line per attribute, sorted, sensitive values redacted
pub fn attribute_lines(
    schemas: &Schemas,
    resource_type: &str,
    data_source: bool,
    attributes: &HashMap<String, Value>,
) -> Vec<String> {
    let shown = schemas.redact(resource_type, data_source, attributes);
    let mut entries: Vec<_> = shown.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(k, v)| format!("{}: {}", k, format_value(v)))
        .collect()
}

/// Attribute lines shown under an effect, sensitive values redacted
pub fn effect_details(effect: &Effect, schemas: &Schemas) -> Vec<String> {
    match effect {
        Effect::Read(r) => attribute_lines(schemas, &r.id.resource_type, true, &r.attributes),
        Effect::Create(r) => attribute_lines(schemas, &r.id.resource_type, false, &r.attributes),
        Effect::Update { from, to, .. } => {
            let Diff::Update {
                changed_attributes, ..
            } = diff(to, from, schemas.get(&to.id.resource_type, false))
            else {
                return Vec::new();
            };
            let old = schemas.redact(&from.id.resource_type, false, &from.attributes);
            let new = schemas.redact(&to.id.resource_type, false, &to.attributes);
            changed_attributes
                .iter()
                .map(|key| {
                    let before = old
                        .get(key)
                        .map(format_value)
                        .unwrap_or_else(|| "(none)".to_string());
                    let after = new
                        .get(key)
                        .map(format_value)
                        .unwrap_or_else(|| "(none)".to_string());
                    format!("{}: {} -> {}", key, before, after)
                })
                .collect()
        }
        Effect::Delete(_) => Vec::new(),
    }
}

pub fn print_plan(plan: &Plan, schemas: &Schemas) {
    if !plan.has_changes() {
        println!("{}", "No changes. Infrastructure is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();
    for effect in plan.effects() {
        println!("  {}", format_effect(effect));
        for line in effect_details(effect, schemas) {
            println!("      {}", line);
        }
    }
    println!();
    println!("{}", plan.summary().to_string().bold());
}
