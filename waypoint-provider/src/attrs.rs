//! Reading and building attribute maps

use std::collections::HashMap;

use waypoint_core::resource::Value;

pub(crate) type Attributes = HashMap<String, Value>;

pub(crate) fn string(attrs: &Attributes, key: &str) -> String {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn flag(attrs: &Attributes, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn int(attrs: &Attributes, key: &str) -> i64 {
    attrs.get(key).and_then(Value::as_int).unwrap_or(0)
}

/// Non-negative integer as seconds; negative values read as zero
pub(crate) fn seconds(attrs: &Attributes, key: &str) -> u64 {
    u64::try_from(int(attrs, key)).unwrap_or(0)
}

pub(crate) fn string_list(attrs: &Attributes, key: &str) -> Vec<String> {
    attrs
        .get(key)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn string_map(attrs: &Attributes, key: &str) -> HashMap<String, String> {
    attrs
        .get(key)
        .and_then(Value::as_map)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// First item of a block attribute
pub(crate) fn block<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a Attributes> {
    attrs
        .get(key)
        .and_then(Value::as_list)
        .and_then(|items| items.first())
        .and_then(Value::as_map)
}

pub(crate) fn list_value(items: &[String]) -> Value {
    Value::List(items.iter().map(|s| Value::from(s.as_str())).collect())
}

pub(crate) fn map_value(map: &HashMap<String, String>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect(),
    )
}

/// A single-item block value
pub(crate) fn block_value(item: Attributes) -> Value {
    Value::List(vec![Value::Map(item)])
}

/// Keep values the server never echoes back
///
/// For every `(block, field)` where the freshly read block item has an empty
/// value, the value from `prior` is carried over.
pub(crate) fn carry_over_secrets(
    read: &mut Attributes,
    prior: &Attributes,
    fields: &[(&str, &str)],
) {
    for (block_name, field) in fields {
        let Some(prior_value) = block(prior, block_name)
            .and_then(|item| item.get(*field))
            .filter(|v| !v.is_empty())
        else {
            continue;
        };
        let Some(Value::List(items)) = read.get_mut(*block_name) else {
            continue;
        };
        if let Some(Value::Map(item)) = items.first_mut()
            && item.get(*field).is_none_or(Value::is_empty)
        {
            item.insert(field.to_string(), prior_value.clone());
        }
    }
}

/// Carry a top-level value over from `prior` when the read value is empty
pub(crate) fn carry_over_secret(read: &mut Attributes, prior: &Attributes, key: &str) {
    if read.get(key).is_none_or(Value::is_empty)
        && let Some(value) = prior.get(key).filter(|v| !v.is_empty())
    {
        read.insert(key.to_string(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: Vec<(&str, Value)>) -> Attributes {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn missing_values_read_as_defaults() {
        let empty = Attributes::new();
        assert_eq!(string(&empty, "x"), "");
        assert!(!flag(&empty, "x"));
        assert_eq!(int(&empty, "x"), 0);
        assert!(string_list(&empty, "x").is_empty());
        assert!(string_map(&empty, "x").is_empty());
        assert!(block(&empty, "x").is_none());
    }

    #[test]
    fn negative_seconds_read_as_zero() {
        let a = attrs(vec![("poll", Value::Int(-5))]);
        assert_eq!(seconds(&a, "poll"), 0);
    }

    #[test]
    fn block_returns_first_item() {
        let item = attrs(vec![("git_url", Value::from("https://example.com"))]);
        let a = attrs(vec![("data_source_git", block_value(item))]);
        assert_eq!(
            string(block(&a, "data_source_git").unwrap(), "git_url"),
            "https://example.com"
        );
    }

    #[test]
    fn secrets_carry_over_when_not_echoed() {
        let prior = attrs(vec![(
            "git_auth_basic",
            block_value(attrs(vec![
                ("username", Value::from("rob")),
                ("password", Value::from("hunter2")),
            ])),
        )]);
        let mut read = attrs(vec![(
            "git_auth_basic",
            block_value(attrs(vec![
                ("username", Value::from("rob")),
                ("password", Value::from("")),
            ])),
        )]);

        carry_over_secrets(&mut read, &prior, &[("git_auth_basic", "password")]);
        assert_eq!(
            string(block(&read, "git_auth_basic").unwrap(), "password"),
            "hunter2"
        );
    }

    #[test]
    fn echoed_secret_is_kept() {
        let prior = attrs(vec![("client_secret", Value::from("old"))]);
        let mut read = attrs(vec![("client_secret", Value::from("new"))]);
        carry_over_secret(&mut read, &prior, "client_secret");
        assert_eq!(string(&read, "client_secret"), "new");
    }
}
