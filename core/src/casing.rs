//! camelCase <-> snake_case key translation.
//!
//! BambooHR speaks camelCase (`firstName`, `workEmail`). Clients configured
//! with `underscore_keys` see snake_case instead; inputs are converted back
//! before they are validated and encoded.

use serde_json::{Map, Value};

/// `first_name` -> `firstName`. Only an underscore followed by an ASCII
/// lowercase letter is folded; `a_1` and trailing underscores stay as-is.
pub fn to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// `workPhone2Ext` -> `work_phone2_ext`. An underscore goes before every
/// uppercase letter that follows a lowercase letter or a digit, then the
/// whole string is lowercased.
pub fn to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_lowercase() || p.is_ascii_digit() {
                    out.push('_');
                }
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out.to_lowercase()
}

/// Convert every mapping key to camelCase, recursing into nested mappings
/// and into mapping elements of arrays.
pub fn camelcase_keys(value: Value) -> Value {
    convert_keys(value, &to_camel)
}

/// Convert every mapping key to snake_case, recursing like `camelcase_keys`.
pub fn underscore_keys(value: Value) -> Value {
    convert_keys(value, &to_snake)
}

/// Key conversion for a top-level record.
pub fn convert_map(map: Map<String, Value>, convert: &dyn Fn(&str) -> String) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (convert(&k), convert_keys(v, convert)))
        .collect()
}

fn convert_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(convert_map(map, convert)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(_) => convert_keys(item, convert),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}
