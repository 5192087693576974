// ABOUTME: Flattened read-only view of the effective back-office configuration
// ABOUTME: Nested sections become dotted keys; non-string leaves render as JSON text
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::AdminConfig;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One configuration row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRow {
    /// Dotted key, e.g. `dashboard.cache_ttl_secs`
    pub key: String,
    /// Display value
    pub value: String,
}

/// Every setting as `(key, value)` rows ordered by key
///
/// # Errors
///
/// Returns `SerializationError` if the configuration cannot be serialized
pub fn settings_table(config: &AdminConfig) -> AppResult<Vec<SettingRow>> {
    let mut rows = Vec::new();
    flatten("", &serde_json::to_value(config)?, &mut rows);
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(rows)
}

fn flatten(prefix: &str, value: &Value, rows: &mut Vec<SettingRow>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, nested, rows);
            }
        }
        Value::String(text) => rows.push(SettingRow {
            key: prefix.to_owned(),
            value: text.clone(),
        }),
        Value::Number(number) => rows.push(SettingRow {
            key: prefix.to_owned(),
            value: number.to_string(),
        }),
        // Booleans, arrays, nulls and empty objects print as JSON text
        other => rows.push(SettingRow {
            key: prefix.to_owned(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_leaves() {
        let mut rows = Vec::new();
        flatten(
            "",
            &json!({"a": {"b": 1, "c": "x"}, "d": true, "e": [1, 2], "f": null}),
            &mut rows,
        );
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.key.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a.b", "1"),
                ("a.c", "x"),
                ("d", "true"),
                ("e", "[1,2]"),
                ("f", "null"),
            ]
        );
    }
}
