/*!
Localized string lookup over a flat dot-separated key space
(`"registration.registration_validation_username_instructions"`). The English
table is embedded; unknown keys fall back to the key itself so a missing
translation never hides a message entirely.
*/

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

static STRINGS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let table: Value = serde_json::from_str(include_str!("../locale/en.json"))
        .unwrap_or_else(|_| Value::Object(Default::default()));
    let mut strings = HashMap::new();
    flatten("", &table, &mut strings);
    strings
});

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        _ => {}
    }
}

/// Look up a localized string by key.
pub fn translate(key: &str) -> String {
    STRINGS.get(key).cloned().unwrap_or_else(|| key.to_string())
}
