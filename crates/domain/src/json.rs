// crates/domain/src/json.rs

use serde_json::Value;

/// Remove `null` object members recursively.
///
/// The CMS emits `null` for every unset optional attribute; stripping them at
/// ingress lets `#[serde(default)]` apply uniformly. Array elements are kept
/// in place so positional meaning survives.
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                strip_nulls(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                strip_nulls(v);
            }
        }
        _ => {}
    }
}

/// Truthiness the way form payloads express it: `true`, `"true"`, `"on"`, `1`.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "on" | "1" | "yes"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nulls_removed_at_every_depth() {
        let mut v = json!({
            "a": null,
            "b": { "c": null, "d": 1 },
            "e": [ { "f": null }, null ]
        });
        strip_nulls(&mut v);
        assert_eq!(v, json!({ "b": { "d": 1 }, "e": [ {}, null ] }));
    }

    #[test]
    fn truthy_values() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("on"))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(None));
    }
}
