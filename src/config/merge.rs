//! Folding config layers into one value
//!
//! Layers arrive lowest precedence first: the built-in `store`/`lint`
//! defaults, then `~/.config/jx/pipeline.toml`, then the repo's
//! `.jx/pipeline.toml` (or the `--config` file), then CLI flags such as
//! `--store`. Tables merge key by key. Any other value in a later layer,
//! label key lists included, replaces the earlier one outright.

use serde_json::Value;

/// Overlay `upper` on top of `lower`, returning the merged value.
///
/// `null` in `upper` still replaces whatever `lower` held.
pub fn deep_merge(mut lower: Value, upper: Value) -> Value {
    merge_into(&mut lower, upper);
    lower
}

fn merge_into(lower: &mut Value, upper: Value) {
    match (lower, upper) {
        (Value::Object(table), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match table.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Fold config layers, lowest precedence first
pub fn merge_layers(layers: Vec<Value>) -> Value {
    let mut merged = Value::Null;
    for layer in layers {
        merge_into(&mut merged, layer);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"lint": {"format": "text"}});
        let overlay = json!({"lint": {"format": "json"}});
        let result = deep_merge(base, overlay);
        assert_eq!(result["lint"]["format"], "json");
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "lint": {
                "format": "text",
                "recursive": false
            }
        });
        let overlay = json!({
            "lint": {
                "recursive": true
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["lint"]["recursive"], true);
        assert_eq!(result["lint"]["format"], "text");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({
            "labels": {"owner": ["owner", "lighthouse.jenkins-x.io/refs.org"]}
        });
        let overlay = json!({
            "labels": {"owner": ["org"]}
        });
        let result = deep_merge(base, overlay);

        // no concatenation
        let owner = result["labels"]["owner"].as_array().unwrap();
        assert_eq!(owner.len(), 1);
        assert_eq!(owner[0], "org");
    }

    #[test]
    fn test_add_new_key() {
        let base = json!({"a": 1});
        let overlay = json!({"b": 2});
        let result = deep_merge(base, overlay);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 2);
    }

    #[test]
    fn test_null_override() {
        let base = json!({"store": {"dir": ".jx/activities"}});
        let overlay = json!({"store": {"dir": null}});
        let result = deep_merge(base, overlay);

        assert!(result["store"]["dir"].is_null());
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({
            "store": {"dir": ".jx/activities"},
            "lint": {"format": "text"}
        });
        let host = json!({
            "store": {"dir": "/var/lib/jx"}
        });
        let repo = json!({
            "lint": {"format": "yaml"}
        });
        let cli = json!({
            "store": {"dir": "out"}
        });

        let result = merge_layers(vec![builtin, host, repo, cli]);

        assert_eq!(result["store"]["dir"], "out");
        assert_eq!(result["lint"]["format"], "yaml");
    }

    #[test]
    fn test_nested_deep_merge() {
        let base = json!({
            "labels": {
                "build_id": "lighthouse.jenkins-x.io/buildNum",
                "pod_name": "podName"
            },
            "lint": {"recursive": false}
        });
        let overlay = json!({
            "labels": {
                "pod_name": "tekton.dev/pod",
                "clone_uri": "clone"
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["labels"]["build_id"], "lighthouse.jenkins-x.io/buildNum");
        assert_eq!(result["labels"]["pod_name"], "tekton.dev/pod");
        assert_eq!(result["labels"]["clone_uri"], "clone");
        assert_eq!(result["lint"]["recursive"], false);
    }
}
