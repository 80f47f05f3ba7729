//! Deep merge of `allOf` object results.

use serde_json::{Map, Value};

/// Merge `source` into `target`, last write wins.
///
/// Nested objects merge key by key; any other value (arrays included)
/// replaces what was there.
pub(crate) fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match incoming {
            Value::Object(nested) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => deep_merge(existing, nested),
                _ => {
                    target.insert(key, Value::Object(nested));
                }
            },
            other => {
                target.insert(key, other);
            }
        }
    }
}
