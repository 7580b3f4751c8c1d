//! Schema versioning for stored records.
//!
//! Records written by this crate carry a `schemaVersion` field. Records
//! without one are version 0: whatever the site stored before versions
//! existed. [`upgrade`] walks a raw record through each
//! [`Record::migrate`] step until it reaches the current version, so legacy
//! data never has to be rewritten in place.

use serde_json::{Map, Value};
use tracing::{trace, warn};

use super::Record;

/// Field holding a record's schema version.
pub const VERSION_FIELD: &str = "schemaVersion";

/// Schema version of a raw stored record.
#[must_use]
pub fn stored_version(value: &Value) -> u32 {
    value
        .get(VERSION_FIELD)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Upgrade a raw record to `R::SCHEMA_VERSION`.
///
/// Records from a newer schema are passed through untouched.
#[must_use]
pub fn upgrade<R: Record>(mut value: Value) -> Value {
    let mut version = stored_version(&value);
    if version > R::SCHEMA_VERSION {
        warn!(
            collection = R::NAME,
            version,
            current = R::SCHEMA_VERSION,
            "Record written by a newer schema; decoding as-is"
        );
        return value;
    }
    while version < R::SCHEMA_VERSION {
        trace!(collection = R::NAME, from = version, "Migrating record");
        value = R::migrate(value, version);
        version += 1;
    }
    stamp(&mut value, R::SCHEMA_VERSION);
    value
}

/// Write the schema version into a raw record.
pub fn stamp(value: &mut Value, version: u32) {
    if let Value::Object(map) = value {
        map.insert(VERSION_FIELD.to_string(), Value::from(version));
    }
}

// Coercion helpers shared by the per-record migrations.

/// Turn a numeric string into a number. Leaves anything else alone.
pub(crate) fn number_from_string(map: &mut Map<String, Value>, field: &str) {
    if let Some(Value::String(s)) = map.get(field) {
        if let Ok(n) = s.trim().parse::<i64>() {
            map.insert(field.to_string(), Value::from(n));
        }
    }
}

/// Coerce an optional integer field: numeric strings become numbers,
/// floats are truncated, and anything unusable is removed.
pub(crate) fn optional_integer(map: &mut Map<String, Value>, field: &str) {
    let coerced = match map.get(field) {
        None => return,
        Some(Value::Number(n)) if n.is_i64() => return,
        Some(Value::Number(n)) => n.as_f64().map(|f| {
            // Truncation is the intent for fractional sort keys.
            #[allow(clippy::cast_possible_truncation)]
            let i = f as i64;
            Value::from(i)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        Some(_) => None,
    };
    match coerced {
        Some(v) => {
            map.insert(field.to_string(), v);
        }
        None => {
            map.remove(field);
        }
    }
}

/// Render a number stored where a string is expected.
pub(crate) fn string_from_number(map: &mut Map<String, Value>, field: &str) {
    if let Some(Value::Number(n)) = map.get(field) {
        let s = n.to_string();
        map.insert(field.to_string(), Value::String(s));
    }
}

/// Wrap a lone string stored where a list is expected; drop nulls.
pub(crate) fn list_from_scalar(map: &mut Map<String, Value>, field: &str) {
    match map.get(field) {
        Some(Value::String(s)) => {
            let items: Vec<Value> = s
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Value::String(line.to_string()))
                .collect();
            map.insert(field.to_string(), Value::Array(items));
        }
        Some(Value::Null) => {
            map.remove(field);
        }
        _ => {}
    }
}

/// Copy `from` into `to` when `to` is missing.
pub(crate) fn rename_if_missing(map: &mut Map<String, Value>, from: &str, to: &str) {
    if !map.contains_key(to) {
        if let Some(v) = map.remove(from) {
            map.insert(to.to_string(), v);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stored_version() {
        assert_eq!(stored_version(&json!({"id": 1})), 0);
        assert_eq!(stored_version(&json!({"schemaVersion": 3})), 3);
        assert_eq!(stored_version(&json!({"schemaVersion": "x"})), 0);
    }

    #[test]
    fn test_stamp_only_objects() {
        let mut obj = json!({});
        stamp(&mut obj, 2);
        assert_eq!(obj, json!({"schemaVersion": 2}));

        let mut arr = json!([]);
        stamp(&mut arr, 2);
        assert_eq!(arr, json!([]));
    }

    #[test]
    fn test_optional_integer() {
        let mut map = json!({"a": "7", "b": 2.9, "c": "x", "d": 4, "e": null})
            .as_object()
            .cloned()
            .unwrap();
        for field in ["a", "b", "c", "d", "e", "missing"] {
            optional_integer(&mut map, field);
        }
        assert_eq!(map.get("a"), Some(&json!(7)));
        assert_eq!(map.get("b"), Some(&json!(2)));
        assert_eq!(map.get("c"), None);
        assert_eq!(map.get("d"), Some(&json!(4)));
        assert_eq!(map.get("e"), None);
    }

    #[test]
    fn test_list_from_scalar() {
        let mut map = json!({"benefits": "Fast\n\n Clean \n", "faq": null})
            .as_object()
            .cloned()
            .unwrap();
        list_from_scalar(&mut map, "benefits");
        list_from_scalar(&mut map, "faq");
        assert_eq!(map["benefits"], json!(["Fast", "Clean"]));
        assert!(!map.contains_key("faq"));
    }

    #[test]
    fn test_rename_if_missing() {
        let mut map = json!({"name": "Ada"}).as_object().cloned().unwrap();
        rename_if_missing(&mut map, "name", "author");
        assert_eq!(map, json!({"author": "Ada"}).as_object().cloned().unwrap());

        let mut both = json!({"name": "A", "author": "B"})
            .as_object()
            .cloned()
            .unwrap();
        rename_if_missing(&mut both, "name", "author");
        assert_eq!(both["author"], json!("B"));
        assert_eq!(both["name"], json!("A"));
    }
}
