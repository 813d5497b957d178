//! Bridge between OMCL values and JSON.
//!
//! - OMCL → JSON goes through a `serde::Serialize` impl on [`Value`]; tags are
//!   dropped and non-finite floats become `null`.
//! - JSON → OMCL converts a `serde_json::Value`; integers that do not fit `i64`
//!   become floats.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;
use crate::value::{Array, Object, Value, ValueKind};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.kind() {
            ValueKind::None => serializer.serialize_none(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::Int(n) => serializer.serialize_i64(*n),
            ValueKind::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            ValueKind::Float(_) => serializer.serialize_none(),
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for item in array {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ValueKind::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, item) in object {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        let kind = match json {
            serde_json::Value::Null => ValueKind::None,
            serde_json::Value::Bool(b) => ValueKind::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ValueKind::Int(i),
                None => ValueKind::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ValueKind::String(s),
            serde_json::Value::Array(items) => {
                ValueKind::Array(items.into_iter().map(Value::from).collect::<Array>())
            }
            serde_json::Value::Object(map) => ValueKind::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Object>(),
            ),
        };
        Value::new(kind)
    }
}

/// Pretty-printed JSON for `value`.
pub fn to_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parse JSON text into an OMCL value.
pub fn from_json(json: &str) -> Result<Value> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    Ok(Value::from(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_are_dropped() {
        let value = Value::from(3).with_tag("Meters");
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(3));
    }

    #[test]
    fn huge_unsigned_becomes_float() {
        let value = Value::from(json!(u64::MAX));
        assert!(matches!(value.kind(), ValueKind::Float(_)));
    }
}
