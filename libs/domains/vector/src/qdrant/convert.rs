//! JSON <-> Qdrant payload values. Nested objects and arrays are kept
//! structured so metadata round-trips unchanged.
//!
//! Qdrant integers are `i64`; unsigned values above `i64::MAX` are stored as
//! their decimal string and read back as strings.

use std::collections::HashMap;

use qdrant_client::qdrant::{self, Value as QdrantValue, value::Kind};
use serde_json::{Map, Number, Value};

pub fn json_to_qdrant(value: Value) -> QdrantValue {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Kind::IntegerValue(i),
            (None, Some(_)) => Kind::StringValue(n.to_string()),
            (None, None) => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(qdrant::ListValue {
            values: items.into_iter().map(json_to_qdrant).collect(),
        }),
        Value::Object(map) => Kind::StructValue(qdrant::Struct {
            fields: map_to_payload(map),
        }),
    };

    QdrantValue { kind: Some(kind) }
}

pub fn qdrant_to_json(value: QdrantValue) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(payload_to_map(s.fields)),
    }
}

pub fn map_to_payload(map: Map<String, Value>) -> HashMap<String, QdrantValue> {
    map.into_iter()
        .map(|(key, value)| (key, json_to_qdrant(value)))
        .collect()
}

pub fn payload_to_map(payload: HashMap<String, QdrantValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, qdrant_to_json(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_metadata_round_trips() {
        let metadata = json!({
            "title": "Doc",
            "views": 42,
            "rating": 4.5,
            "draft": false,
            "missing": null,
            "tags": ["a", "b", {"deep": [1, 2]}],
            "author": {"name": "Ada", "ids": [7]}
        });
        let map = metadata.as_object().cloned().unwrap();

        let restored = payload_to_map(map_to_payload(map.clone()));
        assert_eq!(restored, map);
    }

    #[test]
    fn test_integers_stay_integers() {
        let value = json_to_qdrant(json!(3));
        assert!(matches!(value.kind, Some(Kind::IntegerValue(3))));
        assert_eq!(qdrant_to_json(value), json!(3));
    }

    #[test]
    fn test_large_unsigned_keeps_exact_digits() {
        let value = json_to_qdrant(json!(u64::MAX));
        assert!(matches!(&value.kind, Some(Kind::StringValue(s)) if s == "18446744073709551615"));
        assert_eq!(qdrant_to_json(value), json!("18446744073709551615"));
    }

    #[test]
    fn test_missing_kind_is_null() {
        assert_eq!(qdrant_to_json(QdrantValue { kind: None }), Value::Null);
    }
}
