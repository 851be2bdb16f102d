//! JSON to Bolt value conversion for record properties.
//!
//! Neo4j properties hold scalars or homogeneous lists of scalars. Lists mixing
//! integers and floats become float lists. Objects, nested lists and any other
//! mixed list are stored as JSON strings.

use std::collections::HashMap;
use std::mem::discriminant;

use gsync_core::MappedData;
use neo4rs::{BoltFloat, BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value;

/// Convert one mapped field value into a property value.
pub fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => number_to_bolt(n),
        Value::String(s) => BoltType::from(s.clone()),
        Value::Array(items) => match list_to_bolt(items) {
            Some(list) => BoltType::List(list),
            None => BoltType::from(value.to_string()),
        },
        Value::Object(_) => BoltType::from(value.to_string()),
    }
}

fn number_to_bolt(n: &serde_json::Number) -> BoltType {
    if let Some(i) = n.as_i64() {
        BoltType::from(i)
    } else if let Some(f) = n.as_f64() {
        BoltType::from(f)
    } else {
        // u64 above i64::MAX
        BoltType::from(n.to_string())
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// A property list, or `None` when the items cannot share one element type.
fn list_to_bolt(items: &[Value]) -> Option<BoltList> {
    if !items.iter().all(is_scalar) {
        return None;
    }
    let value: Vec<BoltType> = items.iter().map(to_bolt).collect();

    let homogeneous = value
        .windows(2)
        .all(|pair| discriminant(&pair[0]) == discriminant(&pair[1]));
    if homogeneous {
        return Some(BoltList { value });
    }

    value
        .into_iter()
        .map(|item| match item {
            BoltType::Integer(i) => Some(BoltType::Float(BoltFloat::new(i.value as f64))),
            BoltType::Float(f) => Some(BoltType::Float(f)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|value| BoltList { value })
}

/// Build the property map applied with `SET n += $props`.
///
/// Null values stay in the map so the matching property is removed.
pub fn properties(fields: &MappedData) -> BoltMap {
    let value: HashMap<BoltString, BoltType> = fields
        .iter()
        .map(|(k, v)| (BoltString::new(k), to_bolt(v)))
        .collect();
    BoltMap { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(to_bolt(&json!(null)), BoltType::Null(BoltNull));
        assert_eq!(to_bolt(&json!(true)), BoltType::from(true));
        assert_eq!(to_bolt(&json!(7)), BoltType::from(7_i64));
        assert_eq!(to_bolt(&json!(1.5)), BoltType::from(1.5_f64));
        assert_eq!(to_bolt(&json!("Ana")), BoltType::from("Ana".to_string()));
    }

    #[test]
    fn test_scalar_list_stays_list() {
        let bolt = to_bolt(&json!(["a", "b"]));
        match bolt {
            BoltType::List(list) => assert_eq!(list.value.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_list_becomes_json() {
        assert_eq!(to_bolt(&json!([1, "a"])), BoltType::from(r#"[1,"a"]"#.to_string()));
        assert_eq!(to_bolt(&json!([true, 0])), BoltType::from("[true,0]".to_string()));
    }

    #[test]
    fn test_int_and_float_list_becomes_float_list() {
        let bolt = to_bolt(&json!([1, 1.5]));
        assert_eq!(
            bolt,
            BoltType::List(BoltList {
                value: vec![BoltType::from(1.0_f64), BoltType::from(1.5_f64)],
            })
        );
    }

    #[test]
    fn test_objects_and_nested_lists_become_json() {
        assert_eq!(
            to_bolt(&json!({"city": "Lisbon"})),
            BoltType::from(r#"{"city":"Lisbon"}"#.to_string())
        );
        assert_eq!(to_bolt(&json!([[1, 2]])), BoltType::from("[[1,2]]".to_string()));
    }

    #[test]
    fn test_properties_keep_nulls() {
        let mut fields = MappedData::new();
        fields.insert("name".to_string(), json!("Ana"));
        fields.insert("nickname".to_string(), json!(null));

        let map = properties(&fields);
        assert_eq!(map.value.len(), 2);
        assert_eq!(map.value.get(&BoltString::new("nickname")), Some(&BoltType::Null(BoltNull)));
    }
}
