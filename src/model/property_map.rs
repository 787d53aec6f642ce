//! PropertyMap: the key-value store on nodes and relationships.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Build a `PropertyMap` from a flat JSON object; non-objects give an empty map.
pub fn from_json_object(json: serde_json::Value) -> PropertyMap {
    match json {
        serde_json::Value::Object(map) => map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        _ => PropertyMap::new(),
    }
}

/// Build a `PropertyMap` from `(key, value)` pairs.
pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
