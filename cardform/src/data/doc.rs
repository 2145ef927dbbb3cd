use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};
use serde_json::{Number, Value};

/// Ordered mapping used for document objects.
pub type Map = IndexMap<String, Doc>;

/// A document value with reference-counted containers.
///
/// Cloning a `Doc` never copies nested containers: arrays and objects are
/// held behind an [`Arc`], so two document versions produced by the mutation
/// engine share every subtree that was not on the written path.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Doc {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// Ordered sequence.
    Array(Arc<Vec<Doc>>),
    /// Insertion-ordered mapping.
    Object(Arc<Map>),
}

impl Doc {
    /// Builds an object from key/value pairs, keeping their order.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Doc)>) -> Self {
        Doc::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Builds an array from items.
    pub fn array(items: impl IntoIterator<Item = Doc>) -> Self {
        Doc::Array(Arc::new(items.into_iter().collect()))
    }

    /// An empty object.
    pub fn empty_object() -> Self {
        Doc::Object(Arc::new(Map::new()))
    }

    /// An empty array.
    pub fn empty_array() -> Self {
        Doc::Array(Arc::new(Vec::new()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Doc::Null)
    }

    /// `null` and the empty string both mean "nothing entered yet".
    pub fn is_blank(&self) -> bool {
        match self {
            Doc::Null => true,
            Doc::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Doc::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Doc::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Doc::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Doc]> {
        match self {
            Doc::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Doc::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key when this is an object.
    pub fn get(&self, key: &str) -> Option<&Doc> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Doc::Null => "null",
            Doc::Bool(_) => "boolean",
            Doc::Number(_) => "number",
            Doc::String(_) => "string",
            Doc::Array(_) => "array",
            Doc::Object(_) => "object",
        }
    }

    /// Returns true when both values are the same shared container.
    ///
    /// Scalars never share identity and always return false.
    pub fn ptr_eq(&self, other: &Doc) -> bool {
        match (self, other) {
            (Doc::Array(a), Doc::Array(b)) => Arc::ptr_eq(a, b),
            (Doc::Object(a), Doc::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Converts the document into a `serde_json::Value`.
    pub fn to_json(&self) -> Value {
        match self {
            Doc::Null => Value::Null,
            Doc::Bool(b) => Value::Bool(*b),
            Doc::Number(n) => Value::Number(n.clone()),
            Doc::String(s) => Value::String(s.clone()),
            Doc::Array(items) => Value::Array(items.iter().map(Doc::to_json).collect()),
            Doc::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Doc {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Doc::Null,
            Value::Bool(b) => Doc::Bool(*b),
            Value::Number(n) => Doc::Number(n.clone()),
            Value::String(s) => Doc::String(s.clone()),
            Value::Array(items) => Doc::array(items.iter().map(Doc::from)),
            Value::Object(map) => Doc::object(map.iter().map(|(k, v)| (k.clone(), Doc::from(v)))),
        }
    }
}

impl From<Value> for Doc {
    fn from(value: Value) -> Self {
        Doc::from(&value)
    }
}

impl From<&str> for Doc {
    fn from(s: &str) -> Self {
        Doc::String(s.to_string())
    }
}

impl From<String> for Doc {
    fn from(s: String) -> Self {
        Doc::String(s)
    }
}

impl From<bool> for Doc {
    fn from(b: bool) -> Self {
        Doc::Bool(b)
    }
}

impl From<i64> for Doc {
    fn from(n: i64) -> Self {
        Doc::Number(Number::from(n))
    }
}

impl From<f64> for Doc {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Doc::Number).unwrap_or(Doc::Null)
    }
}

impl fmt::Display for Doc {
    /// Strings are shown raw, everything else as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Doc::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Doc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Doc::Null => serializer.serialize_unit(),
            Doc::Bool(b) => serializer.serialize_bool(*b),
            Doc::Number(n) => n.serialize(serializer),
            Doc::String(s) => serializer.serialize_str(s),
            Doc::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Doc::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Doc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Doc::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let doc = Doc::from(json!({"zeta": 1, "alpha": [true, null], "mid": {"x": "y"}}));
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            doc.to_json(),
            json!({"zeta": 1, "alpha": [true, null], "mid": {"x": "y"}})
        );
    }

    #[test]
    fn test_blank_values() {
        assert!(Doc::Null.is_blank());
        assert!(Doc::from("").is_blank());
        assert!(!Doc::from(" ").is_blank());
        assert!(!Doc::from(0i64).is_blank());
        assert!(!Doc::Bool(false).is_blank());
    }

    #[test]
    fn test_clone_shares_containers() {
        let doc = Doc::from(json!({"a": {"b": [1, 2]}}));
        let copy = doc.clone();
        assert!(doc.ptr_eq(&copy));
        assert!(doc.get("a").unwrap().ptr_eq(copy.get("a").unwrap()));
        assert!(!Doc::from(1i64).ptr_eq(&Doc::from(1i64)));
    }

    #[test]
    fn test_serde_matches_value() {
        let value = json!({"name": "card", "tags": ["a", "b"], "score": 0.5, "ok": false});
        let doc: Doc = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            serde_json::to_string(&value).unwrap()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Doc::from("plain").to_string(), "plain");
        assert_eq!(Doc::from(3i64).to_string(), "3");
        assert_eq!(Doc::from(json!([1, "x"])).to_string(), r#"[1,"x"]"#);
        assert_eq!(Doc::from(f64::NAN), Doc::Null);
    }
}
