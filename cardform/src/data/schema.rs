//! JSON Schema parsing into the internal node representation.
//!
//! Only the subset of JSON Schema needed to drive a form is understood:
//! `type`, `properties`, `items`, `enum`, `format`, `default`, `title` and
//! `description`. Everything else is ignored without error so that schemas
//! carrying extra metadata still load.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    data::{
        doc::Doc,
        path::{Path, Seg},
    },
    error::{FormError, Result},
};

/// The `type` keyword as declared in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl TypeName {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "object" => TypeName::Object,
            "array" => TypeName::Array,
            "string" => TypeName::String,
            "number" => TypeName::Number,
            "integer" => TypeName::Integer,
            "boolean" => TypeName::Boolean,
            _ => return None,
        })
    }
}

/// Rendering dispatch for a schema node, resolved once at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    /// `number` or `integer`.
    Number,
    Boolean,
    /// Any node carrying `enum`, whatever its declared type.
    Enum,
    /// No recognized type; renders nothing.
    #[default]
    Unknown,
}

/// Semantic hint carried by `format`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFormat {
    Uri,
    Email,
    Date,
    DateTime,
    Uuid,
    /// Any format this crate does not interpret, e.g. `uint8`.
    Other(String),
}

impl StringFormat {
    fn parse(s: &str) -> Self {
        match s {
            "uri" => StringFormat::Uri,
            "email" => StringFormat::Email,
            "date" => StringFormat::Date,
            "date-time" => StringFormat::DateTime,
            "uuid" => StringFormat::Uuid,
            other => StringFormat::Other(other.to_string()),
        }
    }
}

/// One node of a parsed schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Declared primitive type, if recognized.
    pub type_name: Option<TypeName>,
    /// Dispatch kind derived from `type` and `enum`.
    pub kind: NodeKind,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Child schemas in declared order.
    pub properties: Option<IndexMap<String, SchemaNode>>,
    /// Element schema for arrays.
    pub items: Option<Box<SchemaNode>>,
    /// Allowed literals in declared order.
    pub enum_values: Option<Vec<Doc>>,
    pub format: Option<StringFormat>,
    /// Literal returned verbatim by the synthesizer.
    pub default: Option<Doc>,
}

impl SchemaNode {
    /// Parses schema text supplied by the user.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SchemaParse`] when the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(FormError::SchemaParse)?;
        Ok(Self::from_value(&value))
    }

    /// Converts a JSON value into a schema node.
    ///
    /// Values that are not objects become [`NodeKind::Unknown`] nodes.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return SchemaNode::default();
        };

        let type_name = match obj.get("type") {
            Some(Value::String(s)) => TypeName::parse(s),
            // `["string", "null"]` style nullable types use the first real type.
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .find_map(TypeName::parse),
            _ => None,
        };

        let properties = obj.get("properties").and_then(Value::as_object).map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), SchemaNode::from_value(v)))
                .collect::<IndexMap<_, _>>()
        });

        let items = obj
            .get("items")
            .map(|v| Box::new(SchemaNode::from_value(v)));

        let enum_values = obj
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(Doc::from).collect::<Vec<_>>());

        let format = obj
            .get("format")
            .and_then(Value::as_str)
            .map(StringFormat::parse);

        let kind = if enum_values.is_some() {
            NodeKind::Enum
        } else {
            match type_name {
                Some(TypeName::Object) => NodeKind::Object,
                Some(TypeName::Array) => NodeKind::Array,
                Some(TypeName::String) => NodeKind::String,
                Some(TypeName::Number | TypeName::Integer) => NodeKind::Number,
                Some(TypeName::Boolean) => NodeKind::Boolean,
                None => NodeKind::Unknown,
            }
        };

        SchemaNode {
            type_name,
            kind,
            title: obj.get("title").and_then(Value::as_str).map(str::to_string),
            description: obj
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            properties,
            items,
            enum_values,
            format,
            default: obj.get("default").map(Doc::from),
        }
    }

    /// Property names in declared order, empty when there are none.
    pub fn property_keys(&self) -> Vec<&str> {
        self.properties
            .as_ref()
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether numeric input for this node should be integral.
    pub fn is_integer(&self) -> bool {
        self.type_name == Some(TypeName::Integer)
    }

    /// The node describing the value at `path`: keys follow `properties`,
    /// indices into array nodes follow `items`.
    ///
    /// An index on any other node looks up its decimal text as a property.
    pub fn resolve(&self, path: &Path) -> Option<&SchemaNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, seg| match (&node.kind, seg) {
                (NodeKind::Array, Seg::Index(_)) => node.items.as_deref(),
                (_, seg) => node.properties.as_ref()?.get(&seg.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_resolution() {
        let node = SchemaNode::from_value(&json!({"type": "string", "format": "email"}));
        assert_eq!(node.kind, NodeKind::String);
        assert_eq!(node.format, Some(StringFormat::Email));

        let node = SchemaNode::from_value(&json!({"type": "integer"}));
        assert_eq!(node.kind, NodeKind::Number);
        assert!(node.is_integer());

        let node = SchemaNode::from_value(&json!({"type": "string", "enum": ["A", "B"]}));
        assert_eq!(node.kind, NodeKind::Enum);
        assert_eq!(node.type_name, Some(TypeName::String));

        let node = SchemaNode::from_value(&json!({"enum": [1, 2]}));
        assert_eq!(node.kind, NodeKind::Enum);
        assert_eq!(node.type_name, None);

        let node = SchemaNode::from_value(&json!({"description": "metadata only"}));
        assert_eq!(node.kind, NodeKind::Unknown);

        let node = SchemaNode::from_value(&json!(true));
        assert_eq!(node, SchemaNode::default());
    }

    #[test]
    fn test_nullable_type_list() {
        let node = SchemaNode::from_value(&json!({"type": ["null", "boolean"]}));
        assert_eq!(node.kind, NodeKind::Boolean);
    }

    #[test]
    fn test_properties_keep_declared_order() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "zulu": {"type": "string"},
                "alpha": {"type": "array", "items": {"type": "number"}},
                "mike": {"type": "boolean", "default": true}
            }
        }));
        assert_eq!(node.property_keys(), vec!["zulu", "alpha", "mike"]);
        let props = node.properties.as_ref().unwrap();
        assert_eq!(props["alpha"].items.as_ref().unwrap().kind, NodeKind::Number);
        assert_eq!(props["mike"].default, Some(Doc::Bool(true)));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = SchemaNode::parse("{\"type\": \"object\",").unwrap_err();
        assert!(matches!(err, FormError::SchemaParse(_)));
    }

    #[test]
    fn test_resolve_follows_properties_and_items() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "authors": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"name": {"type": "string"}}}
                },
                "2024": {"type": "integer"}
            }
        }));
        let name = node.resolve(&"authors.3.name".into()).unwrap();
        assert_eq!(name.kind, NodeKind::String);
        assert_eq!(node.resolve(&"2024".into()).unwrap().kind, NodeKind::Number);
        assert!(node.resolve(&"authors.name".into()).is_none());
        assert!(node.resolve(&"missing".into()).is_none());
        assert!(std::ptr::eq(node.resolve(&Path::root()).unwrap(), &node));
    }

    #[test]
    fn test_unknown_format_is_kept() {
        let node = SchemaNode::parse(r#"{"type": "integer", "format": "uint8"}"#).unwrap();
        assert_eq!(node.format, Some(StringFormat::Other("uint8".into())));
    }
}
