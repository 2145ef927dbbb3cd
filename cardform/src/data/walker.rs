//! Schema walker producing the editable field tree.
//!
//! The walker never fails: every combination of schema node and document
//! value has a defined outcome, possibly "no field". Values whose shape
//! disagrees with the schema are rendered as if absent and the disagreement
//! is recorded on the field.

use std::sync::LazyLock;

use crate::data::{
    doc::Doc,
    field::{Field, InputHint, NumericEntry, ShapeMismatch, Widget},
    path::Path,
    schema::{NodeKind, SchemaNode, StringFormat},
};

/// Schema used for array elements whose `items` carries no recognized type.
static UNTYPED_ITEM: LazyLock<SchemaNode> = LazyLock::new(SchemaNode::default);

/// Stand-in for a blank object element, so its properties get fields.
static EMPTY_OBJECT: LazyLock<Doc> = LazyLock::new(Doc::empty_object);

/// Builds the fields for every property of an object schema.
///
/// Properties are visited in declared order. A schema without `properties`,
/// or a value that is absent or not an object, yields no fields.
pub fn build_field_tree<'a>(
    schema: &'a SchemaNode,
    doc: Option<&'a Doc>,
    prefix: &Path,
) -> Vec<Field<'a>> {
    let (Some(props), Some(Doc::Object(map))) = (&schema.properties, doc) else {
        return Vec::new();
    };

    props
        .iter()
        .filter_map(|(key, node)| build_field(key, node, map.get(key), prefix.key(key)))
        .collect()
}

/// Builds the field for one schema node bound to `value` at `path`.
///
/// Returns `None` for nodes with neither a recognized type nor an `enum`.
pub fn build_field<'a>(
    key: &str,
    node: &'a SchemaNode,
    value: Option<&'a Doc>,
    path: Path,
) -> Option<Field<'a>> {
    let present = value.filter(|v| !v.is_blank());

    let (widget, mismatch) = match node.kind {
        NodeKind::Enum => {
            let options = node.enum_values.as_deref().unwrap_or_default();
            let selected = value.and_then(|v| options.iter().position(|o| o == v));
            (Widget::Choice { options, selected }, None)
        }
        NodeKind::Boolean => match present {
            Some(Doc::Bool(checked)) => (Widget::Toggle { checked: *checked }, None),
            other => (
                Widget::Toggle { checked: false },
                other.map(|v| shape_mismatch("boolean", v)),
            ),
        },
        NodeKind::String => {
            let hint = input_hint(node.format.as_ref());
            match value {
                Some(Doc::String(s)) => (Widget::Text { hint, text: s.clone() }, None),
                None | Some(Doc::Null) => (Widget::Text { hint, text: String::new() }, None),
                Some(other) => {
                    let text = match other {
                        Doc::Number(_) | Doc::Bool(_) => other.to_string(),
                        _ => String::new(),
                    };
                    (Widget::Text { hint, text }, Some(shape_mismatch("string", other)))
                }
            }
        }
        NodeKind::Number => {
            let integer = node.is_integer();
            match present {
                Some(Doc::Number(n)) => (
                    Widget::Numeric {
                        integer,
                        entry: NumericEntry::Value(n.clone()),
                    },
                    None,
                ),
                other => (
                    Widget::Numeric {
                        integer,
                        entry: NumericEntry::Empty,
                    },
                    other.map(|v| shape_mismatch("number", v)),
                ),
            }
        }
        NodeKind::Array => {
            let (items, found) = match present {
                Some(Doc::Array(items)) => (items.as_slice(), None),
                other => (&[][..], other.map(|v| shape_mismatch("array", v))),
            };
            let item_schema = node.items.as_deref().unwrap_or(&*UNTYPED_ITEM);
            let elements = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| build_element(i, item_schema, item, path.index(i)))
                .collect();
            (Widget::List { elements }, found)
        }
        NodeKind::Object => {
            let children = build_field_tree(node, present, &path);
            let found = present
                .filter(|v| v.as_object().is_none())
                .map(|v| shape_mismatch("object", v));
            (Widget::Group { children }, found)
        }
        NodeKind::Unknown => {
            trace!("skipping `{path}`: no renderable type");
            return None;
        }
    };

    if let Some(m) = &mismatch {
        debug!("`{path}`: {m}, rendering as empty");
    }

    Some(Field {
        key: key.to_string(),
        label: node.title.clone().unwrap_or_else(|| key.to_string()),
        path,
        schema: node,
        value,
        widget,
        mismatch,
    })
}

fn build_element<'a>(
    index: usize,
    item_schema: &'a SchemaNode,
    item: &'a Doc,
    path: Path,
) -> Option<Field<'a>> {
    let key = index.to_string();
    match item_schema.kind {
        // Untyped items still get an editor: plain text.
        NodeKind::Unknown => {
            let (text, found) = match item {
                Doc::String(s) => (s.clone(), None),
                Doc::Null => (String::new(), None),
                other => (other.to_string(), Some(shape_mismatch("string", other))),
            };
            Some(Field {
                label: key.clone(),
                key,
                path,
                schema: item_schema,
                value: Some(item),
                widget: Widget::Text {
                    hint: InputHint::Plain,
                    text,
                },
                mismatch: found,
            })
        }
        // A freshly appended placeholder is filled in through its children.
        NodeKind::Object if item.is_blank() => {
            let children = build_field_tree(item_schema, Some(&*EMPTY_OBJECT), &path);
            Some(Field {
                label: item_schema.title.clone().unwrap_or_else(|| key.clone()),
                key,
                path,
                schema: item_schema,
                value: Some(item),
                widget: Widget::Group { children },
                mismatch: None,
            })
        }
        _ => build_field(&key, item_schema, Some(item), path),
    }
}

fn input_hint(format: Option<&StringFormat>) -> InputHint {
    match format {
        Some(StringFormat::Email) => InputHint::Email,
        Some(StringFormat::Uri) => InputHint::Uri,
        Some(StringFormat::Date) => InputHint::Date,
        Some(StringFormat::DateTime) => InputHint::DateTime,
        _ => InputHint::Plain,
    }
}

fn shape_mismatch(expected: &'static str, found: &Doc) -> ShapeMismatch {
    ShapeMismatch {
        expected,
        found: found.type_name(),
    }
}
