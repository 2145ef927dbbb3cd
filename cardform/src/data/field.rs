use std::fmt;

use serde_json::Number;

use crate::{
    data::{doc::Doc, mutation::Edit, path::Path, schema::SchemaNode},
    error::{FormError, Result},
};

/// Presentation hint for text inputs, derived from `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHint {
    Plain,
    Email,
    Uri,
    Date,
    DateTime,
}

/// Current content of a numeric input.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericEntry {
    /// Nothing entered yet. Stored as the empty string.
    Empty,
    Value(Number),
}

/// What a field looks like and which value it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget<'a> {
    /// Closed choice among `enum` literals.
    Choice {
        options: &'a [Doc],
        selected: Option<usize>,
    },
    /// Two-state toggle.
    Toggle { checked: bool },
    /// Single-line text input.
    Text { hint: InputHint, text: String },
    /// Numeric input.
    Numeric { integer: bool, entry: NumericEntry },
    /// Array editor; each element is a field rooted at `path.index`.
    List { elements: Vec<Field<'a>> },
    /// Collapsible group of child fields.
    Group { children: Vec<Field<'a>> },
}

/// Disagreement between the schema and the document, recovered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

/// One renderable pairing of a schema node with a document value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Property name, or the element index for array elements.
    pub key: String,
    /// `title` of the schema node, falling back to the key.
    pub label: String,
    /// Absolute path from the document root.
    pub path: Path,
    pub schema: &'a SchemaNode,
    /// Value found at `path`, if any.
    pub value: Option<&'a Doc>,
    pub widget: Widget<'a>,
    pub mismatch: Option<ShapeMismatch>,
}

impl<'a> Field<'a> {
    /// Nested fields of groups and lists.
    pub fn children(&self) -> &[Field<'a>] {
        match &self.widget {
            Widget::List { elements } => elements,
            Widget::Group { children } => children,
            _ => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.widget, Widget::List { .. })
    }

    /// Stores `value` at this field's path.
    pub fn set(&self, value: Doc) -> Edit {
        Edit::Set {
            path: self.path.clone(),
            value,
        }
    }

    /// Appends an element. Only lists accept this.
    pub fn append(&self) -> Option<Edit> {
        self.is_list().then(|| Edit::Append {
            path: self.path.clone(),
        })
    }

    /// Removes element `index`. Only lists accept this; the range is checked
    /// when the edit is applied.
    pub fn remove(&self, index: usize) -> Option<Edit> {
        self.is_list().then(|| Edit::Remove {
            path: self.path.clone(),
            index,
        })
    }

    /// Selects the option at `index` of a choice field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidInput`] for non-choice fields and unknown options.
    pub fn select(&self, index: usize) -> Result<Edit> {
        match &self.widget {
            Widget::Choice { options, .. } => options
                .get(index)
                .map(|option| self.set(option.clone()))
                .ok_or_else(|| {
                    FormError::invalid_input(
                        &self.path,
                        format!("option {index} does not exist ({} options)", options.len()),
                    )
                }),
            _ => Err(FormError::invalid_input(&self.path, "not a choice field")),
        }
    }

    /// Turns raw text typed by the user into an edit for this field.
    ///
    /// Text fields take the input verbatim. Numeric fields store empty input
    /// as the empty-string sentinel so that "not entered" stays distinct from
    /// zero. Choice fields match an option by its displayed text.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidInput`] when the text does not fit the widget.
    pub fn input(&self, raw: &str) -> Result<Edit> {
        match &self.widget {
            Widget::Text { .. } => Ok(self.set(Doc::from(raw))),
            Widget::Toggle { .. } => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(self.set(Doc::Bool(true))),
                "false" | "no" | "off" | "0" => Ok(self.set(Doc::Bool(false))),
                _ => Err(FormError::invalid_input(
                    &self.path,
                    format!("`{raw}` is not a boolean"),
                )),
            },
            Widget::Numeric { integer, .. } => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(self.set(Doc::from("")));
                }
                if let Ok(i) = raw.parse::<i64>() {
                    return Ok(self.set(Doc::from(i)));
                }
                if *integer {
                    return Err(FormError::invalid_input(
                        &self.path,
                        format!("`{raw}` is not an integer"),
                    ));
                }
                raw.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(|n| self.set(Doc::Number(n)))
                    .ok_or_else(|| {
                        FormError::invalid_input(&self.path, format!("`{raw}` is not a number"))
                    })
            }
            Widget::Choice { options, .. } => options
                .iter()
                .position(|option| option.to_string() == raw)
                .map(|index| self.set(options[index].clone()))
                .ok_or_else(|| {
                    let names: Vec<_> = options.iter().map(Doc::to_string).collect();
                    FormError::invalid_input(
                        &self.path,
                        format!("`{raw}` is not one of: {}", names.join(", ")),
                    )
                }),
            Widget::List { .. } | Widget::Group { .. } => Err(FormError::invalid_input(
                &self.path,
                "cannot assign text to a group or list",
            )),
        }
    }
}

/// Finds the field addressed by `path` anywhere in the tree.
///
/// Segments are compared by text, so `2024` finds a property named `2024`.
pub fn find_field<'f, 'a>(fields: &'f [Field<'a>], path: &Path) -> Option<&'f Field<'a>> {
    fields.iter().find_map(|field| {
        if field.path.same_text(path) {
            Some(field)
        } else if path.text_starts_with(&field.path) {
            find_field(field.children(), path)
        } else {
            None
        }
    })
}

/// Collects every shape mismatch reported in the tree, depth first.
pub fn collect_mismatches(fields: &[Field<'_>]) -> Vec<(Path, ShapeMismatch)> {
    let mut out = Vec::new();
    for field in fields {
        if let Some(mismatch) = field.mismatch {
            out.push((field.path.clone(), mismatch));
        }
        out.extend(collect_mismatches(field.children()));
    }
    out
}
