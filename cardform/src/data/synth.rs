//! Default document synthesis from a schema.
//!
//! Schemas are assumed to be acyclic. There is no depth guard: a schema that
//! refers to itself through nested `properties` would recurse until the stack
//! overflows, but [`SchemaNode`] trees built from JSON cannot form cycles.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::data::{
    doc::Doc,
    schema::{SchemaNode, StringFormat, TypeName},
};

/// Placeholder for `format: uri`.
pub const PLACEHOLDER_URI: &str = "https://example.com";
/// Placeholder for `format: email`.
pub const PLACEHOLDER_EMAIL: &str = "user@example.com";
/// Placeholder for `format: uuid`.
pub const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// Source of the current instant for date placeholders.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Synthesizes a default document using the wall clock.
pub fn synthesize(node: &SchemaNode) -> Doc {
    synthesize_with(node, &SystemClock)
}

/// Synthesizes a default document for `node`.
///
/// An explicit `default` wins over everything, even when its shape does not
/// match the declared type. Arrays start empty; their items are created on
/// demand by the mutation engine.
pub fn synthesize_with(node: &SchemaNode, clock: &dyn Clock) -> Doc {
    if let Some(default) = &node.default {
        return default.clone();
    }

    match node.type_name {
        Some(TypeName::Object) => match &node.properties {
            Some(props) => Doc::object(
                props
                    .iter()
                    .map(|(key, child)| (key.clone(), synthesize_with(child, clock))),
            ),
            None => Doc::Null,
        },
        Some(TypeName::Array) => Doc::empty_array(),
        Some(TypeName::String) => Doc::String(string_placeholder(node.format.as_ref(), clock)),
        Some(TypeName::Boolean) => Doc::Bool(false),
        Some(TypeName::Number | TypeName::Integer) => Doc::from(0i64),
        None => Doc::Null,
    }
}

fn string_placeholder(format: Option<&StringFormat>, clock: &dyn Clock) -> String {
    match format {
        Some(StringFormat::Uri) => PLACEHOLDER_URI.to_string(),
        Some(StringFormat::Email) => PLACEHOLDER_EMAIL.to_string(),
        Some(StringFormat::Date) => clock.now().format("%Y-%m-%d").to_string(),
        Some(StringFormat::DateTime) => clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        Some(StringFormat::Uuid) => NIL_UUID.to_string(),
        Some(StringFormat::Other(_)) | None => String::new(),
    }
}
