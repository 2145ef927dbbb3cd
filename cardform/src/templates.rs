//! Bundled, versioned model card schemas.

use serde_json::Value;

use crate::{
    data::{doc::Doc, schema::SchemaNode},
    error::{FormError, Result},
};

/// A schema shipped with the crate.
#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    /// Human readable name, e.g. `Model Card v2`.
    pub label: &'static str,
    pub version: u32,
    source: &'static str,
}

static TEMPLATES: [Template; 3] = [
    Template {
        label: "Model Card v1",
        version: 1,
        source: include_str!("../schemas/model_card_v1.json"),
    },
    Template {
        label: "Model Card v2",
        version: 2,
        source: include_str!("../schemas/model_card_v2.json"),
    },
    Template {
        label: "Model Card v3",
        version: 3,
        source: include_str!("../schemas/model_card_v3.json"),
    },
];

/// All bundled templates, oldest first.
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

/// The template offered when nothing else is chosen.
pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

/// Looks a template up by version.
pub fn by_version(version: u32) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.version == version)
}

/// Looks a template up by label, `vN` or plain version number.
///
/// Matching is case-insensitive.
pub fn find_template(name: &str) -> Result<&'static Template> {
    let wanted = name.trim().to_ascii_lowercase();
    let version = wanted.strip_prefix('v').unwrap_or(&wanted).parse::<u32>().ok();

    TEMPLATES
        .iter()
        .find(|t| t.label.to_ascii_lowercase() == wanted || Some(t.version) == version)
        .ok_or_else(|| FormError::UnknownTemplate(name.to_string()))
}

impl Template {
    /// Raw JSON text of the schema.
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn schema_value(&self) -> Result<Value> {
        serde_json::from_str(self.source).map_err(FormError::SchemaParse)
    }

    pub fn schema(&self) -> Result<SchemaNode> {
        SchemaNode::parse(self.source)
    }

    /// Top-level property names in declared order.
    pub fn property_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .schema()?
            .property_keys()
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

/// Outcome of guessing which template produced a document.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateMatch {
    Unique(&'static Template),
    /// Several templates share the document's key list. No order is implied.
    Ambiguous(Vec<&'static Template>),
    NoMatch,
}

/// Guesses the template of `doc` among the bundled ones.
///
/// This only compares top-level key lists and is a fallback for records
/// that do not say which schema created them.
pub fn infer_template(doc: &Doc) -> TemplateMatch {
    infer_among(doc, templates())
}

/// Guesses the template of `doc` among `candidates`.
pub fn infer_among(doc: &Doc, candidates: &'static [Template]) -> TemplateMatch {
    let Some(map) = doc.as_object() else {
        return TemplateMatch::NoMatch;
    };
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();

    let mut found: Vec<&'static Template> = candidates
        .iter()
        .filter(|t| {
            t.property_keys()
                .map(|props| props.iter().map(String::as_str).eq(keys.iter().copied()))
                .unwrap_or(false)
        })
        .collect();

    match found.len() {
        0 => TemplateMatch::NoMatch,
        1 => TemplateMatch::Unique(found.remove(0)),
        _ => TemplateMatch::Ambiguous(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        field::collect_mismatches,
        path::Path,
        synth::synthesize,
        walker::build_field_tree,
    };
    use serde_json::json;

    #[test]
    fn test_bundled_templates_parse() {
        for template in templates() {
            let schema = template.schema().unwrap();
            assert!(!schema.property_keys().is_empty(), "{}", template.label);
            let doc = synthesize(&schema);
            let fields = build_field_tree(&schema, Some(&doc), &Path::root());
            assert_eq!(fields.len(), schema.property_keys().len());
            assert!(collect_mismatches(&fields).is_empty(), "{}", template.label);
        }
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("v2").unwrap().version, 2);
        assert_eq!(find_template("3").unwrap().version, 3);
        assert_eq!(find_template("model card v1").unwrap().version, 1);
        assert!(matches!(find_template("v9"), Err(FormError::UnknownTemplate(_))));
        assert_eq!(default_template().version, 1);
        assert_eq!(by_version(2).unwrap().label, "Model Card v2");
    }

    #[test]
    fn test_infer_unique() {
        for template in templates() {
            let doc = synthesize(&template.schema().unwrap());
            assert_eq!(infer_template(&doc), TemplateMatch::Unique(template));
        }
        assert_eq!(infer_template(&Doc::from(json!({"x": 1}))), TemplateMatch::NoMatch);
        assert_eq!(infer_template(&Doc::from(json!([1]))), TemplateMatch::NoMatch);
    }

    #[test]
    fn test_infer_ambiguous() {
        static TWINS: [Template; 2] = [
            Template {
                label: "A",
                version: 1,
                source: r#"{"type": "object", "properties": {"a": {"type": "string"}}}"#,
            },
            Template {
                label: "B",
                version: 2,
                source: r#"{"type": "object", "properties": {"a": {"type": "number"}}}"#,
            },
        ];
        let doc = Doc::from(json!({"a": ""}));
        match infer_among(&doc, &TWINS) {
            TemplateMatch::Ambiguous(found) => assert_eq!(found.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
        // Key order matters.
        let doc = Doc::from(json!({"b": 1, "a": 2}));
        assert_eq!(infer_among(&doc, &TWINS), TemplateMatch::NoMatch);
    }
}
