//! Terminal rendering of field trees, stored cards and card listings.
//!
//! Every view is a [`Display`](fmt::Display) wrapper so it can be printed
//! directly or collected into a string.

use std::fmt::{self, Write as _};

use cardform::{
    data::{
        Doc,
        field::{Field, InputHint, NumericEntry, Widget},
    },
    library::CardSummary,
    templates::Template,
};
use colored::Colorize;

const INDENT: &str = "  ";

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

/// The editable form: one line per field, nested fields indented.
///
/// Each line shows the field's path so it can be used with `set`, `add`
/// and `rm`.
pub struct FieldTree<'f, 'a>(pub &'f [Field<'a>]);

impl fmt::Display for FieldTree<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.0 {
            write_field(f, field, 0)?;
        }
        Ok(())
    }
}

fn hint_name(hint: InputHint) -> Option<&'static str> {
    match hint {
        InputHint::Plain => None,
        InputHint::Email => Some("email"),
        InputHint::Uri => Some("url"),
        InputHint::Date => Some("date"),
        InputHint::DateTime => Some("date-time"),
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field<'_>, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    write!(f, "{} {}", field.label.bold(), format!("({})", field.path).dimmed())?;

    match &field.widget {
        Widget::Choice { options, selected } => {
            f.write_str(": ")?;
            for (i, option) in options.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                let text = format!("{i}:{option}");
                if Some(i) == *selected {
                    write!(f, "{}", format!("[{text}]").green().bold())?;
                } else {
                    f.write_str(&text)?;
                }
            }
            if selected.is_none() {
                write!(f, " {}", "(none selected)".yellow())?;
            }
        }
        Widget::Toggle { checked } => {
            write!(f, ": {}", if *checked { "[x]" } else { "[ ]" })?;
        }
        Widget::Text { hint, text } => {
            f.write_str(": ")?;
            if text.is_empty() {
                write!(f, "{}", "(empty)".dimmed())?;
            } else {
                write!(f, "{}", text.cyan())?;
            }
            if let Some(name) = hint_name(*hint) {
                write!(f, " <{name}>")?;
            }
        }
        Widget::Numeric { integer, entry } => {
            f.write_str(": ")?;
            match entry {
                NumericEntry::Empty => write!(f, "{}", "(empty)".dimmed())?,
                NumericEntry::Value(n) => write!(f, "{}", n.to_string().cyan())?,
            }
            f.write_str(if *integer { " <integer>" } else { " <number>" })?;
        }
        Widget::List { elements } => {
            let count = match elements.len() {
                1 => "1 item".to_string(),
                n => format!("{n} items"),
            };
            write!(f, ": {count}")?;
        }
        Widget::Group { children } => {
            if children.is_empty() {
                write!(f, " {}", "(no fields)".dimmed())?;
            }
        }
    }

    if let Some(mismatch) = field.mismatch {
        write!(f, " {}", format!("! {mismatch}").yellow())?;
    }
    writeln!(f)?;

    for child in field.children() {
        write_field(f, child, depth + 1)?;
    }
    Ok(())
}

/// Read-only view of a stored card, one section per top-level key.
pub struct CardView<'a>(pub &'a Doc);

impl fmt::Display for CardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Doc::Object(sections) => {
                for (name, section) in sections.iter() {
                    writeln!(f, "{}", section_title(name).bold().underline())?;
                    write_value(f, section, 1)?;
                    writeln!(f)?;
                }
                Ok(())
            }
            other => write_value(f, other, 0),
        }
    }
}

/// `identity_and_basic_information` becomes `Identity And Basic Information`.
pub fn section_title(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_scalar(f: &mut fmt::Formatter<'_>, value: &Doc) -> fmt::Result {
    if value.is_blank() {
        write!(f, "{}", "-".dimmed())
    } else {
        write!(f, "{value}")
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Doc, depth: usize) -> fmt::Result {
    match value {
        Doc::Object(map) => {
            for (key, child) in map.iter() {
                indent(f, depth)?;
                write!(f, "{}:", key.bold())?;
                if matches!(child, Doc::Object(_) | Doc::Array(_)) {
                    writeln!(f)?;
                    write_value(f, child, depth + 1)?;
                } else {
                    f.write_str(" ")?;
                    write_scalar(f, child)?;
                    writeln!(f)?;
                }
            }
            Ok(())
        }
        Doc::Array(items) => {
            if items.is_empty() {
                indent(f, depth)?;
                writeln!(f, "{}", "(none)".dimmed())?;
            }
            for item in items.iter() {
                indent(f, depth)?;
                f.write_str("- ")?;
                match item {
                    Doc::Object(_) | Doc::Array(_) => {
                        writeln!(f)?;
                        write_value(f, item, depth + 1)?;
                    }
                    scalar => {
                        write_scalar(f, scalar)?;
                        writeln!(f)?;
                    }
                }
            }
            Ok(())
        }
        scalar => {
            indent(f, depth)?;
            write_scalar(f, scalar)?;
            writeln!(f)
        }
    }
}

/// Card listing as printed by `list`.
pub struct SummaryTable<'a>(pub &'a [CardSummary]);

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "{}", "No model cards found.".yellow());
        }
        for summary in self.0 {
            write!(f, "{:>4}  {}", summary.index, summary.title.bold())?;
            if let Some(overview) = &summary.overview {
                let mut short = String::new();
                for (i, c) in overview.chars().enumerate() {
                    if i == 60 {
                        short.push_str("...");
                        break;
                    }
                    short.write_char(c)?;
                }
                write!(f, "  {}", short.dimmed())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Template listing as printed by `templates`.
pub struct TemplateList<'a>(pub &'a [Template]);

impl fmt::Display for TemplateList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for template in self.0 {
            let sections = template
                .property_keys()
                .map(|keys| keys.len().to_string())
                .unwrap_or_else(|_| "?".to_string());
            writeln!(
                f,
                "v{}  {}  ({sections} sections)",
                template.version,
                template.label.bold()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardform::data::{Path, SchemaNode, walker::build_field_tree};
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_field_tree_lines() {
        plain();
        let schema = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "title": "Name"},
                "contact": {"type": "string", "format": "email"},
                "license": {"enum": ["MIT", "Apache-2.0"]},
                "size": {"type": "integer"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }));
        let doc = Doc::from(json!({
            "name": "bert",
            "contact": "",
            "license": "MIT",
            "size": "",
            "tags": ["a", "b"]
        }));
        let fields = build_field_tree(&schema, Some(&doc), &Path::root());
        let text = FieldTree(&fields).to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Name (name): bert");
        assert_eq!(lines[1], "contact (contact): (empty) <email>");
        assert_eq!(lines[2], "license (license): [0:MIT] | 1:Apache-2.0");
        assert_eq!(lines[3], "size (size): (empty) <integer>");
        assert_eq!(lines[4], "tags (tags): 2 items");
        assert_eq!(lines[5], "  0 (tags.0): a");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_mismatch_is_flagged() {
        plain();
        let schema = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"type": "string"}}}
        }));
        let doc = Doc::from(json!({"tags": "oops"}));
        let fields = build_field_tree(&schema, Some(&doc), &Path::root());
        let text = FieldTree(&fields).to_string();
        assert!(text.contains("! expected array, found string"), "{text}");
    }

    #[test]
    fn test_card_view_sections() {
        plain();
        let doc = Doc::from(json!({
            "identity_and_basic_information": {
                "model_name": "bert",
                "developers": ["ann", "bo"],
                "license": ""
            },
            "evaluation": {"metrics": [{"name": "f1", "value": 0.9}]}
        }));
        let text = CardView(&doc).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Identity And Basic Information");
        assert_eq!(lines[1], "  model_name: bert");
        assert_eq!(lines[2], "  developers:");
        assert_eq!(lines[3], "    - ann");
        assert_eq!(lines[5], "  license: -");
        assert!(text.contains("Evaluation\n  metrics:\n    - \n      name: f1\n      value: 0.9\n"));
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title("intended_use"), "Intended Use");
        assert_eq!(section_title("card-metadata"), "Card Metadata");
    }

    #[test]
    fn test_summary_table() {
        plain();
        let rows = vec![CardSummary {
            index: 2,
            title: "bert".into(),
            overview: Some("x".repeat(70)),
        }];
        let text = SummaryTable(&rows).to_string();
        assert!(text.starts_with("   2  bert  "));
        assert!(text.trim_end().ends_with("..."));
        assert_eq!(SummaryTable(&[]).to_string().trim(), "No model cards found.");
    }
}
