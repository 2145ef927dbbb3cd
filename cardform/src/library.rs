//! Listing, searching and exporting saved cards.

use crate::{
    data::{
        doc::Doc,
        path::{self, Path},
    },
    error::Result,
    store::CardRecord,
};

/// Where a card keeps its display name.
pub const MODEL_NAME_PATH: &str = "identity_and_basic_information.model_name";
/// Where a card keeps its short description.
pub const OVERVIEW_PATH: &str = "identity_and_basic_information.overview";

const UNNAMED: &str = "Unnamed Model";
const EXPORT_FALLBACK: &str = "model_card";

/// Summary line for one stored card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    /// Position in the store.
    pub index: usize,
    pub title: String,
    pub overview: Option<String>,
}

fn text_at<'a>(doc: &'a Doc, at: &str) -> Option<&'a str> {
    path::read(doc, &Path::parse(at))
        .and_then(Doc::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// The card's model name, if it has a non-empty one.
pub fn model_name(doc: &Doc) -> Option<&str> {
    text_at(doc, MODEL_NAME_PATH)
}

/// Summaries for every record, in store order.
pub fn summaries(records: &[CardRecord]) -> Vec<CardSummary> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| CardSummary {
            index,
            title: model_name(&record.card).unwrap_or(UNNAMED).to_string(),
            overview: text_at(&record.card, OVERVIEW_PATH).map(str::to_string),
        })
        .collect()
}

/// Records whose model name contains `term`, ignoring case.
///
/// An empty term matches every card, including unnamed ones. Results keep
/// their store positions.
pub fn search(records: &[CardRecord], term: &str) -> Vec<CardSummary> {
    let term = term.trim().to_lowercase();
    summaries(records)
        .into_iter()
        .filter(|summary| {
            term.is_empty()
                || model_name(&records[summary.index].card)
                    .is_some_and(|name| name.to_lowercase().contains(&term))
        })
        .collect()
}

/// Serializes a card as pretty-printed JSON, keeping key order.
pub fn export_json(doc: &Doc) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// File name offered when exporting a card.
///
/// Characters that are awkward in file names are replaced by `_`.
pub fn export_file_name(doc: &Doc) -> String {
    let stem: String = model_name(doc)
        .unwrap_or(EXPORT_FALLBACK)
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.json")
}
