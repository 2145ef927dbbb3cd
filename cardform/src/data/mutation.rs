//! Path-addressed document mutations.
//!
//! Every operation takes the current document by reference and returns the
//! next version. Containers that are not on the addressed path are shared
//! between the two versions.

use std::sync::Arc;

use crate::{
    data::{
        doc::Doc,
        path::{self, Path},
    },
    error::{FormError, Result},
};

/// Element appended by [`append_item`].
///
/// Arrays of objects also start from this scalar; nested `set_value` calls
/// with index-suffixed paths turn it into an object.
pub fn placeholder() -> Doc {
    Doc::String(String::new())
}

/// Writes `value` at `path`.
pub fn set_value(doc: &Doc, path: &Path, value: Doc) -> Doc {
    path::write(doc, path, value)
}

/// Appends a placeholder element to the array at `path`.
///
/// A missing array is created. Any other value found at `path` is replaced by
/// a one-element array.
pub fn append_item(doc: &Doc, at: &Path) -> Doc {
    path::update(doc, at, |current| match current {
        Some(Doc::Array(items)) => {
            let mut items = Vec::clone(items);
            items.push(placeholder());
            Doc::Array(Arc::new(items))
        }
        other => {
            if let Some(value) = other.filter(|v| !v.is_blank()) {
                warn!("`{at}` holds {}, starting a new array", value.type_name());
            }
            Doc::array([placeholder()])
        }
    })
}

/// Removes element `index` from the array at `path`.
///
/// # Errors
///
/// Returns [`FormError::IndexOutOfRange`] when `index` is not below the array
/// length. A missing or non-array value counts as an empty array.
pub fn remove_item(doc: &Doc, at: &Path, index: usize) -> Result<Doc> {
    let len = path::read(doc, at)
        .and_then(Doc::as_array)
        .map_or(0, <[Doc]>::len);
    if index >= len {
        return Err(FormError::IndexOutOfRange {
            path: at.to_string(),
            index,
            len,
        });
    }

    Ok(path::update(doc, at, |current| {
        let mut items = current
            .and_then(Doc::as_array)
            .map(<[Doc]>::to_vec)
            .unwrap_or_default();
        items.remove(index);
        Doc::Array(Arc::new(items))
    }))
}

/// A single user edit, expressed against the document root.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Store a value.
    Set { path: Path, value: Doc },
    /// Append a placeholder element to an array.
    Append { path: Path },
    /// Remove one array element.
    Remove { path: Path, index: usize },
}

impl Edit {
    /// Path the edit is addressed to.
    pub fn path(&self) -> &Path {
        match self {
            Edit::Set { path, .. } | Edit::Append { path } | Edit::Remove { path, .. } => path,
        }
    }

    /// Applies the edit and returns the next document.
    ///
    /// # Errors
    ///
    /// Only [`Edit::Remove`] can fail, see [`remove_item`].
    pub fn apply(&self, doc: &Doc) -> Result<Doc> {
        match self {
            Edit::Set { path, value } => Ok(set_value(doc, path, value.clone())),
            Edit::Append { path } => Ok(append_item(doc, path)),
            Edit::Remove { path, index } => remove_item(doc, path, *index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn len_at(doc: &Doc, at: &str) -> usize {
        path::read(doc, &at.into())
            .and_then(Doc::as_array)
            .map_or(0, <[Doc]>::len)
    }

    #[test]
    fn test_name_tags_scenario() {
        let doc = Doc::from(json!({"name": "", "tags": []}));

        let doc = append_item(&doc, &"tags".into());
        assert_eq!(doc.to_json(), json!({"name": "", "tags": [""]}));

        let doc = set_value(&doc, &"tags.0".into(), Doc::from("alpha"));
        assert_eq!(doc.to_json(), json!({"name": "", "tags": ["alpha"]}));

        let doc = remove_item(&doc, &"tags".into(), 0).unwrap();
        assert_eq!(doc.to_json(), json!({"name": "", "tags": []}));
    }

    #[test]
    fn test_append_adds_exactly_one_placeholder() {
        let doc = Doc::from(json!({"list": [1, 2]}));
        let next = append_item(&doc, &"list".into());
        assert_eq!(len_at(&next, "list"), 3);
        assert_eq!(path::read(&next, &"list.2".into()), Some(&placeholder()));
        assert_eq!(len_at(&doc, "list"), 2);
    }

    #[test]
    fn test_append_creates_missing_array() {
        let doc = Doc::empty_object();
        let next = append_item(&doc, &"section.items".into());
        assert_eq!(next.to_json(), json!({"section": {"items": [""]}}));

        let doc = Doc::from(json!({"items": null}));
        assert_eq!(append_item(&doc, &"items".into()).to_json(), json!({"items": [""]}));
    }

    #[test]
    fn test_append_to_object_item() {
        let doc = Doc::from(json!({"authors": []}));
        let doc = append_item(&doc, &"authors".into());
        let doc = set_value(&doc, &"authors.0.name".into(), Doc::from("Ada"));
        let doc = set_value(&doc, &"authors.0.email".into(), Doc::from("ada@example.com"));
        assert_eq!(
            doc.to_json(),
            json!({"authors": [{"name": "Ada", "email": "ada@example.com"}]})
        );
    }

    #[test]
    fn test_remove_in_range() {
        let doc = Doc::from(json!({"x": ["a", "b", "c"]}));
        let next = remove_item(&doc, &"x".into(), 1).unwrap();
        assert_eq!(next.to_json(), json!({"x": ["a", "c"]}));
        assert_eq!(len_at(&next, "x"), len_at(&doc, "x") - 1);
    }

    #[test]
    fn test_remove_out_of_range() {
        let doc = Doc::from(json!({"x": ["a", "b"]}));
        let err = remove_item(&doc, &"x".into(), 2).unwrap_err();
        assert!(matches!(
            err,
            FormError::IndexOutOfRange { index: 2, len: 2, .. }
        ));
        assert_eq!(doc.to_json(), json!({"x": ["a", "b"]}));

        let err = remove_item(&doc, &"missing".into(), 0).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { len: 0, .. }));
        assert_eq!(
            err.to_string(),
            "index 0 is out of range for `missing` (length 0)"
        );
    }

    #[test]
    fn test_remove_keeps_other_elements_shared() {
        let doc = Doc::from(json!({"rows": [{"a": 1}, {"b": 2}, {"c": 3}], "other": {"k": 1}}));
        let next = remove_item(&doc, &"rows".into(), 0).unwrap();
        let old = doc.get("rows").unwrap().as_array().unwrap();
        let new = next.get("rows").unwrap().as_array().unwrap();
        assert!(new[0].ptr_eq(&old[1]));
        assert!(new[1].ptr_eq(&old[2]));
        assert!(next.get("other").unwrap().ptr_eq(doc.get("other").unwrap()));
    }

    #[test]
    fn test_edit_apply() {
        let doc = Doc::empty_object();
        let edits = [
            Edit::Append { path: "tags".into() },
            Edit::Append { path: "tags".into() },
            Edit::Set {
                path: "tags.1".into(),
                value: Doc::from("b"),
            },
            Edit::Remove {
                path: "tags".into(),
                index: 0,
            },
        ];
        let doc = edits
            .iter()
            .try_fold(doc, |doc, edit| edit.apply(&doc))
            .unwrap();
        assert_eq!(doc.to_json(), json!({"tags": ["b"]}));
        assert_eq!(edits[2].path().to_string(), "tags.1");
    }
}
