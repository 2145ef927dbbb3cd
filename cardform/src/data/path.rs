//! Dotted path addressing inside documents.
//!
//! A [`Path`] is a sequence of [`Seg`]ments. Its textual form joins the
//! segments with `.`; segments made only of ASCII digits, without a leading
//! zero, are array indices.
//!
//! Writes are copy-on-write along the spine: every container from the root
//! to the written location is shallow-copied, every other container is shared
//! with the source document.

use std::{fmt, str::FromStr, sync::Arc};

use crate::data::doc::{Doc, Map};

/// Separator used in the textual form of a path.
pub const SEPARATOR: char = '.';

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Seg {
    /// Object key.
    Key(String),
    /// Array position.
    Index(usize),
}

impl Seg {
    fn parse(s: &str) -> Self {
        let canonical = s == "0" || !s.starts_with('0');
        if canonical && !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = s.parse() {
                return Seg::Index(i);
            }
        }
        Seg::Key(s.to_string())
    }

    /// Whether both segments have the same textual form.
    ///
    /// `Key("7")` and `Index(7)` address the same object member.
    pub fn same_text(&self, other: &Seg) -> bool {
        match (self, other) {
            (Seg::Key(a), Seg::Key(b)) => a == b,
            (Seg::Index(a), Seg::Index(b)) => a == b,
            (Seg::Key(k), Seg::Index(i)) | (Seg::Index(i), Seg::Key(k)) => *k == i.to_string(),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => f.write_str(k),
            Seg::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Location of a value inside a document, relative to the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Seg>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parses the dotted textual form. The empty string is the root.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Self(s.split(SEPARATOR).map(Seg::parse).collect())
    }

    /// Returns a new path extended by an object key.
    pub fn key(&self, k: impl Into<String>) -> Self {
        let mut segs = self.0.clone();
        segs.push(Seg::Key(k.into()));
        Self(segs)
    }

    /// Returns a new path extended by an array index.
    pub fn index(&self, i: usize) -> Self {
        let mut segs = self.0.clone();
        segs.push(Seg::Index(i));
        Self(segs)
    }

    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Equality of the textual forms, see [`Seg::same_text`].
    pub fn same_text(&self, other: &Path) -> bool {
        self.len() == other.len() && self.text_starts_with(other)
    }

    /// [`Path::starts_with`] comparing segments by their textual form.
    pub fn text_starts_with(&self, other: &Path) -> bool {
        self.len() >= other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a.same_text(b))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<Vec<Seg>> for Path {
    fn from(segs: Vec<Seg>) -> Self {
        Self(segs)
    }
}

/// Reads the value at `path`, or `None` when any step is missing.
///
/// An index segment applied to an object looks up its decimal text as a key.
pub fn read<'a>(doc: &'a Doc, path: &Path) -> Option<&'a Doc> {
    path.segments()
        .iter()
        .try_fold(doc, |node, seg| match (node, seg) {
            (Doc::Object(map), Seg::Key(k)) => map.get(k),
            (Doc::Object(map), Seg::Index(i)) => map.get(&i.to_string()),
            (Doc::Array(items), Seg::Index(i)) => items.get(*i),
            _ => None,
        })
}

/// Writes `value` at `path` and returns the new document.
///
/// Missing intermediates are created: an array when the following segment is
/// an index, an object otherwise. The input document is left untouched.
pub fn write(doc: &Doc, path: &Path, value: Doc) -> Doc {
    update(doc, path, |_| value)
}

/// Replaces the value at `path` with `f(current)`.
///
/// This is the primitive behind [`write`] and the mutation engine: `f`
/// receives the current value (if any) and its result is stored at `path`,
/// with the same container creation and sharing rules as [`write`].
pub fn update(doc: &Doc, path: &Path, f: impl FnOnce(Option<&Doc>) -> Doc) -> Doc {
    update_at(Some(doc), path.segments(), f)
}

fn update_at(node: Option<&Doc>, segs: &[Seg], f: impl FnOnce(Option<&Doc>) -> Doc) -> Doc {
    let Some((head, rest)) = segs.split_first() else {
        return f(node);
    };

    match (node, head) {
        (Some(Doc::Array(items)), Seg::Index(i)) => {
            let mut items = Vec::clone(items);
            let child = update_at(items.get(*i), rest, f);
            set_index(&mut items, *i, child);
            Doc::Array(Arc::new(items))
        }
        (Some(Doc::Object(map)), seg) => {
            let key = seg.to_string();
            let mut map = Map::clone(map);
            let child = update_at(map.get(&key), rest, f);
            map.insert(key, child);
            Doc::Object(Arc::new(map))
        }
        (other, Seg::Index(i)) => {
            heal(other, "array");
            let mut items = Vec::new();
            let child = update_at(None, rest, f);
            set_index(&mut items, *i, child);
            Doc::Array(Arc::new(items))
        }
        (other, Seg::Key(key)) => {
            heal(other, "object");
            let mut map = Map::new();
            let child = update_at(None, rest, f);
            map.insert(key.clone(), child);
            Doc::Object(Arc::new(map))
        }
    }
}

/// Largest number of `null`s inserted to reach an index past the end.
///
/// Writes further out are appended at the end instead.
pub const MAX_PADDING: usize = 1024;

fn set_index(items: &mut Vec<Doc>, index: usize, value: Doc) {
    let len = items.len();
    if index < len {
        items[index] = value;
    } else if index - len <= MAX_PADDING {
        items.resize(index, Doc::Null);
        items.push(value);
    } else {
        warn!("index {index} is far past the end ({len} elements), appending instead");
        items.push(value);
    }
}

fn heal(found: Option<&Doc>, created: &str) {
    match found {
        Some(value) if !value.is_blank() => {
            warn!(
                "replacing {} with an empty {created} to continue writing",
                value.type_name()
            );
        }
        _ => trace!("creating missing {created}"),
    }
}
