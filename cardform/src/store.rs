//! Persistence of saved model cards.
//!
//! Cards are kept as an ordered list addressed by zero-based position. The
//! [`DocumentStore`] trait is the only thing the editing code depends on;
//! [`MemoryStore`] and [`JsonFileStore`] are the two implementations shipped
//! here. Neither offers transactions: the last write wins.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    data::doc::Doc,
    error::{FormError, Result},
};

/// Which schema a stored card was created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaSource {
    /// One of the bundled templates.
    Bundled { version: u32 },
    /// A schema uploaded by the user, kept alongside the card.
    Custom { name: String, schema: Value },
    /// Entry written before schemas were recorded.
    Unknown,
}

/// One saved card together with the schema that created it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    pub schema: SchemaSource,
    pub card: Doc,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    schema: SchemaSource,
    card: Doc,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Envelope(Envelope),
    Legacy(Doc),
}

impl<'de> Deserialize<'de> for CardRecord {
    /// Bare documents load as records with [`SchemaSource::Unknown`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Entry::deserialize(deserializer)? {
            Entry::Envelope(Envelope { schema, card }) => CardRecord { schema, card },
            Entry::Legacy(card) => CardRecord {
                schema: SchemaSource::Unknown,
                card,
            },
        })
    }
}

/// Ordered collection of saved cards.
pub trait DocumentStore {
    /// Returns every stored card in order.
    fn read_all(&self) -> Result<Vec<CardRecord>>;

    /// Adds a card at the end and returns its position.
    fn append(&mut self, record: CardRecord) -> Result<usize>;

    /// Overwrites the card at `index`.
    fn replace(&mut self, index: usize, record: CardRecord) -> Result<()>;

    /// Removes the card at `index`, shifting later cards down by one.
    fn delete(&mut self, index: usize) -> Result<CardRecord>;

    /// Returns the card at `index`.
    fn get(&self, index: usize) -> Result<CardRecord> {
        let mut all = self.read_all()?;
        let len = all.len();
        if index >= len {
            return Err(FormError::NotFound { index, len });
        }
        Ok(all.swap_remove(index))
    }

    /// Number of stored cards.
    fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }
}

/// Store kept in memory, used by tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<CardRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(FormError::NotFound { index, len })
    }
}

impl DocumentStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<CardRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: CardRecord) -> Result<usize> {
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    fn replace(&mut self, index: usize, record: CardRecord) -> Result<()> {
        check_index(index, self.records.len())?;
        self.records[index] = record;
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<CardRecord> {
        check_index(index, self.records.len())?;
        Ok(self.records.remove(index))
    }
}

/// Store backed by a single JSON file holding an array of records.
///
/// The whole file is read and rewritten on every operation. When `backup`
/// is set, the previous file is copied to a timestamped sibling before it is
/// overwritten.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    backup: bool,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            backup: false,
        }
    }

    /// Enables copying the previous file before each write.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, records: &[CardRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if self.backup && self.path.exists() {
            let secs = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let backup_path = self.path.with_extension(format!("bk-{secs}.json"));
            fs::copy(&self.path, &backup_path)?;
            debug!("backed up {} to {}", self.path.display(), backup_path.display());
        }

        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content)?;
        debug!("wrote {} cards to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<CardRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn append(&mut self, record: CardRecord) -> Result<usize> {
        let mut records = self.read_all()?;
        records.push(record);
        self.write_all(&records)?;
        Ok(records.len() - 1)
    }

    fn replace(&mut self, index: usize, record: CardRecord) -> Result<()> {
        let mut records = self.read_all()?;
        check_index(index, records.len())?;
        records[index] = record;
        self.write_all(&records)
    }

    fn delete(&mut self, index: usize) -> Result<CardRecord> {
        let mut records = self.read_all()?;
        check_index(index, records.len())?;
        let removed = records.remove(index);
        self.write_all(&records)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> CardRecord {
        CardRecord {
            schema: SchemaSource::Bundled { version: 1 },
            card: Doc::from(json!({"identity_and_basic_information": {"model_name": name}})),
        }
    }

    fn exercise(store: &mut dyn DocumentStore) {
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(store.append(record("a")).unwrap(), 0);
        assert_eq!(store.append(record("b")).unwrap(), 1);
        assert_eq!(store.append(record("c")).unwrap(), 2);

        store.replace(1, record("B")).unwrap();
        assert_eq!(store.get(1).unwrap(), record("B"));

        let removed = store.delete(0).unwrap();
        assert_eq!(removed, record("a"));
        assert_eq!(store.read_all().unwrap(), vec![record("B"), record("c")]);

        assert!(matches!(
            store.get(2),
            Err(FormError::NotFound { index: 2, len: 2 })
        ));
        assert!(store.replace(5, record("x")).is_err());
        assert!(store.delete(2).is_err());
    }

    #[test]
    fn test_memory_store() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cards.json");
        let mut store = JsonFileStore::new(&path);
        exercise(&mut store);

        // A second handle sees what the first one wrote.
        let other = JsonFileStore::new(&path);
        assert_eq!(other.len().unwrap(), 2);
    }

    #[test]
    fn test_json_file_store_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        let mut store = JsonFileStore::new(&path).with_backup(true);
        store.append(record("a")).unwrap();
        store.append(record("b")).unwrap();

        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains("bk-"))
            .count();
        assert!(backups >= 1);
    }

    #[test]
    fn test_legacy_entries_load_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(
            &path,
            r#"[{"identity_and_basic_information": {"model_name": "old"}},
                {"schema": {"kind": "custom", "name": "mine.json", "schema": {"type": "object"}},
                 "card": {"x": 1}}]"#,
        )
        .unwrap();

        let records = JsonFileStore::new(&path).read_all().unwrap();
        assert_eq!(records[0].schema, SchemaSource::Unknown);
        assert_eq!(
            records[0].card.to_json(),
            json!({"identity_and_basic_information": {"model_name": "old"}})
        );
        assert_eq!(
            records[1].schema,
            SchemaSource::Custom {
                name: "mine.json".into(),
                schema: json!({"type": "object"}),
            }
        );
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(&path).read_all().unwrap().is_empty());
    }
}
