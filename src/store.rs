//! Persistent record lists.
//!
//! Each [`Collection`] is one row of a small key/value table holding the whole
//! list as a JSON array, read and rewritten in full on every change.
//!
//! Stored arrays may contain entries that are not valid records (older saves
//! kept display text such as `"---"` in numeric fields). Reads for display
//! skip them; writes keep them in place, untouched.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::errors::StoreError;
use crate::model::{CalculationRecord, Collection};

pub struct RecordStore {
    conn: Connection,
}

/// Identifies a record by its position at the time the list was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAction {
    pub collection: Collection,
    pub true_index: usize,
    pub snapshot_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub record: CalculationRecord,
    pub delete: DeleteAction,
}

/// A collection as it should be drawn: newest first, or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSnapshot {
    Empty(&'static str),
    Entries(Vec<ListEntry>),
}

impl ListSnapshot {
    /// `records` pairs each readable record with its position in the stored
    /// array of `stored_len` entries.
    pub fn build(
        collection: Collection,
        records: Vec<(usize, CalculationRecord)>,
        stored_len: usize,
    ) -> Self {
        if records.is_empty() {
            return ListSnapshot::Empty(collection.empty_message());
        }

        let entries = records
            .into_iter()
            .rev()
            .map(|(true_index, record)| ListEntry {
                record,
                delete: DeleteAction {
                    collection,
                    true_index,
                    snapshot_len: stored_len,
                },
            })
            .collect();

        ListSnapshot::Entries(entries)
    }

    pub fn entries(&self) -> &[ListEntry] {
        match self {
            ListSnapshot::Empty(_) => &[],
            ListSnapshot::Entries(entries) => entries,
        }
    }
}

/// Readable records of a stored array with their positions in it.
fn readable(key: &str, values: &[Value]) -> Vec<(usize, CalculationRecord)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match CalculationRecord::deserialize(value) {
            Ok(record) => Some((i, record)),
            Err(e) => {
                warn!("Skipping unreadable entry {} under {}: {}", i, key, e);
                None
            }
        })
        .collect()
}

impl RecordStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!("Opening record store at {:?}", path);
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(RecordStore { conn })
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// The stored array as raw JSON values. Fails rather than guessing when
    /// the stored value is not an array, so callers never write over it.
    fn read_values(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let key = collection.storage_key();
        match self.get_raw(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Readable records with their stored positions, plus the stored length.
    /// Missing or unreadable data is an empty list.
    fn load_indexed(&self, collection: Collection) -> (Vec<(usize, CalculationRecord)>, usize) {
        let key = collection.storage_key();
        match self.read_values(collection) {
            Ok(values) => (readable(key, &values), values.len()),
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                (Vec::new(), 0)
            }
        }
    }

    /// Reads a collection for display. Missing or unreadable data is an empty
    /// list; unreadable entries inside a list are skipped.
    pub fn load(&self, collection: Collection) -> Vec<CalculationRecord> {
        let (records, _) = self.load_indexed(collection);
        records.into_iter().map(|(_, record)| record).collect()
    }

    fn write(&mut self, collection: Collection, values: &[Value]) -> Result<(), StoreError> {
        let json = serde_json::to_string(values)?;
        self.set_raw(collection.storage_key(), &json)
            .inspect_err(|e| error!("Failed to write {}: {}", collection.storage_key(), e))
    }

    pub fn append(
        &mut self,
        collection: Collection,
        record: &CalculationRecord,
    ) -> Result<(), StoreError> {
        let mut values = self.read_values(collection)?;
        values.push(serde_json::to_value(record)?);
        debug!("Appending to {} ({} items)", collection.storage_key(), values.len());
        self.write(collection, &values)
    }

    /// Deletes by on-screen position, where position 0 is the newest record.
    pub fn delete_at(
        &mut self,
        collection: Collection,
        display_index: usize,
    ) -> Result<CalculationRecord, StoreError> {
        let mut values = self.read_values(collection)?;
        let mut shown = readable(collection.storage_key(), &values);
        let len = shown.len();
        if display_index >= len {
            return Err(StoreError::IndexOutOfRange {
                index: display_index,
                len,
            });
        }

        let (true_index, removed) = shown.remove(len - 1 - display_index);
        values.remove(true_index);
        self.write(collection, &values)?;
        Ok(removed)
    }

    /// Deletes the record a rendered list entry points at, provided the list
    /// still has the length it had when it was drawn.
    pub fn delete_entry(&mut self, action: &DeleteAction) -> Result<CalculationRecord, StoreError> {
        let mut values = self.read_values(action.collection)?;
        if values.len() != action.snapshot_len {
            return Err(StoreError::StaleSnapshot {
                expected: action.snapshot_len,
                actual: values.len(),
            });
        }
        if action.true_index >= values.len() {
            return Err(StoreError::IndexOutOfRange {
                index: action.true_index,
                len: values.len(),
            });
        }

        let removed = CalculationRecord::deserialize(&values[action.true_index])?;
        values.remove(action.true_index);
        self.write(action.collection, &values)?;
        Ok(removed)
    }

    pub fn snapshot(&self, collection: Collection) -> ListSnapshot {
        let (records, stored_len) = self.load_indexed(collection);
        ListSnapshot::build(collection, records, stored_len)
    }
}
