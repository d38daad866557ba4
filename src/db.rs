// 🗄️ Record Store - The expense list persisted under one key
//
// The whole list lives as ONE JSON array under the key "expenses" in a
// key-value backend. Every operation is a whole-list replace:
//   load → modify in memory → save
//
// Backends:
// - SqliteKeyValueStore: single `kv` table, WAL mode
// - MemoryKeyValueStore: HashMap, for tests and embedding

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::entities::{assign_missing_ids, remove_by_id, replace_by_id, ExpenseRecord};
use crate::input::NewExpense;

/// Key the expense list is stored under
pub const STORAGE_KEY: &str = "expenses";

// ============================================================================
// KEY-VALUE BACKENDS
// ============================================================================

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed key-value table
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open database: {:?}", path.as_ref()))?;
        Self::from_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteKeyValueStore { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    // (in-memory databases report "memory" and keep working)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// In-memory key-value map
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Owner of the canonical expense list
pub struct RecordStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        RecordStore { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Load the whole list.
    ///
    /// Never fails: a missing key, an unreadable backend or a corrupt blob
    /// all come back as an empty list. Records stored without a usable id
    /// get a stable one, written back with the next save.
    pub fn load(&self) -> Vec<ExpenseRecord> {
        let raw = match self.backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {:?}, starting empty: {:#}", STORAGE_KEY, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ExpenseRecord>>(&raw) {
            Ok(mut records) => {
                let assigned = assign_missing_ids(&mut records);
                if assigned > 0 {
                    debug!(assigned, "assigned ids to stored expenses");
                }
                records
            }
            Err(e) => {
                warn!("Stored expense list is malformed, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list with `records`
    pub fn save(&mut self, records: &[ExpenseRecord]) -> Result<()> {
        let json = serde_json::to_string(records).context("Failed to serialize expenses")?;
        self.backend
            .set(STORAGE_KEY, &json)
            .context("Failed to write expenses")?;
        debug!(count = records.len(), "saved expense list");
        Ok(())
    }

    /// Append a new record and return it
    pub fn add(&mut self, expense: NewExpense) -> Result<ExpenseRecord> {
        let mut records = self.load();
        let record = expense.into_record();
        records.push(record.clone());
        self.save(&records)?;
        debug!(id = %record.id, "added expense");
        Ok(record)
    }

    /// Replace the values of the record with `id`.
    /// Returns false (nothing written) when the id is unknown.
    pub fn update(&mut self, id: &str, expense: NewExpense) -> Result<bool> {
        let mut records = self.load();
        if !replace_by_id(&mut records, id, expense.into_record()) {
            debug!(id, "update skipped, unknown id");
            return Ok(false);
        }
        self.save(&records)?;
        debug!(id, "updated expense");
        Ok(true)
    }

    /// Delete the record with `id`.
    /// Returns false (nothing written) when the id is unknown.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let mut records = self.load();
        if !remove_by_id(&mut records, id) {
            debug!(id, "delete skipped, unknown id");
            return Ok(false);
        }
        self.save(&records)?;
        debug!(id, "deleted expense");
        Ok(true)
    }

    pub fn find(&self, id: &str) -> Option<ExpenseRecord> {
        self.load().into_iter().find(|r| r.id == id)
    }
}

impl RecordStore<SqliteKeyValueStore> {
    /// Record store over a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(RecordStore::new(SqliteKeyValueStore::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(description: &str, amount: f64, category: &str, date: &str) -> NewExpense {
        NewExpense {
            description: description.to_string(),
            amount,
            category: category.to_string(),
            date: date.to_string(),
        }
    }

    fn sqlite_store() -> RecordStore<SqliteKeyValueStore> {
        RecordStore::new(SqliteKeyValueStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = sqlite_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_json_is_empty() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        store.backend_mut().set(STORAGE_KEY, "{not json").unwrap();

        assert!(store.load().is_empty());

        store.backend_mut().set(STORAGE_KEY, r#"{"id":"x"}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = sqlite_store();
        let records = vec![
            ExpenseRecord::new("Coffee", 4.5, "food", "2024-03-01"),
            ExpenseRecord::new("Bus", 2.0, "transport", "2024-03-01"),
            ExpenseRecord::new("Refund", -15.25, "shopping", "2024-02-28"),
        ];

        store.save(&records).unwrap();

        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_save_overwrites_previous_list() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        store
            .save(&[ExpenseRecord::new("Old", 1.0, "other", "2024-01-01")])
            .unwrap();

        store.save(&[]).unwrap();

        assert!(store.load().is_empty());
        assert_eq!(store.backend().get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_load_coerces_legacy_amounts() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        store
            .backend_mut()
            .set(
                STORAGE_KEY,
                r#"[{"id":"a","description":"Lunch","amount":"8.75","category":"food","date":"2024-03-01"},
                    {"id":"b","description":"Gift","amount":"lots","date":"2024-03-02"}]"#,
            )
            .unwrap();

        let records = store.load();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 8.75);
        assert_eq!(records[1].amount, 0.0);
        assert_eq!(records[1].category, "");
    }

    #[test]
    fn test_records_without_ids_get_distinct_identities() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        store
            .backend_mut()
            .set(
                STORAGE_KEY,
                r#"[{"description":"A","amount":1,"category":"food","date":"2024-03-01"},
                    {"description":"B","amount":2,"category":"food","date":"2024-03-01"}]"#,
            )
            .unwrap();

        let records = store.load();
        assert_eq!(records.len(), 2);
        assert!(!records[0].id.is_empty());
        assert_ne!(records[0].id, records[1].id);
        assert_eq!(store.load(), records);

        assert!(store.remove(&records[0].id).unwrap());

        let remaining = store.load();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].description, "B");
        assert_eq!(remaining[0].id, records[1].id);
    }

    #[test]
    fn test_duplicate_ids_are_split_on_load() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        store
            .backend_mut()
            .set(
                STORAGE_KEY,
                r#"[{"id":"","description":"A","amount":1},
                    {"id":"dup","description":"B","amount":2},
                    {"id":"dup","description":"C","amount":3}]"#,
            )
            .unwrap();

        let records = store.load();
        assert_eq!(records[1].id, "dup");
        assert_ne!(records[2].id, "dup");

        assert!(store.update(&records[2].id, expense("C2", 30.0, "travel", "2024-03-02")).unwrap());

        let after = store.load();
        assert_eq!(after[1].description, "B");
        assert_eq!(after[2].description, "C2");
        assert_eq!(after[2].id, records[2].id);
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut store = sqlite_store();

        let first = store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();
        let second = store.add(expense("Bus", 2.0, "transport", "2024-03-01")).unwrap();

        let records = store.load();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, second.id);
        assert_ne!(first.id, second.id);

        println!("✅ Add test PASSED: {} records stored", records.len());
    }

    #[test]
    fn test_update_replaces_only_target() {
        let mut store = sqlite_store();
        let a = store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();
        let b = store.add(expense("Bus", 2.0, "transport", "2024-03-01")).unwrap();
        let c = store.add(expense("Movie", 12.0, "entertainment", "2024-03-02")).unwrap();

        let updated = store
            .update(&b.id, expense("Train", 9.0, "travel", "2024-03-03"))
            .unwrap();
        assert!(updated);

        let records = store.load();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], a);
        assert_eq!(records[1].id, b.id);
        assert_eq!(records[1].description, "Train");
        assert_eq!(records[1].amount, 9.0);
        assert_eq!(records[1].category, "travel");
        assert_eq!(records[1].date, "2024-03-03");
        assert_eq!(records[2], c);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = sqlite_store();
        store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();
        let before = store.load();

        let updated = store
            .update("missing", expense("Train", 9.0, "travel", "2024-03-03"))
            .unwrap();

        assert!(!updated);
        assert_eq!(store.load(), before);
    }

    #[test]
    fn test_remove() {
        let mut store = sqlite_store();
        let a = store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();
        let b = store.add(expense("Bus", 2.0, "transport", "2024-03-01")).unwrap();

        assert!(store.remove(&a.id).unwrap());

        assert_eq!(store.load(), vec![b]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = sqlite_store();
        store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();
        store.add(expense("Bus", 2.0, "transport", "2024-03-01")).unwrap();
        let before = store.load();

        assert!(!store.remove("does-not-exist").unwrap());

        let after = store.load();
        assert_eq!(after.len(), before.len());
        assert_eq!(after, before);
    }

    #[test]
    fn test_find() {
        let mut store = RecordStore::new(MemoryKeyValueStore::new());
        let a = store.add(expense("Coffee", 4.5, "food", "2024-03-01")).unwrap();

        assert_eq!(store.find(&a.id), Some(a));
        assert_eq!(store.find("nope"), None);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");

        let added = {
            let mut store = RecordStore::open(&path).unwrap();
            store.add(expense("Groceries", 54.2, "food", "2024-03-05")).unwrap()
        };

        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.load(), vec![added]);
    }
}
