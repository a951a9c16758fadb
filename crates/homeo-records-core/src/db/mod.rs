//! Database layer for homeo-records.
//!
//! Records are stored as JSON documents grouped into named collections,
//! mirroring the hosted document store the record service was designed
//! around: get by key, set with merge, equality query on one field, delete.

mod schema;
mod store;
mod documents;

pub use schema::*;
pub use store::*;
pub use documents::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        tracing::debug!(path = %path.as_ref().display(), "opening record database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Handle to a named collection of documents.
    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection::new(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"documents".to_string()));
    }

    #[test]
    fn test_reopen_on_disk_keeps_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let db = Database::open(&path).unwrap();
            let mut doc = Document::new();
            doc.insert("name".into(), "A".into());
            db.collection("patients").set("1001", &doc, true).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let doc = db.collection("patients").get("1001").unwrap().unwrap();
        assert_eq!(doc["name"], "A");
    }
}
