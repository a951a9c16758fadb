//! SQLite-backed document collections.

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use super::{merge_documents, Database, DbError, DbResult, Document, DocumentStore};

/// A named collection inside the record database.
pub struct Collection<'a> {
    db: &'a Database,
    name: &'a str,
}

impl<'a> Collection<'a> {
    /// Create a handle for `name` on `db`.
    pub fn new(db: &'a Database, name: &'a str) -> Self {
        Self { db, name }
    }

    /// Number of documents in the collection.
    pub fn count(&self) -> DbResult<usize> {
        let count: i64 = self.db.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Run `f` inside an IMMEDIATE transaction, or directly when one is already open.
    fn with_write_lock<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let conn = &self.db.conn;
        if !conn.is_autocommit() {
            return f(conn);
        }

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read_body(&self, conn: &Connection, key: &str) -> DbResult<Option<Document>> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_key = ?2",
                params![self.name, key],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|b| parse_body(&b)).transpose()
    }

    fn write_body(&self, conn: &Connection, key: &str, document: &Document) -> DbResult<()> {
        let body = serde_json::to_string(document)?;
        conn.execute(
            r#"
            INSERT INTO documents (collection, doc_key, body)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (collection, doc_key) DO UPDATE SET
                body = excluded.body,
                updated_at = datetime('now')
            "#,
            params![self.name, key, body],
        )?;
        Ok(())
    }

    fn merge_write(&self, conn: &Connection, key: &str, document: &Document) -> DbResult<Document> {
        let merged = match self.read_body(conn, key)? {
            Some(existing) => merge_documents(existing, document),
            None => document.clone(),
        };
        self.write_body(conn, key, &merged)?;
        Ok(merged)
    }
}

impl DocumentStore for Collection<'_> {
    fn get(&self, key: &str) -> DbResult<Option<Document>> {
        tracing::debug!(collection = self.name, key, "get document");
        self.read_body(&self.db.conn, key)
    }

    fn set(&self, key: &str, document: &Document, merge: bool) -> DbResult<()> {
        tracing::debug!(collection = self.name, key, merge, "set document");
        if merge {
            self.with_write_lock(|conn| self.merge_write(conn, key, document).map(|_| ()))
        } else {
            self.write_body(&self.db.conn, key, document)
        }
    }

    fn query_equals(&self, field: &str, value: &str) -> DbResult<Vec<(String, Document)>> {
        tracing::debug!(collection = self.name, field, "query documents");
        check_field_name(field)?;

        // Field names are restricted to identifiers, so the JSON path can be
        // inlined; that lets SQLite use the expression index on `$.name`.
        let sql = format!(
            r#"
            SELECT doc_key, body
            FROM documents
            WHERE collection = ?1 AND json_extract(body, '$.{field}') = ?2
            ORDER BY rowid
            "#
        );
        let mut stmt = self.db.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.name, value], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (key, body) = row?;
            documents.push((key, parse_body(&body)?));
        }
        Ok(documents)
    }

    fn delete(&self, key: &str) -> DbResult<bool> {
        tracing::debug!(collection = self.name, key, "delete document");
        let rows_affected = self.db.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_key = ?2",
            params![self.name, key],
        )?;
        Ok(rows_affected > 0)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Document>) -> DbResult<Document>,
    ) -> DbResult<Document> {
        tracing::debug!(collection = self.name, key, "update document");
        self.with_write_lock(|conn| {
            let current = self.read_body(conn, key)?;
            let next = apply(current)?;
            self.merge_write(conn, key, &next)
        })
    }
}

fn parse_body(body: &str) -> DbResult<Document> {
    Ok(serde_json::from_str(body)?)
}

fn check_field_name(field: &str) -> DbResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::Constraint(format!("Invalid field name: {:?}", field)))
    }
}
