//! The document store boundary.

use serde_json::{Map, Value};

use super::DbResult;

/// A stored document: a JSON object with named top-level fields.
pub type Document = Map<String, Value>;

/// Key/document persistence over a single collection.
///
/// Keys are case numbers for the `patients` collection. Documents are flat
/// JSON objects; `set` with `merge = true` replaces only the top-level
/// fields present in the incoming document and leaves the rest untouched.
pub trait DocumentStore {
    /// Fetch the document stored under `key`.
    fn get(&self, key: &str) -> DbResult<Option<Document>>;

    /// Write `document` under `key`, creating it if absent.
    fn set(&self, key: &str, document: &Document, merge: bool) -> DbResult<()>;

    /// All documents whose top-level `field` equals `value`, as `(key, document)` pairs.
    fn query_equals(&self, field: &str, value: &str) -> DbResult<Vec<(String, Document)>>;

    /// Remove the document under `key`. Returns whether one existed.
    fn delete(&self, key: &str) -> DbResult<bool>;

    /// Read the current document, derive the next one and merge-write it.
    ///
    /// The default is a plain get followed by set, so a concurrent writer
    /// can slip in between the two. Stores with transactions override this
    /// to run both steps atomically.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Document>) -> DbResult<Document>,
    ) -> DbResult<Document> {
        let current = self.get(key)?;
        let next = apply(current)?;
        self.set(key, &next, true)?;
        Ok(next)
    }
}

/// Overlay the top-level fields of `incoming` onto `base`.
pub fn merge_documents(mut base: Document, incoming: &Document) -> Document {
    for (field, value) in incoming {
        base.insert(field.clone(), value.clone());
    }
    base
}
