//! Patient record service.
//!
//! Flow: Input form → [`Reconciler`] → document store.
//!
//! The service binds lookup, deletion and save to one store handle. Every
//! call is a short synchronous sequence of store operations with no retry.

mod reconciler;
mod lookup;
mod deletion;

pub use reconciler::*;
pub use lookup::*;

use crate::db::{DbError, DocumentStore};
use crate::models::{EditContext, PatientForm};
use thiserror::Error;

/// Collection holding patient records.
pub const PATIENTS_COLLECTION: &str = "patients";

/// Record service errors.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Missing or inconsistent input; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Lookup or delete target does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(DbError),

    /// A stored document does not decode as a patient record.
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),

    #[error("Access denied")]
    AccessDenied,
}

impl From<DbError> for RecordError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Json(e) => RecordError::Corrupt(e.to_string()),
            other => RecordError::StoreUnavailable(other),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Corrupt(e.to_string())
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Save, lookup and deletion of patient records over a document store.
pub struct PatientService<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    reconciler: Reconciler<'a, S>,
}

impl<'a, S: DocumentStore + ?Sized> PatientService<'a, S> {
    /// Create a service over `store` (the `patients` collection).
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            reconciler: Reconciler::new(store),
        }
    }

    /// Save a submitted form. See [`Reconciler::reconcile`].
    pub fn save(&self, context: &EditContext, form: &PatientForm) -> RecordResult<SaveOutcome> {
        self.reconciler.reconcile(context, form)
    }
}

/// Trimmed value of a required text input, or a validation error naming it.
pub(crate) fn required<'v>(value: &'v str, label: &str) -> RecordResult<&'v str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RecordError::Validation(format!("{} is required", label)))
    } else {
        Ok(trimmed)
    }
}
