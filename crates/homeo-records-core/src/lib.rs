//! Homeo-Records Core Library
//!
//! Password-gated record keeping for homeopathy patients: intake details,
//! medical history and a growing list of follow-up visits, stored as one
//! document per case number.
//!
//! # Architecture
//!
//! ```text
//! Input form ──► Access gate ──► Reconciler ──► Document store (patients)
//!                                    │                 ▲
//!                                    │   re-read       │
//!                                    └── followups ────┘
//!                                        + append if non-empty
//!                                        + merge write
//! ```
//!
//! # Core Principle
//!
//! **A save never loses follow-ups.** Prior entries are re-read from the
//! store inside the write and carried forward; an empty follow-up is never
//! appended.
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed document collections
//! - [`models`]: Domain types (PatientRecord, FollowupEntry, PatientForm, ...)
//! - [`records`]: Reconciler, lookup and deletion
//! - [`access`]: Shared-password gate

pub mod access;
pub mod db;
pub mod models;
pub mod records;

// Re-export commonly used types
pub use access::AccessGate;
pub use db::{Database, DocumentStore};
pub use models::{
    generate_case_no, EditContext, FollowupEntry, PatientDetails, PatientForm, PatientRecord,
    Sex, YesNo,
};
pub use records::{
    PatientService, RecordError, Reconciler, SaveOutcome, SearchQuery, PATIENTS_COLLECTION,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum HomeoRecordsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Access denied")]
    AccessDenied,
}

impl From<db::DbError> for HomeoRecordsError {
    fn from(e: db::DbError) -> Self {
        HomeoRecordsError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for HomeoRecordsError {
    fn from(e: serde_json::Error) -> Self {
        HomeoRecordsError::SerializationError(e.to_string())
    }
}

impl From<RecordError> for HomeoRecordsError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(msg) => HomeoRecordsError::InvalidInput(msg),
            RecordError::NotFound(msg) => HomeoRecordsError::NotFound(msg),
            RecordError::StoreUnavailable(e) => e.into(),
            RecordError::Corrupt(msg) => HomeoRecordsError::SerializationError(msg),
            RecordError::AccessDenied => HomeoRecordsError::AccessDenied,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for HomeoRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HomeoRecordsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<HomeoRecordsCore>, HomeoRecordsError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(HomeoRecordsCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<HomeoRecordsCore>, HomeoRecordsError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(HomeoRecordsCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Case number for a new form.
#[uniffi::export]
pub fn new_case_no() -> String {
    generate_case_no()
}

/// Check a password against the configured secret (`None` = no password set).
#[uniffi::export]
pub fn verify_password(secret: Option<String>, input: String) -> Result<(), HomeoRecordsError> {
    AccessGate::new(secret.as_deref()).verify(&input)?;
    Ok(())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Records cross the boundary as JSON strings in the stored document shape.
#[derive(uniffi::Object)]
pub struct HomeoRecordsCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl HomeoRecordsCore {
    /// Save a patient form.
    ///
    /// `loaded_case_no` is the case number the user opened before editing,
    /// or `None` for a new record.
    pub fn save_patient(
        &self,
        form_json: String,
        loaded_case_no: Option<String>,
    ) -> Result<FfiSaveOutcome, HomeoRecordsError> {
        let form: PatientForm = serde_json::from_str(&form_json)?;
        let db = self.db.lock()?;
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);

        let context = match loaded_case_no {
            Some(case_no) => service.open_for_edit(&SearchQuery::CaseNo(case_no))?,
            None => EditContext::fresh(),
        };
        let outcome = service.save(&context, &form)?;
        Ok(outcome.into())
    }

    /// Get a patient record by case number.
    pub fn get_patient(&self, case_no: String) -> Result<Option<String>, HomeoRecordsError> {
        let db = self.db.lock()?;
        let patients = db.collection(PATIENTS_COLLECTION);
        let record = PatientService::new(&patients).find_by_key(&case_no)?;
        record
            .map(|r| serde_json::to_string(&r))
            .transpose()
            .map_err(Into::into)
    }

    /// Blank form (new case number) or form prefilled from `case_no`.
    pub fn open_form(&self, case_no: Option<String>) -> Result<String, HomeoRecordsError> {
        let form = match case_no {
            Some(case_no) => {
                let db = self.db.lock()?;
                let patients = db.collection(PATIENTS_COLLECTION);
                let context =
                    PatientService::new(&patients).open_for_edit(&SearchQuery::CaseNo(case_no))?;
                context.form()
            }
            None => PatientForm::blank(),
        };
        Ok(serde_json::to_string(&form)?)
    }

    /// Find patients by exact name.
    pub fn find_patients_by_name(&self, name: String) -> Result<Vec<String>, HomeoRecordsError> {
        let db = self.db.lock()?;
        let patients = db.collection(PATIENTS_COLLECTION);
        let records = PatientService::new(&patients).find_by_name(&name)?;
        records
            .iter()
            .map(|r| serde_json::to_string(r).map_err(Into::into))
            .collect()
    }

    /// Delete a patient by case number.
    pub fn delete_patient(&self, case_no: String) -> Result<(), HomeoRecordsError> {
        let db = self.db.lock()?;
        let patients = db.collection(PATIENTS_COLLECTION);
        PatientService::new(&patients).delete_by_key(&case_no)?;
        Ok(())
    }

    /// Delete every patient with this exact name. Returns the number removed.
    pub fn delete_patients_by_name(&self, name: String) -> Result<u32, HomeoRecordsError> {
        let db = self.db.lock()?;
        let patients = db.collection(PATIENTS_COLLECTION);
        let deleted = PatientService::new(&patients).delete_by_name(&name)?;
        Ok(deleted as u32)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe save outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaveOutcome {
    pub case_no: String,
    pub created: bool,
    pub followup_appended: bool,
    pub followup_count: u32,
}

impl From<SaveOutcome> for FfiSaveOutcome {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            case_no: outcome.case_no,
            created: outcome.created,
            followup_appended: outcome.followup_appended,
            followup_count: outcome.followup_count as u32,
        }
    }
}
