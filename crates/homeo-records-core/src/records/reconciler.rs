//! Merges a submitted form with the stored record for the same case number.

use serde::{Deserialize, Serialize};

use super::{required, RecordError, RecordResult};
use crate::db::{DbError, DbResult, Document, DocumentStore};
use crate::models::{EditContext, FollowupEntry, PatientForm, PatientRecord};

/// Result of a successful save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveOutcome {
    /// Key the record is stored under
    pub case_no: String,
    /// No document existed for the key before this save
    pub created: bool,
    /// The form's follow-up was non-empty and got appended
    pub followup_appended: bool,
    /// Follow-ups stored after the save
    pub followup_count: usize,
}

/// Append `entry` to `prior` unless it is empty.
///
/// Returns the new list and whether anything was appended. Prior entries
/// keep their order.
pub fn append_followup(
    mut prior: Vec<FollowupEntry>,
    entry: &FollowupEntry,
) -> (Vec<FollowupEntry>, bool) {
    if entry.is_empty() {
        return (prior, false);
    }
    prior.push(entry.clone());
    (prior, true)
}

/// Record reconciler.
pub struct Reconciler<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> Reconciler<'a, S> {
    /// Create a reconciler writing to `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate `form`, merge it with the stored record and persist it.
    ///
    /// `case_no` and `name` are stored with surrounding whitespace trimmed,
    /// so a padded name reads back without the padding.
    /// Every scalar field is taken from the form. Follow-ups are read from
    /// the store at write time (not from `context`) and the form's entry is
    /// appended only when non-empty. Fields the model does not declare stay
    /// untouched in the store. Nothing is written when validation fails.
    pub fn reconcile(&self, context: &EditContext, form: &PatientForm) -> RecordResult<SaveOutcome> {
        let case_no = required(&form.details.case_no, "Case number")?.to_string();
        let name = required(&form.details.name, "Patient name")?.to_string();

        if let Some(loaded) = context.record() {
            if loaded.case_no() != case_no {
                return Err(RecordError::Validation(format!(
                    "Case number of a loaded record cannot change ({} -> {})",
                    loaded.case_no(),
                    case_no
                )));
            }
        }

        let mut outgoing = PatientRecord::new(form.details.clone());
        outgoing.details.case_no = case_no.clone();
        outgoing.details.name = name;

        let mut outcome = None;
        self.store.update(&case_no, &mut |current: Option<Document>| {
            let created = current.is_none();
            let prior = match current {
                Some(document) => stored_followups(&document)?,
                None => Vec::new(),
            };

            let (followups, appended) = append_followup(prior, &form.followup);
            outcome = Some(SaveOutcome {
                case_no: case_no.clone(),
                created,
                followup_appended: appended,
                followup_count: followups.len(),
            });

            outgoing.followups = followups;
            Ok(outgoing.to_document()?)
        })?;

        let outcome = outcome.ok_or_else(|| {
            DbError::Constraint(format!("Store skipped the write for {}", case_no))
        })?;

        if !outcome.created && !context.is_update() {
            tracing::warn!(
                case_no = %outcome.case_no,
                "saved over an existing record that was not loaded first"
            );
        }
        tracing::info!(
            case_no = %outcome.case_no,
            created = outcome.created,
            followup_appended = outcome.followup_appended,
            followups = outcome.followup_count,
            "patient record saved"
        );

        Ok(outcome)
    }
}

/// Follow-ups currently stored in `document`; missing or null means none.
fn stored_followups(document: &Document) -> DbResult<Vec<FollowupEntry>> {
    match document.get("followups") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}
