//! Submitted forms and the request-scoped edit context.

use serde::{Deserialize, Serialize};

use super::{generate_case_no, FollowupEntry, PatientDetails, PatientRecord};

/// A submitted patient form.
///
/// Carries every scalar field plus the follow-up fields entered for this
/// visit. Previously stored follow-ups are never part of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientForm {
    #[serde(flatten)]
    pub details: PatientDetails,
    /// New follow-up for this visit (may be left empty)
    #[serde(default)]
    pub followup: FollowupEntry,
}

impl PatientForm {
    /// A blank form with a freshly generated case number.
    pub fn blank() -> Self {
        Self {
            details: PatientDetails {
                case_no: generate_case_no(),
                ..PatientDetails::default()
            },
            followup: FollowupEntry::default(),
        }
    }

    /// A form prefilled from a stored record, with an empty follow-up.
    pub fn prefilled(record: &PatientRecord) -> Self {
        Self {
            details: record.details.clone(),
            followup: FollowupEntry::default(),
        }
    }
}

/// What the user had loaded when submitting a form.
///
/// Passed explicitly into each save; never kept as shared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditContext {
    loaded: Option<PatientRecord>,
}

impl EditContext {
    /// Context for a record that was not loaded first.
    pub fn fresh() -> Self {
        Self { loaded: None }
    }

    /// Context for editing a record fetched from the store.
    pub fn loaded(record: PatientRecord) -> Self {
        Self {
            loaded: Some(record),
        }
    }

    /// The previously loaded record, if any.
    pub fn record(&self) -> Option<&PatientRecord> {
        self.loaded.as_ref()
    }

    pub fn is_update(&self) -> bool {
        self.loaded.is_some()
    }

    /// The form to present: prefilled when a record is loaded, blank otherwise.
    pub fn form(&self) -> PatientForm {
        match &self.loaded {
            Some(record) => PatientForm::prefilled(record),
            None => PatientForm::blank(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;

    #[test]
    fn test_blank_form_has_case_no() {
        let form = PatientForm::blank();
        assert_eq!(form.details.case_no.len(), 8);
        assert!(form.details.name.is_empty());
        assert!(form.followup.is_empty());
    }

    #[test]
    fn test_prefilled_form_drops_followups() {
        let mut details = PatientDetails::new("1001", "Asha");
        details.sex = Sex::Female;
        let mut record = PatientRecord::new(details.clone());
        record.followups.push(FollowupEntry {
            status: "Improved".into(),
            ..FollowupEntry::default()
        });

        let form = EditContext::loaded(record).form();
        assert_eq!(form.details, details);
        assert!(form.followup.is_empty());
    }

    #[test]
    fn test_form_decodes_flat_json() {
        let form: PatientForm = serde_json::from_str(
            r#"{
                "case_no": "1001",
                "name": "Asha",
                "sex": "Female",
                "hypertension": "Yes",
                "followup": {"status": "Improved"}
            }"#,
        )
        .unwrap();

        assert_eq!(form.details.case_no, "1001");
        assert_eq!(form.details.sex, Sex::Female);
        assert_eq!(form.followup.status, "Improved");
    }

    #[test]
    fn test_fresh_context() {
        let context = EditContext::fresh();
        assert!(!context.is_update());
        assert!(context.record().is_none());
    }
}
