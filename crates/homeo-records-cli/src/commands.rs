//! Command handlers. Each one is a single request against the record service.

use anyhow::{Context, Result};
use homeo_records_core::records::RecordResult;
use homeo_records_core::{
    DocumentStore, EditContext, FollowupEntry, PatientForm, PatientService, RecordError,
    SaveOutcome, SearchQuery,
};
use std::io::Read;
use std::path::Path;

/// Read a patient form from a JSON file, or stdin for `-`
pub fn read_form(path: &Path) -> Result<PatientForm> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read form from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form file {}", path.display()))?
    };
    serde_json::from_str(&content).context("Failed to parse form JSON")
}

/// Save a form, optionally as an edit of the record loaded under `loaded`
pub fn save_form<S: DocumentStore + ?Sized>(
    service: &PatientService<'_, S>,
    form: &PatientForm,
    loaded: Option<&str>,
) -> RecordResult<SaveOutcome> {
    let context = match loaded {
        Some(case_no) => service.open_for_edit(&SearchQuery::CaseNo(case_no.to_string()))?,
        None => EditContext::fresh(),
    };
    service.save(&context, form)
}

/// Load a record, keep its fields as they are and add one follow-up
pub fn add_followup<S: DocumentStore + ?Sized>(
    service: &PatientService<'_, S>,
    case_no: &str,
    entry: FollowupEntry,
) -> RecordResult<SaveOutcome> {
    let context = service.open_for_edit(&SearchQuery::CaseNo(case_no.to_string()))?;
    let mut form = context.form();
    form.followup = entry;
    service.save(&context, &form)
}

/// Pretty JSON for the matching records: an object for a case number, an array for a name
pub fn show<S: DocumentStore + ?Sized>(
    service: &PatientService<'_, S>,
    query: &SearchQuery,
) -> RecordResult<String> {
    match query {
        SearchQuery::CaseNo(case_no) => {
            let record = service
                .find_by_key(case_no)?
                .ok_or_else(|| RecordError::NotFound(format!("case number {}", case_no)))?;
            Ok(serde_json::to_string_pretty(&record)?)
        }
        SearchQuery::Name(name) => {
            let records = service.find_by_name(name)?;
            if records.is_empty() {
                return Err(RecordError::NotFound(format!("patient named {}", name)));
            }
            Ok(serde_json::to_string_pretty(&records)?)
        }
    }
}

/// Delete by case number or name; returns how many records were removed
pub fn delete<S: DocumentStore + ?Sized>(
    service: &PatientService<'_, S>,
    query: &SearchQuery,
) -> RecordResult<usize> {
    match query {
        SearchQuery::CaseNo(case_no) => service.delete_by_key(case_no).map(|_| 1),
        SearchQuery::Name(name) => service.delete_by_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeo_records_core::{Database, PatientDetails, PATIENTS_COLLECTION};

    fn form(case_no: &str, name: &str) -> PatientForm {
        PatientForm {
            details: PatientDetails::new(case_no, name),
            ..PatientForm::default()
        }
    }

    #[test]
    fn test_read_form_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"case_no": "1001", "name": "A", "sex": "Male"}"#).unwrap();

        let form = read_form(&path).unwrap();
        assert_eq!(form.details.case_no, "1001");
        assert!(form.followup.is_empty());
    }

    #[test]
    fn test_read_form_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, "{").unwrap();
        assert!(read_form(&path).is_err());
    }

    #[test]
    fn test_add_followup_keeps_fields() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);

        let mut initial = form("1001", "A");
        initial.details.diagnosis = "Migraine".into();
        save_form(&service, &initial, None).unwrap();

        let entry = FollowupEntry {
            status: "Improved".into(),
            medicine_days: Some(15),
            ..FollowupEntry::default()
        };
        let outcome = add_followup(&service, "1001", entry).unwrap();
        assert!(outcome.followup_appended);
        assert_eq!(outcome.followup_count, 1);

        let record = service.find_by_key("1001").unwrap().unwrap();
        assert_eq!(record.details.diagnosis, "Migraine");
        assert_eq!(record.followups[0].medicine_days, Some(15));
    }

    #[test]
    fn test_add_followup_to_missing_record() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);

        let result = add_followup(&service, "404", FollowupEntry::default());
        assert!(matches!(result, Err(RecordError::NotFound(_))));
    }

    #[test]
    fn test_save_form_with_unknown_loaded_case() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);

        let result = save_form(&service, &form("1001", "A"), Some("1001"));
        assert!(matches!(result, Err(RecordError::NotFound(_))));
        assert_eq!(patients.count().unwrap(), 0);
    }

    #[test]
    fn test_show_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);
        save_form(&service, &form("1001", "A"), None).unwrap();
        save_form(&service, &form("1002", "A"), None).unwrap();

        let json = show(&service, &SearchQuery::CaseNo("1001".into())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["case_no"], "1001");

        let json = show(&service, &SearchQuery::Name("A".into())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);

        assert_eq!(delete(&service, &SearchQuery::Name("A".into())).unwrap(), 2);
        assert!(matches!(
            show(&service, &SearchQuery::CaseNo("1001".into())),
            Err(RecordError::NotFound(_))
        ));
    }
}
