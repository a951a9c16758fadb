//! Removing patient records. Deletes are permanent.

use super::{required, PatientService, RecordError, RecordResult};
use crate::db::DocumentStore;

impl<S: DocumentStore + ?Sized> PatientService<'_, S> {
    /// Delete the record stored under `case_no`.
    ///
    /// Deleting a missing record changes nothing and reports `NotFound`.
    pub fn delete_by_key(&self, case_no: &str) -> RecordResult<()> {
        let case_no = required(case_no, "Case number")?;
        if !self.store.delete(case_no)? {
            return Err(RecordError::NotFound(format!("case number {}", case_no)));
        }
        tracing::info!(case_no, "patient record deleted");
        Ok(())
    }

    /// Delete every record whose name equals `name` exactly. Returns how many went.
    pub fn delete_by_name(&self, name: &str) -> RecordResult<usize> {
        let name = required(name, "Patient name")?;
        let mut deleted = 0;
        for (key, _) in self.store.query_equals("name", name)? {
            if self.store.delete(&key)? {
                deleted += 1;
            }
        }

        if deleted == 0 {
            return Err(RecordError::NotFound(format!("patient named {}", name)));
        }
        tracing::info!(name, deleted, "patient records deleted by name");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::{EditContext, PatientDetails, PatientForm};
    use crate::records::{PatientService, RecordError, PATIENTS_COLLECTION};

    fn form(case_no: &str, name: &str) -> PatientForm {
        PatientForm {
            details: PatientDetails::new(case_no, name),
            ..PatientForm::default()
        }
    }

    #[test]
    fn test_delete_by_key() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);
        service.save(&EditContext::fresh(), &form("1001", "Asha")).unwrap();

        service.delete_by_key("1001").unwrap();
        assert!(service.find_by_key("1001").unwrap().is_none());

        // Second delete is a no-op that reports the miss.
        assert!(matches!(
            service.delete_by_key("1001"),
            Err(RecordError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_by_name_removes_all_matches() {
        let db = Database::open_in_memory().unwrap();
        let patients = db.collection(PATIENTS_COLLECTION);
        let service = PatientService::new(&patients);
        service.save(&EditContext::fresh(), &form("1001", "Asha")).unwrap();
        service.save(&EditContext::fresh(), &form("1002", "Asha")).unwrap();
        service.save(&EditContext::fresh(), &form("1003", "Ravi")).unwrap();

        assert_eq!(service.delete_by_name("Asha").unwrap(), 2);
        assert!(service.find_by_name("Asha").unwrap().is_empty());
        assert!(service.find_by_key("1003").unwrap().is_some());

        assert!(matches!(
            service.delete_by_name("Asha"),
            Err(RecordError::NotFound(_))
        ));
    }
}
