//! Finding patient records by case number or exact name.

use serde::{Deserialize, Serialize};

use super::{required, PatientService, RecordError, RecordResult};
use crate::db::DocumentStore;
use crate::models::{EditContext, PatientRecord};

/// What the user searched by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchQuery {
    CaseNo(String),
    /// Exact, case-sensitive full name
    Name(String),
}

impl<S: DocumentStore + ?Sized> PatientService<'_, S> {
    /// Get a record by case number.
    pub fn find_by_key(&self, case_no: &str) -> RecordResult<Option<PatientRecord>> {
        let case_no = required(case_no, "Case number")?;
        self.store
            .get(case_no)?
            .map(PatientRecord::from_document)
            .transpose()
            .map_err(Into::into)
    }

    /// All records whose name equals `name` exactly, in store order.
    pub fn find_by_name(&self, name: &str) -> RecordResult<Vec<PatientRecord>> {
        let name = required(name, "Patient name")?;
        let mut records = Vec::new();
        for (_, document) in self.store.query_equals("name", name)? {
            records.push(PatientRecord::from_document(document)?);
        }
        Ok(records)
    }

    /// Run a search; a case number search yields at most one record.
    pub fn search(&self, query: &SearchQuery) -> RecordResult<Vec<PatientRecord>> {
        match query {
            SearchQuery::CaseNo(case_no) => Ok(self.find_by_key(case_no)?.into_iter().collect()),
            SearchQuery::Name(name) => self.find_by_name(name),
        }
    }

    /// Load a record for editing.
    ///
    /// Names are not unique: when several records match, the first one in
    /// store order is used.
    pub fn open_for_edit(&self, query: &SearchQuery) -> RecordResult<EditContext> {
        let mut matches = self.search(query)?;
        if matches.len() > 1 {
            tracing::warn!(
                matches = matches.len(),
                "several records share this name; editing the first match"
            );
        }

        if matches.is_empty() {
            return Err(RecordError::NotFound(describe(query)));
        }
        Ok(EditContext::loaded(matches.swap_remove(0)))
    }
}

fn describe(query: &SearchQuery) -> String {
    match query {
        SearchQuery::CaseNo(case_no) => format!("case number {}", case_no.trim()),
        SearchQuery::Name(name) => format!("patient named {}", name.trim()),
    }
}
