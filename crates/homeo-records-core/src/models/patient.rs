//! Patient record models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::FollowupEntry;
use crate::db::Document;

/// Sex as captured on the intake form.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    /// Not filled in
    #[default]
    #[serde(rename = "")]
    Unspecified,
    Male,
    Female,
    Other,
}

/// Yes/no answer for the medical history checklist; empty when not asked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum YesNo {
    #[default]
    #[serde(rename = "")]
    Unknown,
    Yes,
    No,
}

/// Every scalar field of a patient record.
///
/// Empty strings and `None` mean "unknown". A save always writes all of
/// these, so clearing a field on the form clears it in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientDetails {
    /// Case number - primary key, immutable once saved
    pub case_no: String,
    /// Full name (not unique)
    pub name: String,
    /// Registration date
    #[serde(deserialize_with = "optional_date")]
    pub reg_date: Option<NaiveDate>,
    /// Age in years
    pub age: Option<u32>,
    pub sex: Sex,
    pub contact_no: String,
    pub marital_status: String,
    pub address: String,
    pub occupation: String,

    pub diagnosis: String,
    pub presenting_complaints: String,
    pub investigation: String,

    // Medical history
    pub diabetes: YesNo,
    pub hypertension: YesNo,
    pub thyroid: YesNo,
    pub hyperlipidaemia: YesNo,
    pub past_treatment: String,
    pub family_history: String,

    // Physical generals
    pub appetite: String,
    pub desires: String,
    pub aversions: String,
    pub bowels: String,
    pub sweat: String,
    pub urine: String,
    pub habits: String,
    pub sleep: String,
    pub dreams: String,
    pub thirst: String,
    pub thermals: String,
    pub intolerance: String,
    /// Menstrual and obstetric history
    pub menstrual_history: String,
    pub mind: String,

    // Examination
    /// Blood pressure as entered (e.g. "120/80")
    pub bp: String,
    /// Weight in kg
    pub weight: Option<f64>,
    /// Temperature as entered
    pub temp: String,
    pub systemic_exam: String,
    pub miasmatic_diag: String,
    pub present_med: String,
}

impl PatientDetails {
    /// Create details with the two required fields.
    pub fn new(case_no: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            case_no: case_no.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A stored patient record.
///
/// Serialized flat: the detail fields sit at the top level next to
/// `followups`. Top-level fields this model does not know about are kept in
/// `extra` so they can be displayed; saves never remove them from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    #[serde(flatten)]
    pub details: PatientDetails,
    /// Follow-up visits in the order they were entered
    #[serde(default)]
    pub followups: Vec<FollowupEntry>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PatientRecord {
    /// Create a record with no follow-ups.
    pub fn new(details: PatientDetails) -> Self {
        Self {
            details,
            followups: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Case number.
    pub fn case_no(&self) -> &str {
        &self.details.case_no
    }

    /// Patient name.
    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Convert into a store document.
    pub fn to_document(&self) -> serde_json::Result<Document> {
        serde_json::from_value(serde_json::to_value(self)?)
    }

    /// Decode a store document.
    pub fn from_document(document: Document) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(document))
    }
}

/// Generate a fresh case number: eight upper-case hex characters.
pub fn generate_case_no() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

/// Dates arrive as `YYYY-MM-DD`; empty strings and nulls mean "not set".
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_details() {
        let details = PatientDetails::new("1001", "Asha");
        assert_eq!(details.case_no, "1001");
        assert_eq!(details.name, "Asha");
        assert_eq!(details.sex, Sex::Unspecified);
        assert_eq!(details.age, None);
    }

    #[test]
    fn test_generate_case_no() {
        let a = generate_case_no();
        let b = generate_case_no();
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut details = PatientDetails::new("1001", "Asha");
        details.sex = Sex::Female;
        details.diabetes = YesNo::No;
        details.reg_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let record = PatientRecord::new(details);

        let doc = record.to_document().unwrap();
        assert_eq!(doc["case_no"], "1001");
        assert_eq!(doc["sex"], "Female");
        assert_eq!(doc["diabetes"], "No");
        assert_eq!(doc["thyroid"], "");
        assert_eq!(doc["reg_date"], "2024-03-01");
        assert_eq!(doc["followups"], json!([]));
        assert!(doc.get("details").is_none());
    }

    #[test]
    fn test_decode_keeps_unknown_fields() {
        let doc: Document = serde_json::from_value(json!({
            "case_no": "1001",
            "name": "Asha",
            "age": 42,
            "weight": 61,
            "reg_date": "",
            "referred_by": "Dr. Rao"
        }))
        .unwrap();

        let record = PatientRecord::from_document(doc).unwrap();
        assert_eq!(record.case_no(), "1001");
        assert_eq!(record.details.age, Some(42));
        assert_eq!(record.details.weight, Some(61.0));
        assert_eq!(record.details.reg_date, None);
        assert!(record.followups.is_empty());
        assert_eq!(record.extra.get("referred_by"), Some(&json!("Dr. Rao")));
        assert!(!record.extra.contains_key("name"));
    }

    #[test]
    fn test_decode_rejects_bad_date() {
        let doc: Document = serde_json::from_value(json!({
            "case_no": "1001",
            "name": "Asha",
            "reg_date": "01/03/2024"
        }))
        .unwrap();

        assert!(PatientRecord::from_document(doc).is_err());
    }
}
