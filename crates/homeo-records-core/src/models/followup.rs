//! Follow-up visit entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patient::optional_date;

/// One follow-up visit appended to a patient's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FollowupEntry {
    /// Visit date
    #[serde(deserialize_with = "optional_date")]
    pub followup_date: Option<NaiveDate>,
    /// Progress notes
    pub description: String,
    /// Remedy and potency prescribed
    pub prescription: String,
    /// Free-text status (e.g. "Improved")
    pub status: String,
    /// Number of days of medicine given
    pub medicine_days: Option<u32>,
}

impl FollowupEntry {
    /// Create an entry dated `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            followup_date: Some(date),
            ..Self::default()
        }
    }

    /// True when nothing was filled in. Zero medicine days counts as empty.
    pub fn is_empty(&self) -> bool {
        self.followup_date.is_none()
            && self.description.trim().is_empty()
            && self.prescription.trim().is_empty()
            && self.status.trim().is_empty()
            && self.medicine_days.unwrap_or(0) == 0
    }
}
