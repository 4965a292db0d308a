//! Attendance types for Rollcall.
//!
//! A user marks one [`AttendanceStatus`] per calendar day. What comes back
//! from storage is a [`RecordedStatus`], which also tolerates values this
//! version does not know about.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::UserId;

/// Attendance status a user can report for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// In attendance.
    Present,
    /// Not attending today.
    Absent,
    /// Attending, but late.
    #[serde(rename = "I'm late", alias = "Late")]
    Late,
}

impl AttendanceStatus {
    /// All statuses, in report order.
    pub const ALL: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
    ];

    /// Parses the callback tag of a status button.
    pub fn from_button_tag(tag: &str) -> Option<Self> {
        match tag {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }

    /// Callback tag of the button that selects this status.
    pub fn button_tag(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }

    /// Label shown to the user and stored in the database.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "I'm late",
        }
    }

    /// Heading used for this bucket in reports.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status as found in a stored attendance document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedStatus {
    /// One of the statuses this version writes.
    Known(AttendanceStatus),
    /// Anything else found in storage.
    Unrecognized(String),
}

impl RecordedStatus {
    /// Returns the known status, if any.
    pub fn known(&self) -> Option<AttendanceStatus> {
        match self {
            RecordedStatus::Known(status) => Some(*status),
            RecordedStatus::Unrecognized(_) => None,
        }
    }
}

impl From<AttendanceStatus> for RecordedStatus {
    fn from(status: AttendanceStatus) -> Self {
        RecordedStatus::Known(status)
    }
}

/// One user's attendance for one day. Unique per `(user_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Who reported.
    pub user_id: UserId,
    /// Display name at the time of reporting.
    pub display_name: String,
    /// Local calendar day the record is for.
    pub date: NaiveDate,
    /// Reported status.
    pub status: RecordedStatus,
}

impl AttendanceRecord {
    /// Creates a record with a known status.
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            date,
            status: status.into(),
        }
    }

    /// Whether this record is keyed by the given user and day.
    pub fn is_for(&self, user_id: UserId, date: NaiveDate) -> bool {
        self.user_id == user_id && self.date == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_tags_map_to_statuses() {
        for status in AttendanceStatus::ALL {
            assert_eq!(AttendanceStatus::from_button_tag(status.button_tag()), Some(status));
        }
        assert_eq!(AttendanceStatus::from_button_tag("maybe"), None);
        assert_eq!(AttendanceStatus::from_button_tag("Present"), None);
    }

    #[test]
    fn test_late_is_stored_with_original_label() {
        let json = serde_json::to_string(&AttendanceStatus::Late).unwrap();
        assert_eq!(json, "\"I'm late\"");

        let parsed: AttendanceStatus = serde_json::from_str("\"Late\"").unwrap();
        assert_eq!(parsed, AttendanceStatus::Late);
    }

    #[test]
    fn test_recorded_status_keeps_unknown_values() {
        let known: RecordedStatus = serde_json::from_str("\"Absent\"").unwrap();
        assert_eq!(known.known(), Some(AttendanceStatus::Absent));

        let unknown: RecordedStatus = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(unknown, RecordedStatus::Unrecognized("Unknown".to_string()));
        assert_eq!(unknown.known(), None);
    }

    #[test]
    fn test_record_document_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 18).unwrap();
        let record = AttendanceRecord::new(UserId(1), "ann", date, AttendanceStatus::Present);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["user_id"], 1);
        assert_eq!(value["date"], "2024-07-18");
        assert_eq!(value["status"], "Present");
        assert!(record.is_for(UserId(1), date));
        assert!(!record.is_for(UserId(2), date));
    }
}
