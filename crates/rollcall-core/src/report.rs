//! Daily attendance report aggregation.
//!
//! Aggregation is a pure function of the records it is handed: they are
//! partitioned into the Present, Absent and Late buckets in input order and
//! counted. Records whose status falls outside the three buckets are left
//! out of every bucket and every count.

use std::fmt;

use chrono::NaiveDate;
use rollcall_models::{AttendanceRecord, AttendanceStatus, RecordedStatus};

/// One status bucket of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub status: AttendanceStatus,
    /// `"display_name (id)"` entries, in input order.
    pub entries: Vec<String>,
}

impl Bucket {
    fn empty(status: AttendanceStatus) -> Self {
        Self {
            status,
            entries: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Attendance for one day, partitioned by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceReport {
    pub date: NaiveDate,
    buckets: [Bucket; 3],
}

impl AttendanceReport {
    /// All three buckets in report order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, status: AttendanceStatus) -> &Bucket {
        match status {
            AttendanceStatus::Present => &self.buckets[0],
            AttendanceStatus::Absent => &self.buckets[1],
            AttendanceStatus::Late => &self.buckets[2],
        }
    }

    fn bucket_mut(&mut self, status: AttendanceStatus) -> &mut Bucket {
        match status {
            AttendanceStatus::Present => &mut self.buckets[0],
            AttendanceStatus::Absent => &mut self.buckets[1],
            AttendanceStatus::Late => &mut self.buckets[2],
        }
    }

    pub fn entries(&self, status: AttendanceStatus) -> &[String] {
        &self.bucket(status).entries
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.bucket(status).count()
    }
}

/// Renders the chat message sent to admins.
impl fmt::Display for AttendanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attendance Report for {}:", self.date.format("%Y-%m-%d"))?;
        for bucket in &self.buckets {
            let name = bucket.status.bucket_name();
            write!(f, "\n\n{}:", name)?;
            for entry in &bucket.entries {
                write!(f, "\n- {}", entry)?;
            }
            write!(f, "\n\nTotal {}: {}", name, bucket.count())?;
        }
        Ok(())
    }
}

/// Aggregate with the standard partition: each known status is its own bucket.
pub fn aggregate<I>(date: NaiveDate, records: I) -> AttendanceReport
where
    I: IntoIterator<Item = AttendanceRecord>,
{
    aggregate_with(date, records, RecordedStatus::known)
}

/// Aggregate with a custom `status -> bucket` rule. `None` drops the record.
pub fn aggregate_with<I, F>(date: NaiveDate, records: I, rule: F) -> AttendanceReport
where
    I: IntoIterator<Item = AttendanceRecord>,
    F: Fn(&RecordedStatus) -> Option<AttendanceStatus>,
{
    let mut report = AttendanceReport {
        date,
        buckets: AttendanceStatus::ALL.map(Bucket::empty),
    };

    for record in records {
        if let Some(status) = rule(&record.status) {
            report
                .bucket_mut(status)
                .entries
                .push(format!("{} ({})", record.display_name, record.user_id));
        }
    }

    report
}
