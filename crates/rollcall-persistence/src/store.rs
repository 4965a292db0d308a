//! Store trait definition for Rollcall backends.
//!
//! Each method is an independent, idempotent operation on one collection.
//! Callers may retry any of them after a failure without ill effect.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::BoxStream;

use rollcall_models::{AttendanceRecord, AttendanceStatus, ResourceStatus, UserId};

use crate::error::Result;

/// Lazily yielded attendance records for one day.
pub type AttendanceStream = BoxStream<'static, Result<AttendanceRecord>>;

/// Trait for storage backends.
///
/// All operations are async to support both local and remote backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace the `(user_id, date)` attendance record.
    ///
    /// First submission and later corrections take the same path.
    async fn upsert_attendance(
        &self,
        user_id: UserId,
        display_name: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<()>;

    /// Stream the records written for `date`.
    ///
    /// Every call starts from a fresh snapshot; nothing is shared between
    /// streams.
    async fn attendance_for_date(&self, date: NaiveDate) -> Result<AttendanceStream>;

    /// Check admin membership.
    async fn is_admin(&self, user_id: UserId) -> Result<bool>;

    /// Add an identity to the admin set. No-op if already present.
    async fn add_admin(&self, user_id: UserId) -> Result<()>;

    /// List admins in insertion order.
    async fn list_admins(&self) -> Result<Vec<UserId>>;

    /// Current laundry status, `None` before the first report.
    async fn resource_status(&self) -> Result<Option<ResourceStatus>>;

    /// Replace the laundry status singleton.
    async fn set_resource_status(&self, status: ResourceStatus) -> Result<()>;
}
