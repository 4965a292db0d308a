//! In-process store for tests and throwaway instances.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use rollcall_models::{
    AdminRecord, AttendanceRecord, AttendanceStatus, ResourceStatus, UserId,
};

use crate::error::Result;
use crate::store::{AttendanceStream, Store};

#[derive(Debug, Default)]
struct Collections {
    attendance: Vec<AttendanceRecord>,
    admins: Vec<AdminRecord>,
    resource: Option<ResourceStatus>,
}

/// Store that keeps every collection in memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attendance document as-is, bypassing status validation.
    ///
    /// Lets tests reproduce documents written by older or foreign clients.
    pub async fn insert_raw_attendance(&self, record: AttendanceRecord) {
        let mut data = self.data.write().await;
        data.attendance
            .retain(|r| !r.is_for(record.user_id, record.date));
        data.attendance.push(record);
    }

    /// Number of attendance documents across all days.
    pub async fn attendance_len(&self) -> usize {
        self.data.read().await.attendance.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_attendance(
        &self,
        user_id: UserId,
        display_name: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<()> {
        let record = AttendanceRecord::new(user_id, display_name, date, status);
        let mut data = self.data.write().await;
        match data.attendance.iter_mut().find(|r| r.is_for(user_id, date)) {
            Some(existing) => *existing = record,
            None => data.attendance.push(record),
        }
        Ok(())
    }

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<AttendanceStream> {
        let snapshot: Vec<AttendanceRecord> = self
            .data
            .read()
            .await
            .attendance
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool> {
        Ok(self.data.read().await.admins.iter().any(|a| a.user_id == user_id))
    }

    async fn add_admin(&self, user_id: UserId) -> Result<()> {
        let mut data = self.data.write().await;
        if !data.admins.iter().any(|a| a.user_id == user_id) {
            data.admins.push(AdminRecord::new(user_id));
        }
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<UserId>> {
        Ok(self.data.read().await.admins.iter().map(|a| a.user_id).collect())
    }

    async fn resource_status(&self) -> Result<Option<ResourceStatus>> {
        Ok(self.data.read().await.resource.clone())
    }

    async fn set_resource_status(&self, status: ResourceStatus) -> Result<()> {
        self.data.write().await.resource = Some(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use rollcall_models::RecordedStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        store
            .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Present)
            .await
            .unwrap();
        store
            .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Late)
            .await
            .unwrap();
        store
            .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Late)
            .await
            .unwrap();

        assert_eq!(store.attendance_len().await, 1);
        let records: Vec<_> = store
            .attendance_for_date(day(18))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordedStatus::Known(AttendanceStatus::Late));
    }

    #[tokio::test]
    async fn test_dates_are_isolated() {
        let store = MemoryStore::new();
        store
            .upsert_attendance(UserId(1), "ann", day(17), AttendanceStatus::Absent)
            .await
            .unwrap();
        store
            .upsert_attendance(UserId(2), "bob", day(18), AttendanceStatus::Present)
            .await
            .unwrap();

        let records: Vec<_> = store
            .attendance_for_date(day(18))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, UserId(2));
    }

    #[tokio::test]
    async fn test_stream_is_a_snapshot() {
        let store = MemoryStore::new();
        store
            .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Present)
            .await
            .unwrap();

        let stream = store.attendance_for_date(day(18)).await.unwrap();
        store
            .upsert_attendance(UserId(2), "bob", day(18), AttendanceStatus::Present)
            .await
            .unwrap();

        let first: Vec<_> = stream.try_collect().await.unwrap();
        assert_eq!(first.len(), 1);

        let second: Vec<_> = store
            .attendance_for_date(day(18))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_admin_set_semantics() {
        let store = MemoryStore::new();
        assert!(!store.is_admin(UserId(5)).await.unwrap());

        store.add_admin(UserId(5)).await.unwrap();
        store.add_admin(UserId(6)).await.unwrap();
        store.add_admin(UserId(5)).await.unwrap();

        assert!(store.is_admin(UserId(5)).await.unwrap());
        assert_eq!(store.list_admins().await.unwrap(), vec![UserId(5), UserId(6)]);
    }

    #[tokio::test]
    async fn test_resource_status_replaces_whole_document() {
        let store = MemoryStore::new();
        assert!(store.resource_status().await.unwrap().is_none());

        store
            .set_resource_status(ResourceStatus::now(true, "ann"))
            .await
            .unwrap();
        let next = ResourceStatus::now(false, "bob");
        store.set_resource_status(next.clone()).await.unwrap();

        assert_eq!(store.resource_status().await.unwrap(), Some(next));
    }
}
