//! File-backed document store.
//!
//! Layout under the store directory:
//!
//! ```text
//! <dir>/
//! ├── attendance.json       # [AttendanceRecord]
//! ├── admins.json           # [AdminRecord]
//! └── resource_status.json  # ResourceStatus
//! ```
//!
//! Writes to one collection are serialized in-process and land on disk with
//! an atomic rename. Reads take no lock.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info};

use rollcall_models::{
    AdminRecord, AttendanceRecord, AttendanceStatus, ResourceStatus, UserId,
};

use crate::atomic::{load_json, load_list, replace_json};
use crate::error::{PersistenceError, Result};
use crate::store::{AttendanceStream, Store};

const ATTENDANCE_FILE: &str = "attendance.json";
const ADMINS_FILE: &str = "admins.json";
const RESOURCE_FILE: &str = "resource_status.json";

/// Store that keeps each collection in a JSON file.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    attendance_lock: Mutex<()>,
    admins_lock: Mutex<()>,
    resource_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.clone(),
            source,
        })?;
        info!(path = %dir.display(), "Opened file store");

        Ok(Self {
            dir,
            attendance_lock: Mutex::new(()),
            admins_lock: Mutex::new(()),
            resource_lock: Mutex::new(()),
        })
    }

    /// Directory holding the collection files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn attendance_path(&self) -> PathBuf {
        self.dir.join(ATTENDANCE_FILE)
    }

    fn admins_path(&self) -> PathBuf {
        self.dir.join(ADMINS_FILE)
    }

    fn resource_path(&self) -> PathBuf {
        self.dir.join(RESOURCE_FILE)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn upsert_attendance(
        &self,
        user_id: UserId,
        display_name: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<()> {
        let _guard = self.attendance_lock.lock().await;
        let path = self.attendance_path();

        let mut records: Vec<AttendanceRecord> = load_list(&path)?;
        let record = AttendanceRecord::new(user_id, display_name, date, status);
        match records.iter_mut().find(|r| r.is_for(user_id, date)) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        replace_json(&path, &records)?;

        debug!(user_id = %user_id, date = %date, status = %status, "Upserted attendance");
        Ok(())
    }

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<AttendanceStream> {
        let path = self.attendance_path();
        let records = stream::once(async move { load_list::<AttendanceRecord>(&path) })
            .map_ok(move |all| {
                stream::iter(
                    all.into_iter()
                        .filter(move |r| r.date == date)
                        .map(Ok::<_, PersistenceError>),
                )
            })
            .try_flatten()
            .boxed();
        Ok(records)
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool> {
        let admins: Vec<AdminRecord> = load_list(&self.admins_path())?;
        Ok(admins.iter().any(|a| a.user_id == user_id))
    }

    async fn add_admin(&self, user_id: UserId) -> Result<()> {
        let _guard = self.admins_lock.lock().await;
        let path = self.admins_path();

        let mut admins: Vec<AdminRecord> = load_list(&path)?;
        if admins.iter().any(|a| a.user_id == user_id) {
            return Ok(());
        }
        admins.push(AdminRecord::new(user_id));
        replace_json(&path, &admins)?;

        debug!(user_id = %user_id, "Added admin");
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<UserId>> {
        let admins: Vec<AdminRecord> = load_list(&self.admins_path())?;
        Ok(admins.into_iter().map(|a| a.user_id).collect())
    }

    async fn resource_status(&self) -> Result<Option<ResourceStatus>> {
        load_json(&self.resource_path())
    }

    async fn set_resource_status(&self, status: ResourceStatus) -> Result<()> {
        let _guard = self.resource_lock.lock().await;
        replace_json(&self.resource_path(), &status)?;
        debug!(available = status.available, updated_by = %status.updated_by, "Updated resource status");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_models::RecordedStatus;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    async fn records_for(store: &FileStore, date: NaiveDate) -> Vec<AttendanceRecord> {
        store
            .attendance_for_date(date)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/store");

        let store = FileStore::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(store.dir(), path.as_path());
    }

    #[tokio::test]
    async fn test_attendance_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store
                .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Absent)
                .await
                .unwrap();
            store
                .upsert_attendance(UserId(1), "ann", day(18), AttendanceStatus::Present)
                .await
                .unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let records = records_for(&store, day(18)).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RecordedStatus::Known(AttendanceStatus::Present));
        assert!(records_for(&store, day(19)).await.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_status_values_are_readable() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(ATTENDANCE_FILE),
            r#"[{"user_id": 9, "display_name": "dee", "date": "2024-07-18", "status": "Unknown"}]"#,
        )
        .unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        let records = records_for(&store, day(18)).await;
        assert_eq!(records[0].status, RecordedStatus::Unrecognized("Unknown".into()));
    }

    #[tokio::test]
    async fn test_corrupt_collection_surfaces_error_from_stream() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(ATTENDANCE_FILE), "garbage").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        let result: Result<Vec<AttendanceRecord>> = store
            .attendance_for_date(day(18))
            .await
            .unwrap()
            .try_collect()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_admins_and_resource_status() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.add_admin(UserId(100)).await.unwrap();
        store.add_admin(UserId(12345)).await.unwrap();
        store.add_admin(UserId(100)).await.unwrap();
        assert_eq!(
            store.list_admins().await.unwrap(),
            vec![UserId(100), UserId(12345)]
        );
        assert!(store.is_admin(UserId(12345)).await.unwrap());
        assert!(!store.is_admin(UserId(7)).await.unwrap());

        assert!(store.resource_status().await.unwrap().is_none());
        let status = ResourceStatus::now(false, "vic");
        store.set_resource_status(status.clone()).await.unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.resource_status().await.unwrap(), Some(status));
    }
}
