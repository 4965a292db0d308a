//! MongoDB backend.
//!
//! Reads and writes the same documents the first Python version of the bot
//! kept in MongoDB, so an existing database can be pointed at directly:
//!
//! - `attendance`: `{user_id, username, date: "YYYY-MM-DD", status}`
//! - `admins`: `{user_id}`
//! - `washing_machines`: one `{_id: "status", available, updated_by, updated_at}`
//!
//! Every write is a single `update_one` with `upsert` set.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rollcall_models::{AttendanceRecord, AttendanceStatus, RecordedStatus, ResourceStatus, UserId};

use crate::error::{PersistenceError, Result};
use crate::store::{AttendanceStream, Store};

/// Database used when the connection string names none.
pub const DEFAULT_DATABASE: &str = "attendance_db";

const ATTENDANCE_COLLECTION: &str = "attendance";
const ADMINS_COLLECTION: &str = "admins";
const RESOURCE_COLLECTION: &str = "washing_machines";

/// `_id` of the laundry status singleton.
const RESOURCE_ID: &str = "status";

const FIELD_USER_ID: &str = "user_id";
const FIELD_DATE: &str = "date";

/// Date format of the `date` field.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize)]
struct AttendanceDoc {
    user_id: i64,
    /// Telegram username; null for users without one.
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    status: Option<RecordedStatus>,
}

impl AttendanceDoc {
    fn into_record(self, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            user_id: UserId(self.user_id),
            display_name: self.username.unwrap_or_default(),
            date,
            status: self
                .status
                .unwrap_or_else(|| RecordedStatus::Unrecognized(String::new())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminDoc {
    user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResourceDoc {
    available: Option<bool>,
    #[serde(default)]
    updated_by: Option<String>,
    #[serde(default)]
    updated_at: Option<BsonDateTime>,
}

impl ResourceDoc {
    /// A document without `available` counts as no status at all.
    fn into_status(self) -> Option<ResourceStatus> {
        let available = self.available?;
        let updated_at = self
            .updated_at
            .and_then(|at| DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis()))
            .unwrap_or_default();
        Some(ResourceStatus {
            available,
            updated_by: self.updated_by.unwrap_or_else(|| "Unknown".to_string()),
            updated_at,
        })
    }
}

fn db_error(e: mongodb::error::Error) -> PersistenceError {
    PersistenceError::DatabaseError(e.to_string())
}

/// Store backed by a MongoDB database.
///
/// The client connects lazily; opening the store does not contact the server.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Opens the database named in `uri`, or [`DEFAULT_DATABASE`].
    pub async fn open(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await.map_err(db_error)?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        info!(database = %db.name(), "Opened MongoDB store");
        Ok(Self { db })
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    fn attendance(&self) -> Collection<AttendanceDoc> {
        self.db.collection(ATTENDANCE_COLLECTION)
    }

    fn admins(&self) -> Collection<AdminDoc> {
        self.db.collection(ADMINS_COLLECTION)
    }

    fn resource(&self) -> Collection<ResourceDoc> {
        self.db.collection(RESOURCE_COLLECTION)
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn upsert_attendance(
        &self,
        user_id: UserId,
        display_name: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<()> {
        let date = date.format(DATE_FORMAT).to_string();
        self.attendance()
            .update_one(
                doc! { FIELD_USER_ID: user_id.get(), FIELD_DATE: date.as_str() },
                doc! { "$set": {
                    FIELD_USER_ID: user_id.get(),
                    "username": display_name,
                    FIELD_DATE: date.as_str(),
                    "status": status.label(),
                } },
            )
            .upsert(true)
            .await
            .map_err(db_error)?;
        debug!(user_id = %user_id, date = %date, status = %status, "Upserted attendance");
        Ok(())
    }

    async fn attendance_for_date(&self, date: NaiveDate) -> Result<AttendanceStream> {
        let cursor = self
            .attendance()
            .find(doc! { FIELD_DATE: date.format(DATE_FORMAT).to_string() })
            .await
            .map_err(db_error)?;

        Ok(cursor
            .map_ok(move |found| found.into_record(date))
            .map_err(db_error)
            .boxed())
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool> {
        let found = self
            .admins()
            .find_one(doc! { FIELD_USER_ID: user_id.get() })
            .await
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    async fn add_admin(&self, user_id: UserId) -> Result<()> {
        self.admins()
            .update_one(
                doc! { FIELD_USER_ID: user_id.get() },
                doc! { "$set": { FIELD_USER_ID: user_id.get() } },
            )
            .upsert(true)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<UserId>> {
        // ObjectIds grow with insertion time.
        let admins: Vec<AdminDoc> = self
            .admins()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)?;

        let mut ids: Vec<UserId> = Vec::with_capacity(admins.len());
        for admin in admins {
            let id = UserId(admin.user_id);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn resource_status(&self) -> Result<Option<ResourceStatus>> {
        let found = self
            .resource()
            .find_one(doc! { "_id": RESOURCE_ID })
            .await
            .map_err(db_error)?;
        Ok(found.and_then(ResourceDoc::into_status))
    }

    async fn set_resource_status(&self, status: ResourceStatus) -> Result<()> {
        let updated_at = BsonDateTime::from_millis(status.updated_at.timestamp_millis());
        self.resource()
            .update_one(
                doc! { "_id": RESOURCE_ID },
                doc! { "$set": {
                    "available": status.available,
                    "updated_by": status.updated_by.as_str(),
                    "updated_at": updated_at,
                } },
            )
            .upsert(true)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::from_document;

    #[tokio::test]
    async fn test_database_from_uri() {
        let store = MongoStore::open("mongodb://localhost:27017/rollcall_test")
            .await
            .unwrap();
        assert_eq!(store.database_name(), "rollcall_test");

        let store = MongoStore::open("mongodb://localhost:27017").await.unwrap();
        assert_eq!(store.database_name(), DEFAULT_DATABASE);
    }

    #[test]
    fn test_reads_existing_attendance_documents() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();

        let late: AttendanceDoc = from_document(doc! {
            "user_id": 42_i32,
            "username": "ann",
            "date": "2024-03-18",
            "status": "I'm late",
        })
        .unwrap();
        let record = late.into_record(date);
        assert_eq!(record.user_id, UserId(42));
        assert_eq!(record.display_name, "ann");
        assert_eq!(record.status.known(), Some(AttendanceStatus::Late));

        let anonymous: AttendanceDoc = from_document(doc! {
            "user_id": 7_i64,
            "username": null,
            "date": "2024-03-18",
            "status": "Unknown",
        })
        .unwrap();
        let record = anonymous.into_record(date);
        assert_eq!(record.display_name, "");
        assert_eq!(record.status.known(), None);
    }

    #[test]
    fn test_status_document_without_availability_is_absent() {
        let doc: ResourceDoc = from_document(doc! { "_id": "status" }).unwrap();
        assert!(doc.into_status().is_none());
    }

    #[test]
    fn test_status_document_fields() {
        let at = BsonDateTime::from_millis(1_710_756_000_000);
        let doc: ResourceDoc = from_document(doc! {
            "_id": "status",
            "available": false,
            "updated_by": "ben",
            "updated_at": at,
        })
        .unwrap();

        let status = doc.into_status().unwrap();
        assert!(!status.available);
        assert_eq!(status.updated_by, "ben");
        assert_eq!(status.updated_at.timestamp_millis(), 1_710_756_000_000);
    }
}
