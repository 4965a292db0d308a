//! Persistence layer for Rollcall.
//!
//! Three logical collections live behind the [`Store`] trait: daily
//! attendance records, the admin set and the laundry status singleton.
//! Every write is a single-document upsert; there are no transactions.
//!
//! Backends are chosen by connection string:
//!
//! - `memory://` keeps everything in process memory.
//! - `file:///path/to/dir` keeps one JSON file per collection, each write
//!   replacing the file atomically (write to temp file, then rename).
//! - `mongodb://` or `mongodb+srv://` uses a MongoDB database, one
//!   `update_one` upsert per write.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Local;
//! use rollcall_models::{AttendanceStatus, UserId};
//! use rollcall_persistence::connect;
//!
//! # async fn run() -> rollcall_persistence::Result<()> {
//! let store = connect("file:///var/lib/rollcall").await?;
//! let today = Local::now().date_naive();
//! store
//!     .upsert_attendance(UserId(42), "ann", today, AttendanceStatus::Present)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod file;
pub mod memory;
pub mod mongo;
pub mod store;
pub mod uri;

pub use error::{PersistenceError, Result};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{AttendanceStream, Store};
pub use uri::connect;
