//! Core data models for Rollcall.
//!
//! This crate provides the record types shared by the persistence layer,
//! the report aggregator and the Telegram bot: attendance records, admin
//! membership and the laundry machine status singleton.

pub mod admin;
pub mod attendance;
pub mod ids;
pub mod resource;

// Re-export main types
pub use admin::AdminRecord;
pub use attendance::{AttendanceRecord, AttendanceStatus, RecordedStatus};
pub use ids::UserId;
pub use resource::ResourceStatus;
