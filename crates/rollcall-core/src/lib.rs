//! Core business logic for Rollcall.
//!
//! This crate provides functionality shared by every Rollcall front end:
//! - Startup configuration from the environment
//! - The authorization oracle (admin and root checks)
//! - Daily attendance report aggregation

pub mod auth;
pub mod config;
pub mod report;

pub use auth::AuthOracle;
pub use config::{env_file, state_dir, Config, ConfigError};
pub use report::{aggregate, aggregate_with, AttendanceReport, Bucket};
