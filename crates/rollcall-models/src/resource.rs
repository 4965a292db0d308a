//! Shared laundry machine status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Availability of the shared washing machines.
///
/// Stored as a singleton; every write replaces all three fields together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// Whether the machines are free to use.
    pub available: bool,
    /// Display name of whoever reported the status.
    pub updated_by: String,
    /// When the status was reported.
    pub updated_at: DateTime<Utc>,
}

impl ResourceStatus {
    /// Creates a status stamped with the current time.
    pub fn now(available: bool, updated_by: impl Into<String>) -> Self {
        Self {
            available,
            updated_by: updated_by.into(),
            updated_at: Utc::now(),
        }
    }

    /// Human-readable availability word.
    pub fn availability_label(&self) -> &'static str {
        if self.available {
            "available"
        } else {
            "not available"
        }
    }
}
