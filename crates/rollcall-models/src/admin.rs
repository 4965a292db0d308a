//! Admin membership records.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Membership of one identity in the admin set.
///
/// The record's existence is the membership; there are no other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminRecord {
    pub user_id: UserId,
}

impl AdminRecord {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
