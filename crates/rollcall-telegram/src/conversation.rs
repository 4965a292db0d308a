//! Per-user conversation state.
//!
//! Each user is either idle (no entry) or in the middle of exactly one
//! multi-step interaction. Entries live in process memory only; a restart
//! drops every in-flight conversation and users start over from the menu.

use std::collections::HashMap;

use rollcall_models::UserId;
use tokio::sync::RwLock;
use tracing::debug;

/// The step a user is expected to complete next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationState {
    /// Waiting for a Present/Absent/Late button.
    AwaitingAttendance,
    /// Waiting for the numeric id of a new admin.
    AwaitingNewAdminId,
    /// Waiting for an Available/Not Available button.
    AwaitingResourceStatus,
}

impl ConversationState {
    pub const ALL: [ConversationState; 3] = [
        ConversationState::AwaitingAttendance,
        ConversationState::AwaitingNewAdminId,
        ConversationState::AwaitingResourceStatus,
    ];
}

/// Pending state tag per user.
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: RwLock<HashMap<UserId, ConversationState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, `None` when idle.
    pub async fn get(&self, user_id: UserId) -> Option<ConversationState> {
        self.states.read().await.get(&user_id).copied()
    }

    /// Enter `state`, replacing whatever was pending.
    pub async fn set(&self, user_id: UserId, state: ConversationState) {
        debug!(user_id = %user_id, state = ?state, "Entering conversation state");
        self.states.write().await.insert(user_id, state);
    }

    /// Return to idle. Yields the state that was pending, if any.
    pub async fn clear(&self, user_id: UserId) -> Option<ConversationState> {
        let previous = self.states.write().await.remove(&user_id);
        if let Some(state) = previous {
            debug!(user_id = %user_id, state = ?state, "Conversation state resolved");
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let store = ConversationStore::new();
        let user = UserId(7);
        assert_eq!(store.get(user).await, None);

        store.set(user, ConversationState::AwaitingAttendance).await;
        assert_eq!(store.get(user).await, Some(ConversationState::AwaitingAttendance));

        store.set(user, ConversationState::AwaitingNewAdminId).await;
        assert_eq!(store.get(user).await, Some(ConversationState::AwaitingNewAdminId));

        assert_eq!(store.clear(user).await, Some(ConversationState::AwaitingNewAdminId));
        assert_eq!(store.get(user).await, None);
        assert_eq!(store.clear(user).await, None);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = ConversationStore::new();
        store.set(UserId(1), ConversationState::AwaitingAttendance).await;
        store.set(UserId(2), ConversationState::AwaitingResourceStatus).await;

        store.clear(UserId(1)).await;
        assert_eq!(store.get(UserId(1)).await, None);
        assert_eq!(
            store.get(UserId(2)).await,
            Some(ConversationState::AwaitingResourceStatus)
        );
    }
}
