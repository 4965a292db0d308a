//! Event dispatcher: the per-user conversation state machine.
//!
//! For every inbound event the dispatcher looks up the sender's pending
//! state, resolves exactly one action through the routing table, checks the
//! action's gate and runs its handler. Whatever happens, the caller gets the
//! list of replies to deliver; failures are turned into user-facing text here
//! and never reach the transport.

use std::sync::Arc;

use rollcall_core::{AuthOracle, Config};
use rollcall_persistence::{connect, PersistenceError, Store};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conversation::{ConversationState, ConversationStore};
use crate::error::Result;
use crate::event::{EventKind, InboundEvent};
use crate::handlers;
use crate::reply::Reply;
use crate::routing::{Action, Gate, RoutingTable};

/// Reply for any storage failure.
pub const STORAGE_FAILURE: &str = "Something went wrong while talking to the database. Please try again.";

/// Reply for events no route accepts.
pub const UNRECOGNIZED: &str = "Sorry, I didn't understand that. Please try again.";

/// Why a dispatch did not complete normally.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed user input; carries the re-prompt.
    #[error("invalid input: {0}")]
    Validation(&'static str),

    /// Sender lacks the privilege; carries the denial.
    #[error("not authorized: {0}")]
    Unauthorized(&'static str),

    /// The store failed; nothing was committed.
    #[error("storage failure: {0}")]
    Storage(#[from] PersistenceError),

    /// No route for this event in this state.
    #[error("unrecognized event")]
    Unrecognized,
}

impl DispatchError {
    fn into_replies(self, event: &EventKind, state: Option<ConversationState>) -> Vec<Reply> {
        let answer = |text: String| {
            if event.is_button() {
                Reply::notice(text)
            } else {
                Reply::send(text)
            }
        };

        let reply = match self {
            DispatchError::Validation(prompt) => answer(prompt.to_string()),
            DispatchError::Unauthorized(denial) => answer(denial.to_string()),
            DispatchError::Storage(_) => Reply::send(STORAGE_FAILURE),
            DispatchError::Unrecognized => match state {
                Some(_) => answer(format!("{UNRECOGNIZED} Send /cancel to start over.")),
                None => answer(UNRECOGNIZED.to_string()),
            },
        };
        vec![reply]
    }
}

/// Per-dispatch view handed to handlers.
pub struct Context<'a> {
    pub store: &'a dyn Store,
    pub auth: &'a AuthOracle,
    pub conversations: &'a ConversationStore,
    pub event: &'a InboundEvent,
    admin: Option<bool>,
}

impl<'a> Context<'a> {
    /// Admin check, asked of the oracle at most once per dispatch.
    pub async fn is_admin(&mut self) -> rollcall_persistence::Result<bool> {
        if let Some(admin) = self.admin {
            return Ok(admin);
        }
        let admin = self.auth.is_admin(self.event.user_id()).await?;
        self.admin = Some(admin);
        Ok(admin)
    }

    /// Admin check for menu rendering. A failing store hides admin entries
    /// instead of failing the reply.
    pub async fn is_admin_for_menu(&mut self) -> bool {
        match self.is_admin().await {
            Ok(admin) => admin,
            Err(e) => {
                warn!(user_id = %self.event.user_id(), error = %e, "Admin check failed, rendering user menu");
                false
            }
        }
    }
}

/// Routes inbound events to handlers.
pub struct Dispatcher {
    routes: Arc<RoutingTable>,
    store: Arc<dyn Store>,
    auth: AuthOracle,
    conversations: ConversationStore,
}

impl Dispatcher {
    pub fn new(routes: Arc<RoutingTable>, store: Arc<dyn Store>, auth: AuthOracle) -> Self {
        Self {
            routes,
            store,
            auth,
            conversations: ConversationStore::new(),
        }
    }

    /// Open the configured store, register the root admin and build a
    /// dispatcher with the standard routes.
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        let store = connect(&config.store_uri).await?;
        let auth = AuthOracle::new(Arc::clone(&store), config.root_admin);
        auth.ensure_root_admin().await?;

        let routes = Arc::new(RoutingTable::standard());
        info!(routes = routes.len(), "Dispatcher ready");
        Ok(Self::new(routes, store, auth))
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn auth(&self) -> &AuthOracle {
        &self.auth
    }

    /// Handle one event and return the replies to deliver, in order.
    pub async fn dispatch(&self, event: &InboundEvent) -> Vec<Reply> {
        let user_id = event.user_id();
        let state = self.conversations.get(user_id).await;
        let action = self.routes.resolve(state, &event.kind);
        debug!(user_id = %user_id, state = ?state, event = ?event.kind, action = ?action, "Dispatching");

        let mut ctx = Context {
            store: self.store.as_ref(),
            auth: &self.auth,
            conversations: &self.conversations,
            event,
            admin: None,
        };

        let outcome = match action {
            Some(action) => self.run(action, &mut ctx).await,
            None => Err(DispatchError::Unrecognized),
        };

        match outcome {
            Ok(replies) => replies,
            Err(e) => {
                match &e {
                    DispatchError::Storage(source) => {
                        warn!(user_id = %user_id, action = ?action, error = %source, "Storage failure, state left unchanged");
                    }
                    DispatchError::Unauthorized(_) => {
                        info!(user_id = %user_id, action = ?action, "Denied gated action");
                    }
                    DispatchError::Validation(_) | DispatchError::Unrecognized => {
                        debug!(user_id = %user_id, error = %e, "Re-prompting");
                    }
                }
                e.into_replies(&event.kind, state)
            }
        }
    }

    async fn run(&self, action: Action, ctx: &mut Context<'_>) -> std::result::Result<Vec<Reply>, DispatchError> {
        match action.gate() {
            Gate::Open => {}
            Gate::Admin => {
                if !ctx.is_admin().await? {
                    return Err(DispatchError::Unauthorized(action.denial()));
                }
            }
            Gate::Root => {
                if !ctx.auth.is_root(ctx.event.user_id()) {
                    return Err(DispatchError::Unauthorized(action.denial()));
                }
            }
        }
        handlers::run(action, ctx).await
    }
}
