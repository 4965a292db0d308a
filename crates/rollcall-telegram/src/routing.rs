//! Routing table: `(conversation state, event pattern) -> action`.
//!
//! The table is plain data, built once at startup and shared with the
//! dispatcher. Exact patterns (a command, a button tag) win over the
//! wildcards `AnyButton` and `AnyText` registered for the same state.

use std::collections::HashMap;

use crate::conversation::ConversationState;
use crate::event::{Command, EventKind};
use crate::menus::tags;

/// What an event must look like to match a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventPattern {
    Command(Command),
    Button(String),
    AnyButton,
    AnyText,
}

/// Who may run an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Open,
    Admin,
    Root,
}

/// Handler selected by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ShowWelcome,
    ShowHelp,
    ShowMainMenu,
    BeginAttendance,
    RecordAttendance,
    ShowAdminMenu,
    SendReport,
    BeginAddAdmin,
    AddAdmin,
    ListAdmins,
    ShowLaundryMenu,
    CheckLaundry,
    BeginLaundryUpdate,
    RecordLaundry,
    Cancel,
    IgnoreStale,
}

impl Action {
    /// Privilege required before the handler runs.
    pub fn gate(&self) -> Gate {
        match self {
            Action::ShowAdminMenu
            | Action::SendReport
            | Action::ListAdmins
            | Action::BeginLaundryUpdate => Gate::Admin,
            Action::BeginAddAdmin => Gate::Root,
            _ => Gate::Open,
        }
    }

    /// Message shown when the gate refuses the sender.
    pub fn denial(&self) -> &'static str {
        match self {
            Action::SendReport => "Sorry, only admins can access the attendance report.",
            Action::ListAdmins => "Sorry, only admins can view the list of admins.",
            Action::BeginAddAdmin => "Sorry, only the main admin can add new admins.",
            Action::BeginLaundryUpdate => {
                "Sorry, only admins can update the washing machine status."
            }
            _ => "Sorry, only admins can access this menu.",
        }
    }
}

type RouteKey = (Option<ConversationState>, EventPattern);

/// The bot's routes.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: HashMap<RouteKey, Action>,
}

impl RoutingTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `pattern` in `state` (`None` = idle).
    pub fn route(
        mut self,
        state: Option<ConversationState>,
        pattern: EventPattern,
        action: Action,
    ) -> Self {
        self.routes.insert((state, pattern), action);
        self
    }

    fn button(self, state: Option<ConversationState>, tag: &str, action: Action) -> Self {
        self.route(state, EventPattern::Button(tag.to_string()), action)
    }

    fn command(self, state: Option<ConversationState>, command: Command, action: Action) -> Self {
        self.route(state, EventPattern::Command(command), action)
    }

    /// The table the bot runs with.
    pub fn standard() -> Self {
        use ConversationState::*;

        let idle = None;
        let mut table = Self::new()
            .command(idle, Command::Start, Action::ShowWelcome)
            .command(idle, Command::Help, Action::ShowHelp)
            .button(idle, tags::MAIN_MENU, Action::ShowMainMenu)
            .command(idle, Command::Attendance, Action::BeginAttendance)
            .button(idle, tags::ATTENDANCE, Action::BeginAttendance)
            .button(idle, tags::ADMIN_MENU, Action::ShowAdminMenu)
            .command(idle, Command::Report, Action::SendReport)
            .button(idle, tags::GENERATE_REPORT, Action::SendReport)
            .command(idle, Command::AddAdmin, Action::BeginAddAdmin)
            .button(idle, tags::ADD_ADMIN, Action::BeginAddAdmin)
            .command(idle, Command::Admins, Action::ListAdmins)
            .button(idle, tags::LIST_ADMINS, Action::ListAdmins)
            .command(idle, Command::Laundry, Action::ShowLaundryMenu)
            .button(idle, tags::WASHING_MACHINES, Action::ShowLaundryMenu)
            .button(idle, tags::CHECK_WASHING_MACHINES, Action::CheckLaundry)
            .button(idle, tags::UPDATE_WASHING_MACHINES, Action::BeginLaundryUpdate)
            .route(Some(AwaitingAttendance), EventPattern::AnyButton, Action::RecordAttendance)
            .route(Some(AwaitingNewAdminId), EventPattern::AnyText, Action::AddAdmin)
            .button(Some(AwaitingResourceStatus), tags::WASHING_AVAILABLE, Action::RecordLaundry)
            .button(Some(AwaitingResourceStatus), tags::WASHING_NOT_AVAILABLE, Action::RecordLaundry);

        // Buttons from keyboards whose conversation already ended.
        for tag in ["present", "absent", "late", tags::WASHING_AVAILABLE, tags::WASHING_NOT_AVAILABLE] {
            table = table.button(idle, tag, Action::IgnoreStale);
        }

        table = table.command(idle, Command::Cancel, Action::Cancel);
        for state in ConversationState::ALL {
            table = table.command(Some(state), Command::Cancel, Action::Cancel);
        }

        table
    }

    /// Find the action for an event in `state`, if any route matches.
    pub fn resolve(&self, state: Option<ConversationState>, event: &EventKind) -> Option<Action> {
        let (exact, wildcard) = match event {
            EventKind::Command(command) => (Some(EventPattern::Command(*command)), None),
            EventKind::ButtonPress(tag) => (
                Some(EventPattern::Button(tag.clone())),
                Some(EventPattern::AnyButton),
            ),
            EventKind::TextReply(_) => (None, Some(EventPattern::AnyText)),
        };

        exact
            .and_then(|pattern| self.routes.get(&(state, pattern)))
            .or_else(|| wildcard.and_then(|pattern| self.routes.get(&(state, pattern))))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(tag: &str) -> EventKind {
        EventKind::ButtonPress(tag.to_string())
    }

    fn text(content: &str) -> EventKind {
        EventKind::TextReply(content.to_string())
    }

    #[test]
    fn test_idle_routes() {
        let table = RoutingTable::standard();
        assert_eq!(
            table.resolve(None, &EventKind::Command(Command::Start)),
            Some(Action::ShowWelcome)
        );
        assert_eq!(table.resolve(None, &button(tags::ATTENDANCE)), Some(Action::BeginAttendance));
        assert_eq!(table.resolve(None, &button("present")), Some(Action::IgnoreStale));
        assert_eq!(table.resolve(None, &text("hello")), None);
        assert_eq!(table.resolve(None, &button("bogus")), None);
    }

    #[test]
    fn test_state_routes_are_exact_on_state() {
        let table = RoutingTable::standard();
        let attendance = Some(ConversationState::AwaitingAttendance);
        let admin_id = Some(ConversationState::AwaitingNewAdminId);
        let laundry = Some(ConversationState::AwaitingResourceStatus);

        assert_eq!(table.resolve(attendance, &button("bogus")), Some(Action::RecordAttendance));
        assert_eq!(table.resolve(attendance, &text("Present")), None);
        assert_eq!(
            table.resolve(attendance, &EventKind::Command(Command::Start)),
            None
        );

        assert_eq!(table.resolve(admin_id, &text("12345")), Some(Action::AddAdmin));
        assert_eq!(table.resolve(admin_id, &button(tags::ADD_ADMIN)), None);

        assert_eq!(
            table.resolve(laundry, &button(tags::WASHING_NOT_AVAILABLE)),
            Some(Action::RecordLaundry)
        );
        assert_eq!(table.resolve(laundry, &button(tags::MAIN_MENU)), None);
        assert_eq!(table.resolve(laundry, &text("yes")), None);
    }

    #[test]
    fn test_cancel_everywhere() {
        let table = RoutingTable::standard();
        let cancel = EventKind::Command(Command::Cancel);
        assert_eq!(table.resolve(None, &cancel), Some(Action::Cancel));
        for state in ConversationState::ALL {
            assert_eq!(table.resolve(Some(state), &cancel), Some(Action::Cancel));
        }
    }

    #[test]
    fn test_exact_beats_wildcard() {
        let state = Some(ConversationState::AwaitingAttendance);
        let table = RoutingTable::new()
            .route(state, EventPattern::AnyButton, Action::RecordAttendance)
            .route(state, EventPattern::Button("skip".into()), Action::Cancel);

        assert_eq!(table.resolve(state, &button("skip")), Some(Action::Cancel));
        assert_eq!(table.resolve(state, &button("present")), Some(Action::RecordAttendance));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_gates() {
        assert_eq!(Action::SendReport.gate(), Gate::Admin);
        assert_eq!(Action::BeginAddAdmin.gate(), Gate::Root);
        assert_eq!(Action::BeginLaundryUpdate.gate(), Gate::Admin);
        assert_eq!(Action::CheckLaundry.gate(), Gate::Open);
        assert_eq!(Action::AddAdmin.gate(), Gate::Open);
    }
}
