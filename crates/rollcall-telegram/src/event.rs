//! Normalized inbound events.
//!
//! The transport turns every Telegram update it cares about into an
//! [`InboundEvent`]: who sent it, and whether it was a command, a button
//! press or free text.

use rollcall_models::UserId;
use teloxide::utils::command::BotCommands;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the main menu")]
    Start,

    #[command(description = "Show this help message")]
    Help,

    #[command(description = "Mark your attendance for today")]
    Attendance,

    #[command(description = "Check or update the washing machines")]
    Laundry,

    #[command(description = "Today's attendance report (admins)")]
    Report,

    #[command(description = "Add a new admin (main admin only)")]
    AddAdmin,

    #[command(description = "List admins (admins)")]
    Admins,

    #[command(description = "Abandon the current step")]
    Cancel,
}

/// Who an event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: UserId,
    /// Username, or full name for users without one.
    pub display_name: String,
}

impl Sender {
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Shape of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A recognized slash command.
    Command(Command),
    /// An inline keyboard button, identified by its callback tag.
    ButtonPress(String),
    /// Any other text, including unknown slash commands.
    TextReply(String),
}

impl EventKind {
    pub fn is_button(&self) -> bool {
        matches!(self, EventKind::ButtonPress(_))
    }
}

/// An event from one user, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: Sender,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn command(sender: Sender, command: Command) -> Self {
        Self {
            sender,
            kind: EventKind::Command(command),
        }
    }

    pub fn button(sender: Sender, tag: impl Into<String>) -> Self {
        Self {
            sender,
            kind: EventKind::ButtonPress(tag.into()),
        }
    }

    pub fn text(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            kind: EventKind::TextReply(content.into()),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.sender.user_id
    }
}
