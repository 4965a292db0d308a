//! Telegram bot for Rollcall: daily attendance and laundry machine status.
//!
//! Users mark themselves Present, Absent or Late once a day and can check or
//! report whether the shared washing machines are free. Admins get a daily
//! report and can list admins; the main admin can add new ones.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: Bot token from @BotFather
//! - `STORE_URI`: `memory://`, `file:///path/to/dir` or `mongodb://host/db`
//!   (`MONGO_URI` is accepted instead)
//! - `MAIN_ADMIN_ID`: Telegram user id of the main admin
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollcall_core::Config;
//! use rollcall_telegram::{Dispatcher, RollcallBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let dispatcher = Arc::new(Dispatcher::bootstrap(&config).await?);
//!     let bot = RollcallBot::new(&config.bot_token, dispatcher);
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start`, `/help` - Main menu
//! - `/attendance` - Mark today's attendance
//! - `/laundry` - Washing machine menu
//! - `/report` - Today's attendance report (admins)
//! - `/addadmin` - Add an admin (main admin)
//! - `/admins` - List admins (admins)
//! - `/cancel` - Abandon the current step

pub mod bot;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod event;
mod handlers;
pub mod menus;
pub mod reply;
pub mod routing;

pub use bot::RollcallBot;
pub use conversation::{ConversationState, ConversationStore};
pub use dispatcher::{DispatchError, Dispatcher};
pub use error::{Result, TelegramError};
pub use event::{Command, EventKind, InboundEvent, Sender};
pub use handlers::describe_laundry;
pub use reply::{Button, Delivery, Keyboard, Reply};
pub use routing::{Action, EventPattern, Gate, RoutingTable};
