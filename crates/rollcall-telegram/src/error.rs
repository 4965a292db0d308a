//! Error types for the Telegram bot.

use rollcall_core::ConfigError;
use rollcall_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can stop the bot from starting or serving.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The store could not be opened or the root admin not registered.
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook registration failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<teloxide::RequestError> for TelegramError {
    fn from(e: teloxide::RequestError) -> Self {
        TelegramError::BotStartFailed(e.to_string())
    }
}
