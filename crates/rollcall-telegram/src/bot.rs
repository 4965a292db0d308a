//! Telegram transport for the dispatcher.
//!
//! Turns updates into [`InboundEvent`]s, runs them through the dispatcher
//! and delivers the resulting replies: edits go to the message whose button
//! was pressed, notices become callback answers.

use std::net::SocketAddr;
use std::sync::Arc;

use teloxide::dispatching::{Dispatcher as UpdateDispatcher, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, User};
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};
use url::Url;

use crate::dispatcher::Dispatcher;
use crate::error::{Result, TelegramError};
use crate::event::{Command, InboundEvent, Sender};
use crate::reply::{Delivery, Keyboard, Reply};

/// The Telegram bot for Rollcall.
pub struct RollcallBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Routes every event; shared by all update handlers.
    dispatcher: Arc<Dispatcher>,
}

impl RollcallBot {
    pub fn new(token: &str, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            bot: Bot::new(token),
            dispatcher,
        }
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Publish the command list shown in Telegram's menu.
    pub async fn register_commands(&self) -> Result<()> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        Ok(())
    }

    fn handler(&self) -> UpdateHandler<teloxide::RequestError> {
        let for_callbacks = Arc::clone(&self.dispatcher);
        let for_commands = Arc::clone(&self.dispatcher);
        let for_text = Arc::clone(&self.dispatcher);

        dptree::entry()
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery| {
                    let dispatcher = Arc::clone(&for_callbacks);
                    async move { handle_callback(bot, q, dispatcher).await }
                },
            ))
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let dispatcher = Arc::clone(&for_commands);
                        async move { handle_command(bot, msg, cmd, dispatcher).await }
                    }),
            )
            .branch(
                // Free text, including slash commands that did not parse.
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let dispatcher = Arc::clone(&for_text);
                        async move { handle_text(bot, msg, dispatcher).await }
                    }),
            )
    }

    /// Start the bot in long-polling mode. Runs until Ctrl+C.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        UpdateDispatcher::builder(self.bot.clone(), self.handler())
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Start the bot behind a webhook listening on `addr`, registered at `url`.
    pub async fn start_webhook(&self, addr: SocketAddr, url: Url) -> Result<()> {
        info!(addr = %addr, url = %url, "Starting Telegram bot in webhook mode...");

        let listener = webhooks::axum(self.bot.clone(), webhooks::Options::new(addr, url))
            .await
            .map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;

        UpdateDispatcher::builder(self.bot.clone(), self.handler())
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;

        Ok(())
    }
}

fn sender_of(user: &User) -> Sender {
    let display_name = user.username.clone().unwrap_or_else(|| user.full_name());
    Sender::new(user.id.0 as i64, display_name)
}

fn markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.tag))
    }))
}

async fn send(bot: &Bot, chat: ChatId, text: String, keyboard: Option<Keyboard>) -> ResponseResult<()> {
    let mut req = bot.send_message(chat, text);
    if let Some(keyboard) = keyboard {
        req = req.reply_markup(markup(keyboard));
    }
    req.await?;
    Ok(())
}

/// Deliver replies to `chat`. `editable` is the message an `Edit` rewrites.
async fn deliver(
    bot: &Bot,
    chat: ChatId,
    editable: Option<MessageId>,
    replies: Vec<Reply>,
) -> ResponseResult<()> {
    for reply in replies {
        let Reply {
            delivery,
            text,
            keyboard,
        } = reply;

        match (delivery, editable) {
            (Delivery::Edit, Some(message_id)) => {
                let mut req = bot.edit_message_text(chat, message_id, text.clone());
                if let Some(keyboard) = keyboard.clone() {
                    req = req.reply_markup(markup(keyboard));
                }
                if let Err(e) = req.await {
                    // Old or unchanged messages can't be edited; post instead.
                    warn!(chat_id = %chat, error = %e, "Edit failed, sending new message");
                    send(bot, chat, text, keyboard).await?;
                }
            }
            _ => send(bot, chat, text, keyboard).await?,
        }
    }
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<Dispatcher>,
) -> ResponseResult<()> {
    let Some(tag) = q.data.clone() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let event = InboundEvent::button(sender_of(&q.from), tag);
    let replies = dispatcher.dispatch(&event).await;

    let (notices, replies): (Vec<Reply>, Vec<Reply>) = replies
        .into_iter()
        .partition(|reply| reply.delivery == Delivery::Notice);

    let mut answer = bot.answer_callback_query(q.id.clone());
    if !notices.is_empty() {
        let text: Vec<String> = notices.into_iter().map(|n| n.text).collect();
        answer = answer.text(text.join("\n"));
    }
    answer.await?;

    let (chat, editable) = match q.message.as_ref() {
        Some(message) => (message.chat().id, Some(message.id())),
        None => (ChatId::from(q.from.id), None),
    };
    deliver(&bot, chat, editable, replies).await
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<Dispatcher>,
) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);

    let event = InboundEvent::command(sender_of(user), cmd);
    let replies = dispatcher.dispatch(&event).await;
    deliver(&bot, msg.chat.id, None, replies).await
}

async fn handle_text(bot: Bot, msg: Message, dispatcher: Arc<Dispatcher>) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    debug!(chat_id = %msg.chat.id, "Text message received");

    let event = InboundEvent::text(sender_of(user), text);
    let replies = dispatcher.dispatch(&event).await;
    deliver(&bot, msg.chat.id, None, replies).await
}
