//! Action handlers.
//!
//! Each handler runs after its gate has passed. A handler that writes to the
//! store only moves the conversation state once the write has succeeded.

use chrono::{Local, NaiveDate};
use futures::TryStreamExt;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use rollcall_core::aggregate;
use rollcall_models::{AttendanceRecord, AttendanceStatus, ResourceStatus, UserId};

use crate::conversation::ConversationState;
use crate::dispatcher::{Context, DispatchError};
use crate::event::{Command, EventKind, InboundEvent};
use crate::menus::{self, laundry_availability};
use crate::reply::Reply;
use crate::routing::Action;

type HandlerResult = Result<Vec<Reply>, DispatchError>;

/// Run the handler for `action`.
pub(crate) async fn run(action: Action, ctx: &mut Context<'_>) -> HandlerResult {
    match action {
        Action::ShowWelcome => show_welcome(ctx).await,
        Action::ShowHelp => show_help(ctx).await,
        Action::ShowMainMenu => show_main_menu(ctx).await,
        Action::BeginAttendance => begin_attendance(ctx).await,
        Action::RecordAttendance => record_attendance(ctx).await,
        Action::ShowAdminMenu => Ok(vec![admin_menu(Reply::edit("Admin Menu:"))]),
        Action::SendReport => send_report(ctx).await,
        Action::BeginAddAdmin => begin_add_admin(ctx).await,
        Action::AddAdmin => add_admin(ctx).await,
        Action::ListAdmins => list_admins(ctx).await,
        Action::ShowLaundryMenu => Ok(vec![laundry_menu(Reply::edit("Washing Machines Menu:"))]),
        Action::CheckLaundry => check_laundry(ctx).await,
        Action::BeginLaundryUpdate => begin_laundry_update(ctx).await,
        Action::RecordLaundry => record_laundry(ctx).await,
        Action::Cancel => cancel(ctx).await,
        Action::IgnoreStale => {
            debug!(user_id = %ctx.event.user_id(), event = ?ctx.event.kind, "Ignoring stale button");
            Ok(Vec::new())
        }
    }
}

/// Local calendar day attendance is recorded against.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn admin_menu(reply: Reply) -> Reply {
    reply.with_keyboard(menus::admin_menu())
}

fn laundry_menu(reply: Reply) -> Reply {
    reply.with_keyboard(menus::laundry_menu())
}

async fn main_menu(ctx: &mut Context<'_>, reply: Reply) -> Reply {
    let is_admin = ctx.is_admin_for_menu().await;
    reply.with_keyboard(menus::main_menu(is_admin))
}

fn button_tag<'e>(ctx: &Context<'e>) -> Option<&'e str> {
    let event: &'e InboundEvent = ctx.event;
    match &event.kind {
        EventKind::ButtonPress(tag) => Some(tag.as_str()),
        _ => None,
    }
}

fn text_reply<'e>(ctx: &Context<'e>) -> Option<&'e str> {
    let event: &'e InboundEvent = ctx.event;
    match &event.kind {
        EventKind::TextReply(content) => Some(content.as_str()),
        _ => None,
    }
}

async fn show_welcome(ctx: &mut Context<'_>) -> HandlerResult {
    info!(user_id = %ctx.event.user_id(), name = %ctx.event.sender.display_name, "User started bot");
    Ok(vec![main_menu(ctx, Reply::send("Welcome! Please select an option:")).await])
}

async fn show_help(ctx: &mut Context<'_>) -> HandlerResult {
    let help = Command::descriptions().to_string();
    Ok(vec![main_menu(ctx, Reply::send(help)).await])
}

async fn show_main_menu(ctx: &mut Context<'_>) -> HandlerResult {
    Ok(vec![main_menu(ctx, Reply::edit("Main Menu:")).await])
}

async fn begin_attendance(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.conversations
        .set(ctx.event.user_id(), ConversationState::AwaitingAttendance)
        .await;
    Ok(vec![Reply::edit("What's your attendance status for today?")
        .with_keyboard(menus::attendance_menu())])
}

async fn record_attendance(ctx: &mut Context<'_>) -> HandlerResult {
    let status = button_tag(ctx)
        .and_then(AttendanceStatus::from_button_tag)
        .ok_or(DispatchError::Validation("Invalid option. Please try again."))?;

    let sender = &ctx.event.sender;
    let date = today();
    ctx.store
        .upsert_attendance(sender.user_id, &sender.display_name, date, status)
        .await?;
    ctx.conversations.clear(sender.user_id).await;
    info!(user_id = %sender.user_id, date = %date, status = %status, "Attendance recorded");

    Ok(vec![
        Reply::edit(format!(
            "Your attendance has been recorded as '{}'. Thank you!",
            status.label()
        )),
        main_menu(ctx, Reply::send("What would you like to do next?")).await,
    ])
}

async fn send_report(ctx: &mut Context<'_>) -> HandlerResult {
    let date = today();
    let records: Vec<AttendanceRecord> = ctx
        .store
        .attendance_for_date(date)
        .await?
        .try_collect()
        .await?;
    let report = aggregate(date, records);

    Ok(vec![
        Reply::send(report.to_string()),
        admin_menu(Reply::send("Admin Menu:")),
    ])
}

async fn begin_add_admin(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.conversations
        .set(ctx.event.user_id(), ConversationState::AwaitingNewAdminId)
        .await;
    Ok(vec![Reply::edit("Please enter the user ID of the new admin.")])
}

async fn add_admin(ctx: &mut Context<'_>) -> HandlerResult {
    let new_admin = text_reply(ctx)
        .and_then(|text| text.parse::<UserId>().ok())
        .ok_or(DispatchError::Validation(
            "Please enter a valid user ID (numbers only).",
        ))?;

    ctx.store.add_admin(new_admin).await?;
    ctx.conversations.clear(ctx.event.user_id()).await;
    info!(by = %ctx.event.user_id(), new_admin = %new_admin, "Admin added");

    Ok(vec![
        Reply::send(format!(
            "User with ID {} has been added as an admin.",
            new_admin
        )),
        admin_menu(Reply::send("Admin Menu:")),
    ])
}

async fn list_admins(ctx: &mut Context<'_>) -> HandlerResult {
    let admins = ctx.store.list_admins().await?;

    let mut lines = vec!["Admin List:\n".to_string()];
    lines.extend(admins.iter().map(|id| format!("- User ID: {}", id)));

    Ok(vec![
        Reply::send(lines.join("\n")),
        admin_menu(Reply::send("Admin Menu:")),
    ])
}

/// Renders the laundry status message.
pub fn describe_laundry(status: Option<&ResourceStatus>) -> String {
    match status {
        Some(status) => format!(
            "Washing machines are currently {}.\nLast updated by: {}\nLast updated at: {}",
            status.availability_label(),
            status.updated_by,
            status
                .updated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        None => "No information available about washing machines.".to_string(),
    }
}

async fn check_laundry(ctx: &mut Context<'_>) -> HandlerResult {
    let status = ctx.store.resource_status().await?;
    Ok(vec![
        Reply::send(describe_laundry(status.as_ref())),
        laundry_menu(Reply::send("Washing Machines Menu:")),
    ])
}

async fn begin_laundry_update(ctx: &mut Context<'_>) -> HandlerResult {
    ctx.conversations
        .set(ctx.event.user_id(), ConversationState::AwaitingResourceStatus)
        .await;
    Ok(vec![Reply::edit("Are the washing machines available?")
        .with_keyboard(menus::laundry_status_menu())])
}

async fn record_laundry(ctx: &mut Context<'_>) -> HandlerResult {
    let available = button_tag(ctx)
        .and_then(laundry_availability)
        .ok_or(DispatchError::Unrecognized)?;

    let sender = &ctx.event.sender;
    let status = ResourceStatus::now(available, sender.display_name.clone());
    let label = status.availability_label();
    ctx.store.set_resource_status(status).await?;
    ctx.conversations.clear(sender.user_id).await;
    info!(user_id = %sender.user_id, available, "Laundry status updated");

    Ok(vec![
        Reply::notice("Thank you for updating the washing machine status!"),
        Reply::edit(format!("Washing machines are now marked as {}.", label)),
        laundry_menu(Reply::send("Washing Machines Menu:")),
    ])
}

async fn cancel(ctx: &mut Context<'_>) -> HandlerResult {
    let text = match ctx.conversations.clear(ctx.event.user_id()).await {
        Some(_) => "Cancelled. What would you like to do next?",
        None => "Nothing to cancel. What would you like to do next?",
    };
    Ok(vec![main_menu(ctx, Reply::send(text)).await])
}
