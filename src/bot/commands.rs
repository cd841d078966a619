use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;

use crate::bot::{outbound, AppState, HandlerResult};
use crate::conversation::{Command, Event};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommand {
    #[command(description = "Main menu")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Content management (admins only)")]
    Admin,
    #[command(description = "Abort the current step")]
    Cancel,
}

impl From<BotCommand> for Command {
    fn from(cmd: BotCommand) -> Self {
        match cmd {
            BotCommand::Start => Command::Start,
            BotCommand::Help => Command::Help,
            BotCommand::Admin => Command::Admin,
            BotCommand::Cancel => Command::Cancel,
        }
    }
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    tracing::info!(user_id, username = ?user.username, "Command received");

    let replies = state
        .conversation
        .handle(user_id, Event::Command(cmd.into()))
        .await;
    outbound::deliver(&bot, msg.chat.id, None, replies).await;

    Ok(())
}
