//! Telegram update handlers.
//!
//! Each handler only adapts the Telegram update into core types; the
//! moderation logic lives in `modbot-core`.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use modbot_core::{
    commands::parse_command,
    domain::{ChatId, UserId},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(cmd) = parse_command(text) else {
        return Ok(());
    };
    if !cmd.is_addressed_to(state.bot_username.as_deref()) {
        tracing::debug!(mention = ?cmd.mention, "command addressed to another bot");
        return Ok(());
    }

    let chat_id = ChatId(msg.chat.id.0);
    let invoker = msg.from().map(|u| UserId(u.id.0 as i64));

    state.moderator.handle(chat_id, invoker, &cmd).await;
    Ok(())
}
