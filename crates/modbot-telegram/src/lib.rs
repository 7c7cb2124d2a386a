//! Telegram adapter (teloxide).
//!
//! This crate implements the `modbot-core` ModerationPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ChatMember, ChatMemberStatus, Recipient},
};
use tokio::sync::OnceCell;

pub mod handlers;
pub mod router;

use modbot_core::{
    domain::{BanTarget, ChatId, UserId},
    errors::{RemoteCallError, RemoteResult},
    ports::{MemberInfo, MemberStatus, ModerationPort},
};

#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
    me: OnceCell<UserId>,
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            me: OnceCell::new(),
        }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_user(user_id: UserId) -> RemoteResult<teloxide::types::UserId> {
        u64::try_from(user_id.0)
            .map(teloxide::types::UserId)
            .map_err(|_| RemoteCallError::new(format!("invalid user id {user_id}")))
    }

    fn map_err(e: teloxide::RequestError) -> RemoteCallError {
        RemoteCallError::new(e.to_string())
    }

    /// Look up a public `@handle` and return the numeric id behind it.
    ///
    /// `getChat` only resolves usernames of public channels and supergroups.
    /// Ordinary user handles fail here, so each chat records a failure line
    /// for them; ban users by numeric id instead.
    async fn resolve_handle(&self, handle: &str) -> RemoteResult<UserId> {
        let chat = self
            .bot
            .get_chat(Recipient::ChannelUsername(handle.to_string()))
            .await
            .map_err(Self::map_err)?;
        Ok(UserId(chat.id.0))
    }
}

pub(crate) fn member_status(status: ChatMemberStatus) -> MemberStatus {
    match status {
        ChatMemberStatus::Owner => MemberStatus::Creator,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Banned,
    }
}

fn member_info(member: &ChatMember) -> MemberInfo {
    MemberInfo {
        user_id: UserId(member.user.id.0 as i64),
        status: member_status(member.kind.status()),
        can_restrict_members: member.kind.can_restrict_members(),
    }
}

#[async_trait]
impl ModerationPort for TelegramPlatform {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> RemoteResult<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn get_me(&self) -> RemoteResult<UserId> {
        let id = self
            .me
            .get_or_try_init(|| async {
                let me = self.bot.get_me().await.map_err(Self::map_err)?;
                Ok::<_, RemoteCallError>(UserId(me.id.0 as i64))
            })
            .await?;
        Ok(*id)
    }

    async fn get_chat_member(&self, chat_id: ChatId, who: &BanTarget) -> RemoteResult<MemberInfo> {
        let user_id = match who {
            BanTarget::Numeric(id) => *id,
            BanTarget::Handle(handle) => self.resolve_handle(handle).await?,
        };
        let member = self
            .bot
            .get_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id)?)
            .await
            .map_err(Self::map_err)?;
        Ok(member_info(&member))
    }

    async fn ban_chat_member(&self, chat_id: ChatId, user_id: UserId) -> RemoteResult<()> {
        self.bot
            .ban_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id)?)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn unban_chat_member(&self, chat_id: ChatId, user_id: UserId) -> RemoteResult<()> {
        self.bot
            .unban_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id)?)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
