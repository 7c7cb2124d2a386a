//! Admin command handlers: the managed-chat registry and the global ban fan-out.
//!
//! Handlers never fail past this module. Rejections and per-chat platform
//! errors are turned into reply text for the invoking chat.

use std::{fmt, sync::Arc};

use crate::{
    commands::{Command, ParsedCommand},
    domain::{BanTarget, ChatId, UserId},
    errors::{Error, RemoteCallError, RemoteResult},
    formatting::split_message,
    ports::ModerationPort,
    security::AdminSet,
    store::StateStore,
};

const BAN_USAGE: &str = "/globalban <user_id or @username> [reason]";
const UNBAN_USAGE: &str = "/globalunban <user_id or @username>";
const DEFAULT_REASON: &str = "No reason provided";

const START_TEXT: &str = "Moderation bot online.\n\n\
Admin commands:\n\
/register - Manage this chat\n\
/unregister - Stop managing this chat\n\
/list_managed - List managed chats\n\
/globalban <user_id or @username> [reason] - Ban in every managed chat\n\
/globalunban <user_id or @username> - Lift a global ban";

/// Why a command was refused. The `Display` text is the reply.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("Only configured bot admins can register chats.")]
    RegisterDenied,
    #[error("Only configured bot admins can unregister chats.")]
    UnregisterDenied,
    #[error("Only configured bot admins can view this list.")]
    ListDenied,
    #[error("You are not authorized to run that command.")]
    NotAuthorized,

    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Could not parse user id. Provide numeric id or @username.")]
    UnparsableTarget,

    #[error("This chat is already managed.")]
    AlreadyManaged,
    #[error("This chat is not managed.")]
    NotManaged,
    #[error("{0} is already globally banned.")]
    AlreadyBanned(String),
    #[error("{0} is not in the global ban list.")]
    NotBanned(String),

    #[error("Failed to save moderation state: {0}")]
    Storage(#[from] Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BanAction {
    Ban,
    Unban,
}

impl fmt::Display for BanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ban => "ban",
            Self::Unban => "unban",
        })
    }
}

/// Result of applying a ban or unban in one managed chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatOutcome {
    Done,
    MissingPermission,
    Failed(RemoteCallError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatResult {
    pub chat_id: ChatId,
    pub outcome: ChatOutcome,
}

/// Per-chat results of one fan-out, in managed-chat order.
#[derive(Clone, Debug)]
pub struct FanOutReport {
    pub action: BanAction,
    pub raw_target: String,
    pub results: Vec<ChatResult>,
}

impl FanOutReport {
    pub fn lines(&self) -> Vec<String> {
        self.results.iter().map(|r| self.line(r)).collect()
    }

    fn line(&self, r: &ChatResult) -> String {
        let chat = r.chat_id;
        let target = &self.raw_target;
        match (&r.outcome, self.action) {
            (ChatOutcome::Done, BanAction::Ban) => format!("Chat {chat}: banned user {target}."),
            (ChatOutcome::Done, BanAction::Unban) => {
                format!("Chat {chat}: unbanned user {target}.")
            }
            (ChatOutcome::MissingPermission, _) => {
                format!("Chat {chat}: bot lacks ban permission, skipped.")
            }
            (ChatOutcome::Failed(e), action) => format!("Chat {chat}: failed to {action} ({e})."),
        }
    }

    fn render(&self) -> String {
        if self.results.is_empty() {
            return "(no managed chats)".to_string();
        }
        self.lines().join("\n")
    }
}

pub struct Moderator {
    store: Arc<StateStore>,
    admins: AdminSet,
    platform: Arc<dyn ModerationPort>,
    message_limit: usize,
}

impl Moderator {
    pub fn new(
        store: Arc<StateStore>,
        admins: AdminSet,
        platform: Arc<dyn ModerationPort>,
    ) -> Self {
        Self {
            store,
            admins,
            platform,
            message_limit: 4000,
        }
    }

    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.message_limit = limit;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run a command and send the reply (split if long) to the invoking chat.
    pub async fn handle(&self, chat_id: ChatId, invoker: Option<UserId>, cmd: &ParsedCommand) {
        let Some(reply) = self.execute(chat_id, invoker, cmd).await else {
            return;
        };
        for chunk in split_message(&reply, self.message_limit) {
            if let Err(e) = self.platform.send_text(chat_id, &chunk).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
            }
        }
    }

    /// Run a command and return its reply text. `None` for unknown commands.
    pub async fn execute(
        &self,
        chat_id: ChatId,
        invoker: Option<UserId>,
        cmd: &ParsedCommand,
    ) -> Option<String> {
        let Some(command) = cmd.command() else {
            tracing::debug!(name = %cmd.name, "ignoring unknown command");
            return None;
        };
        tracing::info!(
            command = %cmd.name,
            chat_id = chat_id.0,
            user_id = invoker.map(|u| u.0),
            "command received"
        );

        let result = match command {
            Command::Start => Ok(START_TEXT.to_string()),
            Command::Register => self.register(invoker, chat_id).await,
            Command::Unregister => self.unregister(invoker, chat_id).await,
            Command::ListManaged => self.list_managed(invoker).await,
            Command::GlobalBan => self.global_ban(invoker, &cmd.args).await,
            Command::GlobalUnban => self.global_unban(invoker, &cmd.args).await,
        };

        Some(result.unwrap_or_else(|rejection| {
            if let Rejection::Storage(e) = &rejection {
                tracing::error!(error = %e, "failed to persist moderation state");
            }
            rejection.to_string()
        }))
    }

    pub async fn register(
        &self,
        invoker: Option<UserId>,
        chat_id: ChatId,
    ) -> Result<String, Rejection> {
        if !self.admins.is_admin(invoker) {
            return Err(Rejection::RegisterDenied);
        }
        if !self.store.register_chat(chat_id).await? {
            return Err(Rejection::AlreadyManaged);
        }
        tracing::info!(chat_id = chat_id.0, "chat registered");
        Ok(format!("Registered this chat (id={chat_id}) as managed."))
    }

    pub async fn unregister(
        &self,
        invoker: Option<UserId>,
        chat_id: ChatId,
    ) -> Result<String, Rejection> {
        if !self.admins.is_admin(invoker) {
            return Err(Rejection::UnregisterDenied);
        }
        if !self.store.unregister_chat(chat_id).await? {
            return Err(Rejection::NotManaged);
        }
        tracing::info!(chat_id = chat_id.0, "chat unregistered");
        Ok(format!("Unregistered this chat (id={chat_id})."))
    }

    pub async fn list_managed(&self, invoker: Option<UserId>) -> Result<String, Rejection> {
        if !self.admins.is_admin(invoker) {
            return Err(Rejection::ListDenied);
        }
        let chats = self.store.managed_chats().await;
        if chats.is_empty() {
            return Ok("No managed chats.".to_string());
        }
        let lines = chats
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. id={c}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("Managed chats:\n{lines}"))
    }

    /// `/globalban <target> [reason...]`.
    ///
    /// The ban list is updated and saved before any chat is touched. A target
    /// that is already listed is not fanned out again, even to chats
    /// registered after the original ban.
    pub async fn global_ban(
        &self,
        invoker: Option<UserId>,
        args: &[String],
    ) -> Result<String, Rejection> {
        if !self.admins.is_admin(invoker) {
            return Err(Rejection::NotAuthorized);
        }
        let Some(raw) = args.first() else {
            return Err(Rejection::Usage(BAN_USAGE));
        };
        let reason = if args.len() > 1 {
            args[1..].join(" ")
        } else {
            DEFAULT_REASON.to_string()
        };
        let target: BanTarget = raw.parse().map_err(|_| Rejection::UnparsableTarget)?;

        if !self.store.add_global_ban(raw).await? {
            return Err(Rejection::AlreadyBanned(raw.clone()));
        }
        tracing::info!(ban_target = %raw, reason = %reason, "global ban recorded");

        let report = self.fan_out(BanAction::Ban, raw, &target).await;
        Ok(format!(
            "Global ban applied for {raw}.\nReason: {reason}\n\nResults:\n{}",
            report.render()
        ))
    }

    /// `/globalunban <target>`.
    ///
    /// The list is matched on the raw string before the target is parsed, so
    /// an entry that is neither a numeric id nor an `@handle` can still be
    /// removed; no chat is touched for it.
    pub async fn global_unban(
        &self,
        invoker: Option<UserId>,
        args: &[String],
    ) -> Result<String, Rejection> {
        if !self.admins.is_admin(invoker) {
            return Err(Rejection::NotAuthorized);
        }
        let Some(raw) = args.first() else {
            return Err(Rejection::Usage(UNBAN_USAGE));
        };

        if !self.store.remove_global_ban(raw).await? {
            return Err(Rejection::NotBanned(raw.clone()));
        }
        tracing::info!(ban_target = %raw, "global ban lifted");

        let Ok(target) = raw.parse::<BanTarget>() else {
            tracing::warn!(ban_target = %raw, "unparseable ban entry removed without fan-out");
            return Ok(format!(
                "Removed {raw} from global bans.\n\nResults:\n\
(not a numeric id or @username, no chats updated)"
            ));
        };

        let report = self.fan_out(BanAction::Unban, raw, &target).await;
        Ok(format!(
            "Removed {raw} from global bans.\n\nResults:\n{}",
            report.render()
        ))
    }

    /// Apply `action` in every managed chat, one at a time, in insertion order.
    ///
    /// A failure in one chat never stops the loop.
    pub async fn fan_out(&self, action: BanAction, raw: &str, target: &BanTarget) -> FanOutReport {
        let chats = self.store.managed_chats().await;
        let mut results = Vec::with_capacity(chats.len());

        for chat_id in chats {
            let attempt = match action {
                BanAction::Ban => self.ban_in_chat(chat_id, target).await,
                BanAction::Unban => self.unban_in_chat(chat_id, target).await,
            };
            let outcome = attempt.unwrap_or_else(ChatOutcome::Failed);
            match &outcome {
                ChatOutcome::Failed(e) => tracing::warn!(
                    chat_id = chat_id.0,
                    ban_target = %raw,
                    error = %e,
                    "global {action} failed in chat"
                ),
                ChatOutcome::MissingPermission => tracing::warn!(
                    chat_id = chat_id.0,
                    "bot lacks ban permission in chat"
                ),
                ChatOutcome::Done => {}
            }
            results.push(ChatResult { chat_id, outcome });
        }

        FanOutReport {
            action,
            raw_target: raw.to_string(),
            results,
        }
    }

    async fn ban_in_chat(&self, chat_id: ChatId, target: &BanTarget) -> RemoteResult<ChatOutcome> {
        let user_id = self.resolve(chat_id, target).await?;

        let me = self.platform.get_me().await?;
        let bot_member = self
            .platform
            .get_chat_member(chat_id, &BanTarget::Numeric(me))
            .await?;
        if !bot_member.can_ban() {
            return Ok(ChatOutcome::MissingPermission);
        }

        self.platform.ban_chat_member(chat_id, user_id).await?;
        Ok(ChatOutcome::Done)
    }

    async fn unban_in_chat(
        &self,
        chat_id: ChatId,
        target: &BanTarget,
    ) -> RemoteResult<ChatOutcome> {
        let user_id = self.resolve(chat_id, target).await?;
        self.platform.unban_chat_member(chat_id, user_id).await?;
        Ok(ChatOutcome::Done)
    }

    async fn resolve(&self, chat_id: ChatId, target: &BanTarget) -> RemoteResult<UserId> {
        match target {
            BanTarget::Numeric(id) => Ok(*id),
            BanTarget::Handle(_) => Ok(self.platform.get_chat_member(chat_id, target).await?.user_id),
        }
    }
}
