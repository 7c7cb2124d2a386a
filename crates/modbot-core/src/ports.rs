use async_trait::async_trait;

use crate::{
    domain::{BanTarget, ChatId, UserId},
    errors::RemoteResult,
};

/// Membership status of a user in a chat, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub user_id: UserId,
    pub status: MemberStatus,
    pub can_restrict_members: bool,
}

impl MemberInfo {
    /// Whether this member may ban others: chat admin or creator with the
    /// restrict-members right.
    pub fn can_ban(&self) -> bool {
        matches!(
            self.status,
            MemberStatus::Administrator | MemberStatus::Creator
        ) && self.can_restrict_members
    }
}

/// Hexagonal port for the chat platform.
///
/// Every call is a fallible remote call; errors carry the platform's detail
/// string so callers can surface it verbatim.
#[async_trait]
pub trait ModerationPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> RemoteResult<()>;

    /// The bot's own user id.
    async fn get_me(&self) -> RemoteResult<UserId>;

    async fn get_chat_member(&self, chat_id: ChatId, who: &BanTarget) -> RemoteResult<MemberInfo>;

    async fn ban_chat_member(&self, chat_id: ChatId, user_id: UserId) -> RemoteResult<()>;

    async fn unban_chat_member(&self, chat_id: ChatId, user_id: UserId) -> RemoteResult<()>;
}
