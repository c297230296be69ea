//! Telegram gateway (teloxide)

use super::{
    AdminRights, ChatGateway, GatewayError, GatewayResult, MemberPermissions, MemberStatus,
    Membership,
};
use crate::model::{ChatId, Subject, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, ChatPermissions, ParseMode};
use tracing::debug;

/// [`ChatGateway`] over the Telegram Bot API
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat.0)
    }

    fn tg_user(user: UserId) -> teloxide::types::UserId {
        teloxide::types::UserId(user.0)
    }

    fn map_err(e: teloxide::RequestError) -> GatewayError {
        classify(e.to_string())
    }
}

/// Sort a platform error message into the gateway error kinds
pub(crate) fn classify(message: String) -> GatewayError {
    let upper = message.to_uppercase();
    if upper.contains("RIGHT_FORBIDDEN")
        || upper.contains("NOT ENOUGH RIGHTS")
        || upper.contains("CHAT_ADMIN_REQUIRED")
    {
        GatewayError::Forbidden(message)
    } else if upper.contains("USER NOT FOUND")
        || upper.contains("USER_NOT_PARTICIPANT")
        || upper.contains("PARTICIPANT_ID_INVALID")
        || upper.contains("USER_ID_INVALID")
    {
        GatewayError::UserNotFound(message)
    } else {
        GatewayError::Api(message)
    }
}

fn member_status(status: ChatMemberStatus) -> MemberStatus {
    match status {
        ChatMemberStatus::Owner => MemberStatus::Owner,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Banned,
    }
}

fn chat_permissions(permissions: MemberPermissions) -> ChatPermissions {
    let mut flags = ChatPermissions::empty();
    if permissions.send_messages {
        flags |= ChatPermissions::SEND_MESSAGES;
    }
    if permissions.send_polls {
        flags |= ChatPermissions::SEND_POLLS;
    }
    if permissions.send_other_messages {
        flags |= ChatPermissions::SEND_OTHER_MESSAGES;
    }
    if permissions.add_web_page_previews {
        flags |= ChatPermissions::ADD_WEB_PAGE_PREVIEWS;
    }
    if permissions.invite_users {
        flags |= ChatPermissions::INVITE_USERS;
    }
    flags
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn membership(&self, chat: ChatId, user: UserId) -> GatewayResult<Membership> {
        let member = self
            .bot
            .get_chat_member(Self::tg_chat(chat), Self::tg_user(user))
            .await
            .map_err(Self::map_err)?;

        Ok(Membership {
            user: Subject::new(UserId(member.user.id.0), member.user.first_name.clone()),
            status: member_status(member.status()),
        })
    }

    async fn restrict(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        debug!("Restricting user {user} in chat {chat} until {until:?}: {permissions:?}");

        let mut request = self.bot.restrict_chat_member(
            Self::tg_chat(chat),
            Self::tg_user(user),
            chat_permissions(permissions),
        );
        if let Some(until) = until {
            request = request.until_date(until);
        }

        request.await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn ban(&self, chat: ChatId, user: UserId) -> GatewayResult<()> {
        self.bot
            .ban_chat_member(Self::tg_chat(chat), Self::tg_user(user))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn unban(&self, chat: ChatId, user: UserId) -> GatewayResult<()> {
        self.bot
            .unban_chat_member(Self::tg_chat(chat), Self::tg_user(user))
            .only_if_banned(true)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_admin_rights(
        &self,
        chat: ChatId,
        user: UserId,
        rights: AdminRights,
    ) -> GatewayResult<()> {
        self.bot
            .promote_chat_member(Self::tg_chat(chat), Self::tg_user(user))
            .can_delete_messages(rights.delete_messages)
            .can_restrict_members(rights.restrict_members)
            .can_invite_users(rights.invite_users)
            .can_pin_messages(rights.pin_messages)
            .can_manage_video_chats(rights.manage_video_chats)
            .can_promote_members(false)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_message(&self, chat: ChatId, html: &str) -> GatewayResult<()> {
        self.bot
            .send_message(Self::tg_chat(chat), html)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
