//! Chat platform gateway
//!
//! The moderation engine talks to the chat platform only through [`ChatGateway`]. The
//! Telegram implementation lives in [`telegram`]; tests use the generated mock.

pub mod telegram;

use crate::model::{ChatId, Subject, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

pub use telegram::TelegramGateway;

/// Errors reported by the chat platform
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The bot lacks the administrator right the call needs
    #[error("Insufficient bot rights: {0}")]
    Forbidden(String),

    /// The platform does not know the user in this chat
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Any other platform failure
    #[error("Chat platform error: {0}")]
    Api(String),
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Role of a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    /// Owners and administrators may moderate
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Owner | Self::Administrator)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Administrator => write!(f, "administrator"),
            Self::Member => write!(f, "member"),
            Self::Restricted => write!(f, "restricted"),
            Self::Left => write!(f, "left"),
            Self::Banned => write!(f, "banned"),
        }
    }
}

/// A user's membership in a chat as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub user: Subject,
    pub status: MemberStatus,
}

/// What a restricted member may still do.
///
/// Restrictions are applied as a complete allow-list, never as a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberPermissions {
    pub send_messages: bool,
    pub send_polls: bool,
    pub send_other_messages: bool,
    pub add_web_page_previews: bool,
    pub invite_users: bool,
}

impl MemberPermissions {
    /// Nothing allowed: the member cannot post
    #[must_use]
    pub const fn muted() -> Self {
        Self {
            send_messages: false,
            send_polls: false,
            send_other_messages: false,
            add_web_page_previews: false,
            invite_users: false,
        }
    }

    /// Full posting and interaction rights of an ordinary member
    #[must_use]
    pub const fn restored() -> Self {
        Self {
            send_messages: true,
            send_polls: true,
            send_other_messages: true,
            add_web_page_previews: true,
            invite_users: true,
        }
    }
}

/// Administrator rights granted by a promotion.
///
/// There is deliberately no field for promoting other members: the bot never grants it,
/// so moderators it creates cannot appoint further moderators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminRights {
    pub delete_messages: bool,
    pub restrict_members: bool,
    pub invite_users: bool,
    pub pin_messages: bool,
    pub manage_video_chats: bool,
}

impl AdminRights {
    /// The moderation bundle handed out by `/promote`
    #[must_use]
    pub const fn moderator() -> Self {
        Self {
            delete_messages: true,
            restrict_members: true,
            invite_users: true,
            pin_messages: true,
            manage_video_chats: true,
        }
    }

    /// No rights: a plain member
    #[must_use]
    pub const fn none() -> Self {
        Self {
            delete_messages: false,
            restrict_members: false,
            invite_users: false,
            pin_messages: false,
            manage_video_chats: false,
        }
    }
}

/// Operations the moderation engine needs from the chat platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Current membership of `user` in `chat`
    async fn membership(&self, chat: ChatId, user: UserId) -> GatewayResult<Membership>;

    /// Replace the member's permissions, optionally until a point in time
    async fn restrict(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
        until: Option<DateTime<Utc>>,
    ) -> GatewayResult<()>;

    /// Remove the user and block them from rejoining
    async fn ban(&self, chat: ChatId, user: UserId) -> GatewayResult<()>;

    /// Lift a ban without affecting a user who is not banned
    async fn unban(&self, chat: ChatId, user: UserId) -> GatewayResult<()>;

    /// Set the user's administrator rights
    async fn set_admin_rights(
        &self,
        chat: ChatId,
        user: UserId,
        rights: AdminRights,
    ) -> GatewayResult<()>;

    /// Send an HTML-formatted message to the chat
    async fn send_message(&self, chat: ChatId, html: &str) -> GatewayResult<()>;
}
