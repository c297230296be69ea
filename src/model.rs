//! Identifiers and the moderation subject shared by every layer.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Stable identifier of a group chat. Group chats have negative identifiers on Telegram.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Stable numeric identifier of a user.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// The user a moderation command acts upon.
///
/// A subject carries no membership guarantee: it may come from a reply, a live membership
/// query or the identity directory, and handlers must not assume the user is still in the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: UserId,
    pub display_name: String,
}

impl Subject {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Subject known only by identifier, named after it.
    #[must_use]
    pub fn anonymous(id: UserId) -> Self {
        Self {
            id,
            display_name: format!("ID {id}"),
        }
    }
}
