//! Moderation policy engine
//!
//! Graduated discipline (warn, then mute, then ban) and role administration for group chats.
//! Commands are permission-gated, resolve their subject through [`TargetResolver`] and act
//! on the chat through a [`crate::gateway::ChatGateway`].

mod engine;
mod error;
mod outcome;
mod resolver;

pub use engine::ModerationEngine;
pub use error::{ModerationError, ModerationResult, ResolutionError};
pub use outcome::Outcome;
pub use resolver::{
    HANDLE_MARKER, IdentifierCheck, Invocation, Resolution, ResolvedVia, TargetResolver,
};

use std::fmt;

/// Commands handled by the moderation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationCommand {
    Warn,
    Unwarn,
    /// Show a warning count; open to every member
    Warnings,
    Mute,
    Unmute,
    Ban,
    Unban,
    Promote,
    Unpromote,
}

impl ModerationCommand {
    /// Whether the invoker must be an owner or administrator
    #[must_use]
    pub fn requires_admin(self) -> bool {
        !matches!(self, Self::Warnings)
    }

    /// Command name as typed in the chat
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Unwarn => "unwarn",
            Self::Warnings => "warnings",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Promote => "promote",
            Self::Unpromote => "unpromote",
        }
    }
}

impl fmt::Display for ModerationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}
