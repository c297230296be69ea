//! Error types for moderation commands
//!
//! Every failure is scoped to the invocation that caused it and is reported back to the chat.

use crate::gateway::GatewayError;
use chrono::TimeDelta;
use crate::store::StorageError;
use thiserror::Error;

/// Reasons a command's subject could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No reply, handle or identifier was given
    #[error("No subject given")]
    NotReplied,

    /// The handle was never seen in an observed message
    #[error("Unknown handle: @{0}")]
    HandleNotFound(String),

    /// The numeric identifier is not a user of this chat
    #[error("Invalid user identifier: {0}")]
    InvalidIdentifier(String),
}

/// Errors that can occur while running a moderation command
#[derive(Debug, Error)]
pub enum ModerationError {
    /// The invoking user is not an owner or administrator
    #[error("Command requires administrator rights")]
    Unauthorized,

    /// The subject could not be resolved
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The chat platform rejected the call
    #[error("Chat platform call failed: {0}")]
    Gateway(#[from] GatewayError),

    /// A store could not be persisted
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A mute of this length would end past the last representable date
    #[error("Mute duration out of range: {0}")]
    DurationOutOfRange(TimeDelta),
}

/// Result type for moderation commands
pub type ModerationResult<T> = Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ModerationError::Unauthorized;
        assert_eq!(error.to_string(), "Command requires administrator rights");

        let error = ModerationError::from(ResolutionError::HandleNotFound("ghost".to_string()));
        assert_eq!(error.to_string(), "Unknown handle: @ghost");

        let error = ModerationError::from(GatewayError::Api("timeout".to_string()));
        assert_eq!(
            error.to_string(),
            "Chat platform call failed: Chat platform error: timeout"
        );
    }
}
