//! Target resolution
//!
//! Works out which user a command acts on. First match wins:
//!
//! 1. the author of the replied-to message; every argument stays available to the command
//! 2. `@handle` as the first argument, looked up in the identity directory
//! 3. a numeric identifier as the first argument, checked against the chat platform
//!
//! In cases 2 and 3 the first argument is consumed, so [`Resolution::extra`] starts at the
//! second one. Handlers read their own parameters from `extra` and never re-derive the branch.

use super::error::ResolutionError;
use crate::gateway::ChatGateway;
use crate::model::{ChatId, Subject, UserId};
use crate::store::IdentityDirectory;
use tracing::debug;

/// Prefix marking a public handle argument
pub const HANDLE_MARKER: char = '@';

/// A command as received from the chat
#[derive(Debug, Clone)]
pub struct Invocation {
    pub chat: ChatId,
    pub invoker: Subject,
    /// Author of the message the command replied to
    pub reply_to: Option<Subject>,
    pub args: Vec<String>,
}

/// Which strategy produced the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Reply,
    Handle,
    Identifier,
}

/// A resolved subject plus the arguments left for the command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub subject: Subject,
    pub via: ResolvedVia,
    pub extra: Vec<String>,
}

/// How to treat an identifier the platform cannot confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierCheck {
    /// A failed membership query rejects the identifier
    #[default]
    Strict,
    /// A failed membership query still resolves, named after the identifier.
    /// Used where the subject is expected to be gone from the chat, as for unban.
    AllowAbsent,
}

/// Resolves command subjects against the identity directory and the chat platform
pub struct TargetResolver<'a> {
    directory: &'a IdentityDirectory,
    gateway: &'a dyn ChatGateway,
}

impl<'a> TargetResolver<'a> {
    pub fn new(directory: &'a IdentityDirectory, gateway: &'a dyn ChatGateway) -> Self {
        Self { directory, gateway }
    }

    /// Resolve the subject of `invocation`
    ///
    /// # Errors
    ///
    /// Returns a `ResolutionError` when no strategy yields a subject.
    pub async fn resolve(
        &self,
        invocation: &Invocation,
        check: IdentifierCheck,
    ) -> Result<Resolution, ResolutionError> {
        if let Some(author) = &invocation.reply_to {
            return Ok(Resolution {
                subject: author.clone(),
                via: ResolvedVia::Reply,
                extra: invocation.args.clone(),
            });
        }

        let Some(first) = invocation.args.first() else {
            return Err(ResolutionError::NotReplied);
        };
        let extra = invocation.args[1..].to_vec();

        if let Some(handle) = first.strip_prefix(HANDLE_MARKER) {
            let record = self
                .directory
                .lookup(handle)
                .ok_or_else(|| ResolutionError::HandleNotFound(handle.to_string()))?;
            return Ok(Resolution {
                subject: Subject::new(record.user_id, record.display_name),
                via: ResolvedVia::Handle,
                extra,
            });
        }

        let digits = first.strip_prefix(['-', '+']).unwrap_or(first);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResolutionError::NotReplied);
        }
        // An integer, but not necessarily one that fits an identifier
        let user = first
            .parse::<i64>()
            .ok()
            .and_then(|raw_id| u64::try_from(raw_id).ok())
            .filter(|id| *id > 0)
            .map(UserId)
            .ok_or_else(|| ResolutionError::InvalidIdentifier(first.clone()))?;

        let subject = match self.gateway.membership(invocation.chat, user).await {
            Ok(membership) => membership.user,
            Err(e) if check == IdentifierCheck::AllowAbsent => {
                debug!("Membership lookup for {user} failed, resolving by identifier: {e}");
                Subject::anonymous(user)
            }
            Err(e) => {
                debug!("Membership lookup for {user} failed: {e}");
                return Err(ResolutionError::InvalidIdentifier(first.clone()));
            }
        };

        Ok(Resolution {
            subject,
            via: ResolvedVia::Identifier,
            extra,
        })
    }
}
