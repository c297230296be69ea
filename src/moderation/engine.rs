//! Moderation engine
//!
//! Stateless command handlers over the two stores and the chat gateway.

use super::error::{ModerationError, ModerationResult};
use super::outcome::Outcome;
use super::resolver::{IdentifierCheck, Invocation, Resolution, TargetResolver};
use super::ModerationCommand;
use crate::config::PolicyConfig;
use crate::duration::{deadline, parse_duration};
use crate::gateway::{AdminRights, ChatGateway, MemberPermissions};
use crate::logging;
use crate::model::ChatId;
use crate::response;
use crate::store::{IdentityDirectory, WarningLedger};
use crate::ERROR_TARGET;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Reason recorded when `/warn` gets no text
pub const DEFAULT_REASON: &str = "No reason given";

/// Runs moderation commands
#[derive(Clone)]
pub struct ModerationEngine {
    gateway: Arc<dyn ChatGateway>,
    ledger: WarningLedger,
    directory: IdentityDirectory,
    policy: PolicyConfig,
}

impl ModerationEngine {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        ledger: WarningLedger,
        directory: IdentityDirectory,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            gateway,
            ledger,
            directory,
            policy,
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn ChatGateway {
        self.gateway.as_ref()
    }

    #[must_use]
    pub fn ledger(&self) -> &WarningLedger {
        &self.ledger
    }

    #[must_use]
    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    #[must_use]
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Execute a command and report the result to the chat.
    ///
    /// Exactly one message is sent per invocation, whether the command succeeded or not.
    pub async fn run(
        &self,
        command: ModerationCommand,
        invocation: &Invocation,
    ) -> ModerationResult<Outcome> {
        let started = Instant::now();
        logging::log_command_start(command, invocation);

        let result = self.execute(command, invocation).await;
        let text = match &result {
            Ok(outcome) => response::render_outcome(outcome),
            Err(e) => {
                logging::log_command_error(command, invocation, e);
                response::render_error(command, e)
            }
        };

        if let Err(e) = self.gateway.send_message(invocation.chat, &text).await {
            error!(
                target: ERROR_TARGET,
                command = %command,
                chat_id = %invocation.chat,
                error = %e,
                "Failed to report command result"
            );
        }

        logging::log_command_end(command, invocation, started, &result);
        result
    }

    /// Execute a command without reporting it
    ///
    /// # Errors
    ///
    /// Returns a `ModerationError` when the invoker is not an administrator, the subject
    /// cannot be resolved, or a store or platform call fails.
    pub async fn execute(
        &self,
        command: ModerationCommand,
        invocation: &Invocation,
    ) -> ModerationResult<Outcome> {
        if !command.requires_admin() {
            return Ok(self.warnings(invocation).await);
        }

        self.authorize(invocation).await?;

        let check = if command == ModerationCommand::Unban {
            IdentifierCheck::AllowAbsent
        } else {
            IdentifierCheck::Strict
        };
        let resolution = self.resolver().resolve(invocation, check).await?;
        let chat = invocation.chat;

        match command {
            ModerationCommand::Warn => self.warn(chat, resolution).await,
            ModerationCommand::Unwarn => self.unwarn(chat, resolution).await,
            ModerationCommand::Mute => self.mute(chat, resolution).await,
            ModerationCommand::Unmute => self.unmute(chat, resolution).await,
            ModerationCommand::Ban => self.ban(chat, resolution).await,
            ModerationCommand::Unban => self.unban(chat, resolution).await,
            ModerationCommand::Promote => self.promote(chat, resolution).await,
            ModerationCommand::Unpromote => self.unpromote(chat, resolution).await,
            ModerationCommand::Warnings => Ok(self.warnings(invocation).await),
        }
    }

    fn resolver(&self) -> TargetResolver<'_> {
        TargetResolver::new(&self.directory, self.gateway.as_ref())
    }

    /// Check live that the invoker owns or administers the chat.
    /// A failed lookup counts as a refusal.
    async fn authorize(&self, invocation: &Invocation) -> ModerationResult<()> {
        match self
            .gateway
            .membership(invocation.chat, invocation.invoker.id)
            .await
        {
            Ok(membership) if membership.status.is_privileged() => Ok(()),
            Ok(membership) => {
                debug!(
                    "User {} is {} in chat {}, refusing",
                    invocation.invoker.id, membership.status, invocation.chat
                );
                Err(ModerationError::Unauthorized)
            }
            Err(e) => {
                error!(
                    target: ERROR_TARGET,
                    chat_id = %invocation.chat,
                    user_id = %invocation.invoker.id,
                    error = %e,
                    "Administrator check failed"
                );
                Err(ModerationError::Unauthorized)
            }
        }
    }

    async fn warn(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let Resolution { subject, extra, .. } = resolution;
        let reason = if extra.is_empty() {
            DEFAULT_REASON.to_string()
        } else {
            extra.join(" ")
        };
        let max = self.policy.max_warnings;

        let count = self.ledger.add(chat, subject.id).await?;
        if count < max {
            return Ok(Outcome::Warned {
                subject,
                reason,
                count,
                max,
            });
        }

        // The warning stays recorded if the mute fails; the count resets only once the
        // escalation actually took effect.
        let duration = self.policy.escalation_mute;
        let until = mute_until(Utc::now(), duration)?;
        if let Err(e) = self
            .gateway
            .restrict(chat, subject.id, MemberPermissions::muted(), Some(until))
            .await
        {
            warn!(
                "Escalation mute for user {} in chat {chat} failed at {count}/{max} warnings: {e}",
                subject.id
            );
            return Err(e.into());
        }
        // The mute is in force; a failed reset is logged, not reported
        if let Err(e) = self.ledger.clear(chat, subject.id).await {
            error!(
                target: ERROR_TARGET,
                chat_id = %chat,
                user_id = %subject.id,
                error = %e,
                "Muted on escalation but failed to reset warnings"
            );
        }

        Ok(Outcome::Escalated {
            subject,
            reason,
            count,
            duration,
        })
    }

    async fn unwarn(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        if self.ledger.clear(chat, subject.id).await? {
            Ok(Outcome::WarningsCleared { subject })
        } else {
            Ok(Outcome::NoWarnings { subject })
        }
    }

    /// Read-only count; falls back to the invoker when no subject resolves
    async fn warnings(&self, invocation: &Invocation) -> Outcome {
        let subject = match self
            .resolver()
            .resolve(invocation, IdentifierCheck::Strict)
            .await
        {
            Ok(resolution) => resolution.subject,
            Err(e) => {
                debug!("No subject for warning check ({e}), showing the invoker");
                invocation.invoker.clone()
            }
        };

        Outcome::WarningCount {
            count: self.ledger.get(invocation.chat, subject.id),
            max: self.policy.max_warnings,
            subject,
        }
    }

    async fn mute(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let Resolution { subject, extra, .. } = resolution;
        let now = Utc::now();
        let requested = extra
            .first()
            .and_then(|token| parse_duration(token))
            .and_then(|duration| deadline(now, duration).map(|until| (duration, until)));
        let (duration, until) = match requested {
            Some(requested) => requested,
            None => {
                let duration = self.policy.default_mute;
                (duration, mute_until(now, duration)?)
            }
        };

        self.gateway
            .restrict(chat, subject.id, MemberPermissions::muted(), Some(until))
            .await?;

        Ok(Outcome::Muted { subject, duration })
    }

    async fn unmute(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        self.gateway
            .restrict(chat, subject.id, MemberPermissions::restored(), None)
            .await?;
        Ok(Outcome::Unmuted { subject })
    }

    async fn ban(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        self.gateway.ban(chat, subject.id).await?;
        Ok(Outcome::Banned { subject })
    }

    async fn unban(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        self.gateway.unban(chat, subject.id).await?;
        Ok(Outcome::Unbanned { subject })
    }

    async fn promote(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        self.gateway
            .set_admin_rights(chat, subject.id, AdminRights::moderator())
            .await?;
        Ok(Outcome::Promoted { subject })
    }

    async fn unpromote(&self, chat: ChatId, resolution: Resolution) -> ModerationResult<Outcome> {
        let subject = resolution.subject;
        self.gateway
            .set_admin_rights(chat, subject.id, AdminRights::none())
            .await?;
        Ok(Outcome::Demoted { subject })
    }
}

fn mute_until(now: DateTime<Utc>, duration: TimeDelta) -> ModerationResult<DateTime<Utc>> {
    deadline(now, duration).ok_or(ModerationError::DurationOutOfRange(duration))
}
