//! Chat-facing texts
//!
//! Everything the bot posts is HTML. User-supplied text (display names, reasons, handles) is
//! escaped before it is embedded.

use crate::duration::describe;
use crate::gateway::GatewayError;
use crate::model::Subject;
use crate::moderation::{ModerationCommand, ModerationError, Outcome, ResolutionError};

/// Reply to a moderation command from a non-administrator
pub const DENIED: &str = "❌ Only administrators can use this command.";

/// Command reference for `/start` and `/help`
pub const HELP_TEXT: &str = "\
🤖 <b>Moderator Bot: commands</b>

👋 <b>Greeting</b>
New members are welcomed automatically.

🔇 <b>Mute</b>
/mute [reply | @user | id] [duration]: mute a member
  Examples: /mute 30m, /mute 1h, /mute 2d
  Without a duration the member is muted for one day
/unmute [reply | @user | id]: lift a mute

⚠️ <b>Warnings</b>
/warn [reply | @user | id] [reason]: warn a member
/unwarn [reply | @user | id]: clear a member's warnings
/warnings [reply | @user | id]: show a warning count
  Reaching the warning limit mutes the member automatically

⛔ <b>Bans</b>
/ban [reply | @user | id]: ban a member
/unban [reply | @user | id]: lift a ban

👑 <b>Administrators</b>
/promote [reply | @user | id]: make a member a moderator
/unpromote [reply | @user | id]: revoke moderator rights

📋 <b>Other</b>
/rules: group rules
/help: this message

<i>⚙️ Most commands need administrator rights.</i>";

/// Group rules used when no rules file is configured
pub const DEFAULT_RULES: &str = "\
📋 <b>Group rules</b>

1️⃣ Treat every member with respect
2️⃣ No spam or advertising
3️⃣ No insulting or inappropriate content
4️⃣ Keep off-topic messages to a minimum
5️⃣ Do not share other members' personal information
6️⃣ Follow the administrators' instructions

⚠️ <b>Penalties</b>
• 1st warning: a warning
• 2nd warning: a warning
• 3rd warning: a one-day mute

Stick to the rules and enjoy the conversation! 😊";

/// Escape text for Telegram's HTML parse mode
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Clickable mention of a user
#[must_use]
pub fn mention(subject: &Subject) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        subject.id,
        escape(&subject.display_name)
    )
}

/// Greeting for a member who just joined
#[must_use]
pub fn welcome(member: &Subject, chat_title: Option<&str>) -> String {
    let place = chat_title.map_or_else(|| "the group".to_string(), |title| format!("<b>{}</b>", escape(title)));
    format!(
        "👋 Hello, {}!\n\n🎉 Welcome to {place}!\n\n📋 Use /rules to read the group rules.\nEnjoy your stay! 😊",
        mention(member)
    )
}

/// Report a successful command
#[must_use]
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Warned {
            subject,
            reason,
            count,
            max,
        } => format!(
            "⚠️ {} has been warned ({count}/{max}).\nReason: {}\n{} more warning(s) lead to a mute.",
            mention(subject),
            escape(reason),
            max.saturating_sub(*count)
        ),
        Outcome::Escalated {
            subject,
            reason,
            count,
            duration,
        } => format!(
            "🔇 {} reached {count} warnings and has been muted for {}.\nReason: {}\nTheir warnings have been reset.",
            mention(subject),
            describe(*duration),
            escape(reason)
        ),
        Outcome::WarningsCleared { subject } => {
            format!("✅ Warnings of {} have been cleared.", mention(subject))
        }
        Outcome::NoWarnings { subject } => {
            format!("ℹ️ {} has no warnings.", mention(subject))
        }
        Outcome::WarningCount {
            subject,
            count,
            max,
        } => format!("📊 {} has {count}/{max} warnings.", mention(subject)),
        Outcome::Muted { subject, duration } => format!(
            "🔇 {} has been muted for {}.",
            mention(subject),
            describe(*duration)
        ),
        Outcome::Unmuted { subject } => format!("🔊 {} can write again.", mention(subject)),
        Outcome::Banned { subject } => format!("⛔ {} has been banned.", mention(subject)),
        Outcome::Unbanned { subject } => format!("✅ {} has been unbanned.", mention(subject)),
        Outcome::Promoted { subject } => {
            format!("👑 {} is now an administrator.", mention(subject))
        }
        Outcome::Demoted { subject } => {
            format!("👤 {} is no longer an administrator.", mention(subject))
        }
    }
}

/// Report a failed command
#[must_use]
pub fn render_error(command: ModerationCommand, error: &ModerationError) -> String {
    match error {
        ModerationError::Unauthorized => DENIED.to_string(),
        ModerationError::Resolution(e) => render_resolution_error(command, e),
        ModerationError::Gateway(GatewayError::Forbidden(_)) => format!(
            "❌ I lack the administrator rights needed for {command}.\n\
             The group owner has to grant them in the chat settings."
        ),
        ModerationError::Gateway(GatewayError::UserNotFound(_)) => {
            format!("❌ {command} failed: the user is not a member of this chat.")
        }
        ModerationError::Gateway(GatewayError::Api(message)) => {
            format!("❌ {command} failed: {}", escape(message))
        }
        ModerationError::Storage(_) => {
            format!("❌ {command} failed: the change could not be saved. Please try again.")
        }
        ModerationError::DurationOutOfRange(_) => {
            format!("❌ {command} failed: the configured mute duration is too long.")
        }
    }
}

fn render_resolution_error(command: ModerationCommand, error: &ResolutionError) -> String {
    match error {
        ResolutionError::NotReplied => format!(
            "❗ Tell me who {command} is for: reply to one of their messages, \
             or give their @username or numeric user id.\nExample: {command} @username"
        ),
        ResolutionError::HandleNotFound(handle) => format!(
            "❗ I don't know @{}. A user can be named by @username only after \
             they have written at least one message I could see.",
            escape(handle)
        ),
        ResolutionError::InvalidIdentifier(token) => {
            format!("❌ {} is not a valid user id for this chat.", escape(token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use chrono::TimeDelta;

    fn subject() -> Subject {
        Subject::new(UserId(42), "<Eve & Co>")
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\" > d"), "a &lt; b &amp; &quot;c&quot; &gt; d");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_mention_escapes_display_name() {
        assert_eq!(
            mention(&subject()),
            "<a href=\"tg://user?id=42\">&lt;Eve &amp; Co&gt;</a>"
        );
    }

    #[test]
    fn test_warned_shows_count_and_headroom() {
        let text = render_outcome(&Outcome::Warned {
            subject: subject(),
            reason: "<script>".to_string(),
            count: 1,
            max: 3,
        });
        assert!(text.contains("(1/3)"));
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("2 more warning(s)"));
    }

    #[test]
    fn test_escalated_and_muted_show_duration() {
        let escalated = render_outcome(&Outcome::Escalated {
            subject: subject(),
            reason: "spam".to_string(),
            count: 3,
            duration: TimeDelta::days(1),
        });
        assert!(escalated.contains("muted for 1 day"));

        let muted = render_outcome(&Outcome::Muted {
            subject: subject(),
            duration: TimeDelta::minutes(30),
        });
        assert!(muted.contains("30 minutes"));
    }

    #[test]
    fn test_forbidden_hint_names_command() {
        let text = render_error(
            ModerationCommand::Ban,
            &ModerationError::Gateway(GatewayError::Forbidden("RIGHT_FORBIDDEN".to_string())),
        );
        assert!(text.contains("/ban"));
        assert!(text.contains("group owner"));
    }

    #[test]
    fn test_resolution_hints() {
        let not_replied = render_error(
            ModerationCommand::Mute,
            &ResolutionError::NotReplied.into(),
        );
        assert!(not_replied.contains("reply"));
        assert!(not_replied.contains("@username"));

        let unknown = render_error(
            ModerationCommand::Unban,
            &ResolutionError::HandleNotFound("ghost".to_string()).into(),
        );
        assert!(unknown.contains("@ghost"));
        assert!(unknown.contains("at least one message"));

        let invalid = render_error(
            ModerationCommand::Warn,
            &ResolutionError::InvalidIdentifier("-5".to_string()).into(),
        );
        assert!(invalid.contains("-5"));
    }

    #[test]
    fn test_unauthorized_is_denied_text() {
        assert_eq!(
            render_error(ModerationCommand::Promote, &ModerationError::Unauthorized),
            DENIED
        );
    }

    #[test]
    fn test_welcome_mentions_member_and_chat() {
        let text = welcome(&subject(), Some("Rust & Friends"));
        assert!(text.contains("tg://user?id=42"));
        assert!(text.contains("Rust &amp; Friends"));
        assert!(text.contains("/rules"));
        assert!(welcome(&subject(), None).contains("the group"));
    }
}
