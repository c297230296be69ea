//! Command parsing
//!
//! Turns `/name[@bot] arg arg…` message text into a [`Command`] and its arguments.

use crate::moderation::ModerationCommand;

/// A recognised bot command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Rules,
    Moderate(ModerationCommand),
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "rules" => Self::Rules,
            "warn" => Self::Moderate(ModerationCommand::Warn),
            "unwarn" => Self::Moderate(ModerationCommand::Unwarn),
            "warnings" | "check" => Self::Moderate(ModerationCommand::Warnings),
            "mute" => Self::Moderate(ModerationCommand::Mute),
            "unmute" => Self::Moderate(ModerationCommand::Unmute),
            "ban" => Self::Moderate(ModerationCommand::Ban),
            "unban" => Self::Moderate(ModerationCommand::Unban),
            "promote" => Self::Moderate(ModerationCommand::Promote),
            "unpromote" => Self::Moderate(ModerationCommand::Unpromote),
            _ => return None,
        };
        Some(command)
    }
}

/// Parse a message text into a command and its whitespace-separated arguments.
///
/// Returns `None` for plain text, unknown commands, and commands addressed to another bot
/// (`/warn@other_bot`). A command addressed with `@bot` is accepted only when `bot_username`
/// matches, case-insensitively.
#[must_use]
pub fn parse(text: &str, bot_username: Option<&str>) -> Option<(Command, Vec<String>)> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?.strip_prefix('/')?;

    let name = match head.split_once('@') {
        Some((name, addressee)) => {
            let ours = bot_username.is_some_and(|bot| bot.eq_ignore_ascii_case(addressee));
            if !ours {
                return None;
            }
            name
        }
        None => head,
    };

    let command = Command::from_name(name)?;
    Some((command, tokens.map(ToString::to_string).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_arguments() {
        let (command, args) = parse("/warn @bob  posting   spam", None).unwrap();
        assert_eq!(command, Command::Moderate(ModerationCommand::Warn));
        assert_eq!(args, vec!["@bob", "posting", "spam"]);
    }

    #[test]
    fn test_parse_static_commands() {
        assert_eq!(parse("/start", None), Some((Command::Start, vec![])));
        assert_eq!(parse("/HELP", None), Some((Command::Help, vec![])));
        assert_eq!(parse("/rules", None), Some((Command::Rules, vec![])));
    }

    #[test]
    fn test_check_is_alias_of_warnings() {
        let (command, _) = parse("/check", None).unwrap();
        assert_eq!(command, Command::Moderate(ModerationCommand::Warnings));
    }

    #[test]
    fn test_addressed_commands() {
        let (command, args) = parse("/mute@WardenBot 2h", Some("wardenbot")).unwrap();
        assert_eq!(command, Command::Moderate(ModerationCommand::Mute));
        assert_eq!(args, vec!["2h"]);

        assert_eq!(parse("/mute@other_bot 2h", Some("wardenbot")), None);
        assert_eq!(parse("/mute@wardenbot", None), None);
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(parse("", None), None);
        assert_eq!(parse("hello /warn", None), None);
        assert_eq!(parse("/unknown arg", None), None);
        assert_eq!(parse("/", None), None);
    }
}
