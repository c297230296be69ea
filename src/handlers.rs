//! Telegram update handlers
//!
//! The teloxide endpoint converts a [`Message`] into an [`IncomingMessage`] and hands it to
//! [`dispatch`], which holds the actual event logic and is independent of teloxide types.

use crate::commands::{self, Command};
use crate::data::Data;
use crate::model::{ChatId, Subject, UserId};
use crate::moderation::Invocation;
use crate::response::{self, HELP_TEXT};
use crate::{ERROR_TARGET, EVENT_TARGET};
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{debug, error, info};

/// A chat participant as seen on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub subject: Subject,
    /// Public handle without the leading `@`
    pub handle: Option<String>,
    pub is_bot: bool,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Self {
            subject: Subject::new(UserId(user.id.0), user.first_name.clone()),
            handle: user.username.clone(),
            is_bot: user.is_bot,
        }
    }
}

/// The parts of a group message the bot reacts to
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat: ChatId,
    pub chat_title: Option<String>,
    pub from: Option<Participant>,
    /// Author of the replied-to message
    pub reply_to: Option<Participant>,
    pub text: Option<String>,
    pub new_members: Vec<Participant>,
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            chat: ChatId(msg.chat.id.0),
            chat_title: msg.chat.title().map(ToString::to_string),
            from: msg.from().map(Participant::from),
            reply_to: msg
                .reply_to_message()
                .and_then(|replied| replied.from())
                .map(Participant::from),
            text: msg.text().map(ToString::to_string),
            new_members: msg
                .new_chat_members()
                .map(|members| members.iter().map(Participant::from).collect())
                .unwrap_or_default(),
        }
    }
}

/// Endpoint for every message update
pub async fn handle_message(msg: Message, data: Data) -> ResponseResult<()> {
    dispatch(&data, IncomingMessage::from(&msg)).await;
    Ok(())
}

/// React to one incoming message
pub async fn dispatch(data: &Data, message: IncomingMessage) {
    if !message.new_members.is_empty() {
        welcome(data, &message).await;
    }

    let Some(text) = message.text.as_deref() else {
        return;
    };
    if let Some(sender) = &message.from {
        remember(data, sender).await;
    }
    let Some((command, args)) = commands::parse(text, data.bot_username.as_deref()) else {
        return;
    };
    let Some(sender) = message.from else {
        return;
    };

    match command {
        Command::Start | Command::Help => reply(data, message.chat, HELP_TEXT).await,
        Command::Rules => reply(data, message.chat, &data.rules).await,
        Command::Moderate(command) => {
            let invocation = Invocation {
                chat: message.chat,
                invoker: sender.subject,
                reply_to: message.reply_to.map(|author| author.subject),
                args,
            };
            // Outcome and failure are already reported and logged by the engine
            let _ = data.engine.run(command, &invocation).await;
        }
    }
}

async fn remember(data: &Data, participant: &Participant) {
    let Some(handle) = participant.handle.as_deref() else {
        return;
    };
    if let Err(e) = data
        .directory()
        .remember(handle, participant.subject.id, &participant.subject.display_name)
        .await
    {
        error!(
            target: ERROR_TARGET,
            user_id = %participant.subject.id,
            error = %e,
            "Failed to remember handle"
        );
    }
}

async fn welcome(data: &Data, message: &IncomingMessage) {
    for member in message.new_members.iter().filter(|member| !member.is_bot) {
        info!(
            target: EVENT_TARGET,
            chat_id = %message.chat,
            user_id = %member.subject.id,
            event = "member_joined",
            "New member"
        );
        let text = response::welcome(&member.subject, message.chat_title.as_deref());
        reply(data, message.chat, &text).await;
    }
}

async fn reply(data: &Data, chat: ChatId, html: &str) {
    if let Err(e) = data.engine.gateway().send_message(chat, html).await {
        error!(target: ERROR_TARGET, chat_id = %chat, error = %e, "Failed to send reply");
    } else {
        debug!("Replied in chat {chat}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::gateway::{MemberStatus, Membership, MockChatGateway};
    use crate::moderation::ModerationEngine;
    use crate::store::{IdentityDirectory, WarningLedger};
    use std::sync::{Arc, Mutex};

    const CHAT: ChatId = ChatId(-42);

    fn participant(id: u64, name: &str, handle: Option<&str>) -> Participant {
        Participant {
            subject: Subject::new(UserId(id), name),
            handle: handle.map(ToString::to_string),
            is_bot: false,
        }
    }

    fn text_message(from: Participant, text: &str) -> IncomingMessage {
        IncomingMessage {
            chat: CHAT,
            chat_title: Some("Rustaceans".to_string()),
            from: Some(from),
            reply_to: None,
            text: Some(text.to_string()),
            new_members: Vec::new(),
        }
    }

    fn data_with(dir: &tempfile::TempDir, gateway: MockChatGateway) -> Data {
        let engine = ModerationEngine::new(
            Arc::new(gateway),
            WarningLedger::new(dir.path().join("warnings.yaml")),
            IdentityDirectory::new(dir.path().join("identities.yaml")),
            PolicyConfig::default(),
        );
        Data::new(engine, None, Some("warden_bot".to_string()))
    }

    fn recording(gateway: &mut MockChatGateway) -> Arc<Mutex<Vec<String>>> {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);
        gateway.expect_send_message().returning(move |_, text| {
            log.lock().unwrap().push(text.to_string());
            Ok(())
        });
        sent
    }

    #[tokio::test]
    async fn test_plain_message_only_remembers_handle() {
        let dir = tempfile::tempdir().unwrap();
        let data = data_with(&dir, MockChatGateway::new());

        dispatch(&data, text_message(participant(7, "Bob", Some("Bob_R")), "hello")).await;

        let record = data.directory().lookup("bob_r").unwrap();
        assert_eq!(record.user_id, UserId(7));
        assert_eq!(record.display_name, "Bob");
    }

    #[tokio::test]
    async fn test_messages_without_text_do_not_record_handles() {
        let dir = tempfile::tempdir().unwrap();
        let data = data_with(&dir, MockChatGateway::new());

        let sticker = IncomingMessage {
            text: None,
            ..text_message(participant(7, "Bob", Some("bob")), "")
        };
        dispatch(&data, sticker).await;

        assert!(data.directory().lookup("bob").is_none());
        assert!(data.directory().is_empty());
    }

    #[tokio::test]
    async fn test_handle_is_known_before_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockChatGateway::new();
        let sent = recording(&mut gateway);
        let data = data_with(&dir, gateway);

        // The sender's own handle is recorded first, so /warnings @self resolves
        dispatch(&data, text_message(participant(7, "Bob", Some("bob")), "/warnings @bob")).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("tg://user?id=7"));
        assert!(sent[0].contains("0/3"));
    }

    #[tokio::test]
    async fn test_static_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockChatGateway::new();
        let sent = recording(&mut gateway);
        let data = data_with(&dir, gateway);

        dispatch(&data, text_message(participant(1, "Ann", None), "/help")).await;
        dispatch(&data, text_message(participant(1, "Ann", None), "/rules@warden_bot")).await;
        dispatch(&data, text_message(participant(1, "Ann", None), "/rules@other_bot")).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.as_slice(), [HELP_TEXT, response::DEFAULT_RULES]);
    }

    #[tokio::test]
    async fn test_moderation_command_is_routed_to_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockChatGateway::new();
        gateway.expect_membership().returning(|_, user| {
            Ok(Membership {
                user: Subject::new(user, "Admin"),
                status: MemberStatus::Owner,
            })
        });
        let sent = recording(&mut gateway);
        let data = data_with(&dir, gateway);

        let message = IncomingMessage {
            reply_to: Some(participant(9, "Spammer", None)),
            ..text_message(participant(1, "Ann", None), "/warn links")
        };
        dispatch(&data, message).await;

        assert_eq!(data.engine.ledger().get(CHAT, UserId(9)), 1);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("links"));
    }

    #[tokio::test]
    async fn test_new_members_are_welcomed_except_bots() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = MockChatGateway::new();
        let sent = recording(&mut gateway);
        let data = data_with(&dir, gateway);

        let bot = Participant {
            is_bot: true,
            ..participant(3, "Other bot", None)
        };
        let message = IncomingMessage {
            chat: CHAT,
            chat_title: Some("Rustaceans".to_string()),
            from: Some(participant(2, "Carol", Some("carol"))),
            reply_to: None,
            text: None,
            new_members: vec![participant(2, "Carol", Some("carol")), bot],
        };
        dispatch(&data, message).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("tg://user?id=2"));
        assert!(sent[0].contains("Rustaceans"));
    }
}
