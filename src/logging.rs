use crate::moderation::{Invocation, ModerationCommand, ModerationError, ModerationResult, Outcome};
use crate::{COMMAND_TARGET, CONSOLE_TARGET, ERROR_TARGET, Error};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Command log file name
pub const COMMAND_LOG_FILE: &str = "commands";

/// Initialize the logging system with console and file outputs
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a filter directive is invalid.
pub fn init(log_dir: &Path) -> Result<(), Error> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let command_file = RollingFileAppender::new(Rotation::DAILY, log_dir, COMMAND_LOG_FILE);

    // Human-readable console output
    let console_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(true);

    // JSON command log
    let command_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(command_file);

    // RUST_LOG wins; otherwise INFO with the transport crates quieted
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info")
            .add_directive("teloxide=warn".parse()?)
            .add_directive("hyper=warn".parse()?),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(command_layer)
        .init();

    info!("Logging system initialized");
    Ok(())
}

/// Log the start of a moderation command
pub fn log_command_start(command: ModerationCommand, invocation: &Invocation) {
    info!(
        target: COMMAND_TARGET,
        command = %command,
        chat_id = %invocation.chat,
        user_id = %invocation.invoker.id,
        arguments = %invocation.args.join(" "),
        replied = invocation.reply_to.is_some(),
        event = "start",
        "Command execution started"
    );
}

/// Log the end of a moderation command, successful or not
pub fn log_command_end(
    command: ModerationCommand,
    invocation: &Invocation,
    started: Instant,
    result: &ModerationResult<Outcome>,
) {
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or_default();
    let (outcome, subject_id) = match result {
        Ok(outcome) => (outcome.kind(), Some(outcome.subject().id.0)),
        Err(_) => ("failed", None),
    };

    info!(
        target: COMMAND_TARGET,
        command = %command,
        chat_id = %invocation.chat,
        user_id = %invocation.invoker.id,
        subject_id = ?subject_id,
        outcome = outcome,
        duration_ms = duration_ms,
        event = "end",
        "Command execution completed"
    );
}

/// Log a failed moderation command
pub fn log_command_error(command: ModerationCommand, invocation: &Invocation, error: &ModerationError) {
    let kind = match error {
        ModerationError::Unauthorized => "unauthorized",
        ModerationError::Resolution(_) => "resolution",
        ModerationError::Gateway(_) => "gateway",
        ModerationError::Storage(_) => "storage",
        ModerationError::DurationOutOfRange(_) => "duration",
    };

    error!(
        target: ERROR_TARGET,
        command = %command,
        chat_id = %invocation.chat,
        user_id = %invocation.invoker.id,
        kind = kind,
        error = %error,
        "Command error"
    );
}

pub fn log_console(message: String) {
    info!(
        target: CONSOLE_TARGET,
        message = %message,
        event = "console",
    );
}
