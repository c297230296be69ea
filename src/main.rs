use std::sync::Arc;

use group_warden::config::Config;
use group_warden::gateway::TelegramGateway;
use group_warden::moderation::ModerationEngine;
use group_warden::store::{IdentityDirectory, WarningLedger};
use group_warden::{BOT_NAME, Data, Error, handlers, logging};
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

/// Main function to run the bot
async fn async_main() -> Result<(), Error> {
    let config = Config::from_env()?;
    logging::init(&config.log_dir)?;
    info!("Starting {BOT_NAME} with {config:?}");

    let ledger = WarningLedger::load(config.warnings_path()).await;
    let directory = IdentityDirectory::load(config.identities_path()).await;
    info!(
        "Loaded {} warning entries and {} known handles",
        ledger.len(),
        directory.len()
    );

    let rules = match &config.rules_file {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Could not read rules file {}, using built-in rules: {e}", path.display());
                None
            }
        },
        None => None,
    };

    let bot = Bot::new(config.bot_token.clone());
    let bot_username = match bot.get_me().await {
        Ok(me) => me.user.username.clone(),
        Err(e) => {
            warn!("Could not fetch bot identity, addressed commands will be ignored: {e}");
            None
        }
    };
    if let Some(username) = &bot_username {
        logging::log_console(format!("Connected as @{username}"));
    }

    let gateway = Arc::new(TelegramGateway::new(bot.clone()));
    let engine = ModerationEngine::new(gateway, ledger, directory, config.policy);
    let data = Data::new(engine, rules, bot_username);

    let handler = Update::filter_message().endpoint(handlers::handle_message);

    info!("Starting bot...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        // No per-chat ordering: every update is handled as soon as it arrives
        .distribution_function(|_| None::<std::convert::Infallible>)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

fn main() {
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
        .and_then(|runtime| runtime.block_on(async_main()));

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
