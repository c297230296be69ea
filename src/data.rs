use std::{ops::Deref, sync::Arc};

use crate::moderation::ModerationEngine;
use crate::response::DEFAULT_RULES;
use crate::store::IdentityDirectory;

/// State shared by every update handler. Cheap to clone.
#[derive(Clone)]
pub struct Data(pub Arc<DataInner>);

impl Deref for Data {
    type Target = DataInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct DataInner {
    pub engine: ModerationEngine,
    /// HTML text posted for `/rules`
    pub rules: String,
    /// The bot's own username, for commands addressed as `/cmd@bot`
    pub bot_username: Option<String>,
}

impl Data {
    #[must_use]
    pub fn new(engine: ModerationEngine, rules: Option<String>, bot_username: Option<String>) -> Self {
        Self(Arc::new(DataInner {
            engine,
            rules: rules.unwrap_or_else(|| DEFAULT_RULES.to_string()),
            bot_username,
        }))
    }

    #[must_use]
    pub fn directory(&self) -> &IdentityDirectory {
        self.engine.directory()
    }
}
