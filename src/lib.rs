pub mod commands;
pub mod config;
pub mod data;
pub mod duration;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod moderation;
pub mod response;
pub mod store;

pub const BOT_NAME: &str = "group_warden";
pub const COMMAND_TARGET: &str = "group_warden::command";
pub const ERROR_TARGET: &str = "group_warden::error";
pub const EVENT_TARGET: &str = "group_warden::handlers";
pub const CONSOLE_TARGET: &str = "group_warden";

pub use data::{Data, DataInner};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
