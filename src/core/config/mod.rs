pub mod bot_config;
pub mod duration;

pub use bot_config::{BotConfig, DisplayConfig};
