pub mod commands;
pub mod delivery;
pub mod format;

pub use commands::{start_bot, BotDeps, Command};
pub use delivery::{Broadcaster, TelegramNotifier};
