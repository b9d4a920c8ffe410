pub mod collaborators;
pub mod config;
pub mod error;
pub mod types;

pub use collaborators::{AnnouncementSink, BarSupply, KvStore, Notifier};
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
