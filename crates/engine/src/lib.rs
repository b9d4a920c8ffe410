pub mod analyzer;
pub mod binance;
pub mod continuity;
pub mod lifecycle;
pub mod scanner;

pub use analyzer::Analyzer;
pub use binance::BinanceClient;
pub use continuity::{ContinuityConfig, ContinuityPolicy, Decision};
pub use lifecycle::{run_and_deliver, Scheduler};
pub use scanner::Scanner;
