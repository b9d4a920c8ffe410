pub mod bands;

pub use bands::{round_to, Levels, RiskBands};
