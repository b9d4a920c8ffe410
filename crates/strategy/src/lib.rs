pub mod config;
pub mod detectors;
pub mod model;
pub mod scorer;

pub use config::{AnalysisConfig, MarketConfig};
pub use detectors::DetectorSet;
pub use model::{Evaluation, SignalModel};
pub use scorer::{Scorer, ScoringConfig, Weights};
