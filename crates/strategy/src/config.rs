use serde::{Deserialize, Serialize};

use common::{Error, Result};
use risk::RiskBands;

use crate::detectors::DetectorSet;
use crate::scorer::ScoringConfig;

/// Optional analysis config file (TOML). Every table and key may be omitted.
///
/// Example `config/analysis.toml`:
/// ```toml
/// [market]
/// primary_interval = "15m"
/// primary_limit = 300
/// context_intervals = ["1h", "4h"]
///
/// [detectors.break_of_structure]
/// lookback = 20
///
/// [detectors.liquidity]
/// min_bars = 20
/// window = 30
/// multiplier = 1.8
///
/// [scoring]
/// min_confluence = 6
///
/// [risk]
/// stop_loss_pct = 0.01
/// take_profit_pct = 0.02
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub market: MarketConfig,
    pub detectors: DetectorSet,
    pub scoring: ScoringConfig,
    pub risk: RiskBands,
}

/// Which candles are requested for each analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Interval the detectors run on.
    pub primary_interval: String,
    pub primary_limit: usize,
    /// Higher timeframes fetched for context only.
    pub context_intervals: Vec<String>,
    pub context_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            primary_interval: "15m".to_string(),
            primary_limit: 300,
            context_intervals: vec!["1h".to_string(), "4h".to_string()],
            context_limit: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        assert_eq!(cfg.detectors.break_of_structure.lookback, 20);
        assert_eq!(cfg.scoring.min_confluence, 6);
        assert_eq!(cfg.market.primary_limit, 300);
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let cfg = AnalysisConfig::from_toml(include_str!("../../../config/analysis.toml")).unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn partial_tables_override_only_named_keys() {
        let cfg = AnalysisConfig::from_toml(
            r#"
            [detectors.liquidity]
            window = 10

            [scoring]
            min_confluence = 8

            [risk]
            stop_loss_pct = 0.015
            "#,
        )
        .unwrap();
        assert_eq!(cfg.detectors.liquidity.window, 10);
        assert_eq!(cfg.detectors.liquidity.multiplier, 1.8);
        assert_eq!(cfg.scoring.min_confluence, 8);
        assert_eq!(cfg.scoring.weights.break_of_structure, 3);
        assert_eq!(cfg.risk.stop_loss_pct, 0.015);
        assert_eq!(cfg.risk.take_profit_pct, 0.02);
    }

    #[test]
    fn unrelated_tables_are_ignored() {
        let cfg = AnalysisConfig::from_toml("[continuity]\nrepeat_after_weaker_secs = 60\n").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = AnalysisConfig::from_toml("[scoring]\nmin_confluence = \"six\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
