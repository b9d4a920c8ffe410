use common::{Bar, IdeaOutcome, StructureReport};

use crate::config::AnalysisConfig;
use crate::detectors::DetectorSet;
use crate::scorer::Scorer;

/// Detectors and scorer bound to one configuration.
#[derive(Debug, Clone)]
pub struct SignalModel {
    detectors: DetectorSet,
    scorer: Scorer,
}

/// Output of one pass over a bar sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Close of the newest bar.
    pub price: f64,
    pub structure: StructureReport,
    pub outcome: IdeaOutcome,
}

impl SignalModel {
    pub fn from_config(cfg: &AnalysisConfig) -> Self {
        Self {
            detectors: cfg.detectors,
            scorer: Scorer::new(cfg.scoring, cfg.risk),
        }
    }

    pub fn detectors(&self) -> &DetectorSet {
        &self.detectors
    }

    /// Returns `None` for an empty sequence.
    pub fn evaluate(&self, symbol: &str, bars: &[Bar]) -> Option<Evaluation> {
        let price = bars.last()?.close;
        let structure = self.detectors.detect(bars);
        let outcome = self.scorer.generate_idea(symbol, price, &structure);
        Some(Evaluation { price, structure, outcome })
    }
}

impl Default for SignalModel {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
