pub mod candle;
pub mod fair_value_gap;
pub mod liquidity;
pub mod order_block;
pub mod structure;

pub use candle::CandlePatternDetector;
pub use fair_value_gap::fair_value_gap;
pub use liquidity::LiquidityDetector;
pub use order_block::OrderBlockDetector;
pub use structure::BreakOfStructureDetector;

use serde::{Deserialize, Serialize};

use common::{Bar, StructureReport};

/// Parameters for every detector, read from the `[detectors]` table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSet {
    pub break_of_structure: BreakOfStructureDetector,
    pub order_block: OrderBlockDetector,
    pub liquidity: LiquidityDetector,
    pub candle: CandlePatternDetector,
}

impl DetectorSet {
    /// Run all five detectors over the same bars.
    pub fn detect(&self, bars: &[Bar]) -> StructureReport {
        StructureReport {
            break_of_structure: self.break_of_structure.detect(bars),
            order_block: self.order_block.detect(bars),
            fair_value_gap: fair_value_gap(bars),
            liquidity: self.liquidity.detect(bars),
            pattern: self.candle.detect(bars),
        }
    }
}
