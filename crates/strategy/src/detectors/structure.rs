use serde::{Deserialize, Serialize};

use common::{Bar, BreakOfStructure, Trend};

/// Break of structure: the newest close escapes the high/low range of the
/// preceding bars in a lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakOfStructureDetector {
    /// Window size including the newest bar.
    pub lookback: usize,
}

impl Default for BreakOfStructureDetector {
    fn default() -> Self {
        Self { lookback: 20 }
    }
}

impl BreakOfStructureDetector {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    /// Returns `None` with fewer than `lookback` bars or when the close stays
    /// inside the range. Comparisons are strict: touching the range is no break.
    pub fn detect(&self, bars: &[Bar]) -> Option<BreakOfStructure> {
        if self.lookback < 2 || bars.len() < self.lookback {
            return None;
        }

        let window = &bars[bars.len() - self.lookback..];
        let (newest, prior) = window.split_last()?;

        let recent_high = prior.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let recent_low = prior.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        if newest.close > recent_high {
            Some(BreakOfStructure { direction: Trend::Up, price: newest.close })
        } else if newest.close < recent_low {
            Some(BreakOfStructure { direction: Trend::Down, price: newest.close })
        } else {
            None
        }
    }
}
