use serde::{Deserialize, Serialize};

use common::{Bar, LiquidityZone};

/// Liquidity zone: the newest bar trades well above its local average volume.
///
/// A simple volume-spike detector, not an order-book model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityDetector {
    /// Minimum bars required before a spike is reported.
    pub min_bars: usize,
    /// Trailing bars (including the newest) averaged.
    pub window: usize,
    /// Newest volume must exceed `multiplier` × average.
    pub multiplier: f64,
}

impl Default for LiquidityDetector {
    fn default() -> Self {
        Self { min_bars: 20, window: 30, multiplier: 1.8 }
    }
}

impl LiquidityDetector {
    pub fn new(min_bars: usize, window: usize, multiplier: f64) -> Self {
        Self { min_bars, window, multiplier }
    }

    pub fn detect(&self, bars: &[Bar]) -> Option<LiquidityZone> {
        if bars.is_empty() || bars.len() < self.min_bars || self.window == 0 {
            return None;
        }

        let window = &bars[bars.len().saturating_sub(self.window)..];
        let average_volume = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
        let volume = window.last()?.volume;

        (volume > self.multiplier * average_volume).then_some(LiquidityZone { volume, average_volume })
    }
}
