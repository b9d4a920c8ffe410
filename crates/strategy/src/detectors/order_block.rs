use serde::{Deserialize, Serialize};

use common::{Bar, OrderBlock};

/// Order block: the nearest large-bodied candle of each polarity among the
/// bars just before the newest one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderBlockDetector {
    /// Number of bars examined, ending one bar before the newest.
    pub window: usize,
    /// Minimum body as a fraction of the bar's range.
    pub body_ratio: f64,
}

impl Default for OrderBlockDetector {
    fn default() -> Self {
        Self { window: 5, body_ratio: 0.6 }
    }
}

impl OrderBlockDetector {
    pub fn new(window: usize, body_ratio: f64) -> Self {
        Self { window, body_ratio }
    }

    /// Needs `window + 1` bars. The result may carry neither polarity.
    pub fn detect(&self, bars: &[Bar]) -> Option<OrderBlock> {
        if self.window == 0 || bars.len() < self.window + 1 {
            return None;
        }

        let end = bars.len() - 1;
        let mut block = OrderBlock::default();

        // Oldest to newest so the nearest qualifying bar overwrites earlier ones.
        for bar in &bars[end - self.window..end] {
            if bar.body() <= self.body_ratio * bar.range() {
                continue;
            }
            if bar.is_bullish() {
                block.bullish = Some(*bar);
            } else if bar.is_bearish() {
                block.bearish = Some(*bar);
            }
        }

        Some(block)
    }
}
