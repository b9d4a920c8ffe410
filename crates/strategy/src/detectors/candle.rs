use serde::{Deserialize, Serialize};

use common::{Bar, CandlePattern};

/// Single- and two-bar reversal patterns on the newest candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandlePatternDetector {
    /// A star or hammer body must be smaller than this fraction of the range.
    pub body_ratio: f64,
    /// The dominant wick must exceed the other by this factor.
    pub wick_ratio: f64,
}

impl Default for CandlePatternDetector {
    fn default() -> Self {
        Self { body_ratio: 0.3, wick_ratio: 2.0 }
    }
}

impl CandlePatternDetector {
    pub fn new(body_ratio: f64, wick_ratio: f64) -> Self {
        Self { body_ratio, wick_ratio }
    }

    /// Rules are tried in order: shooting star, hammer, bullish engulfing,
    /// bearish engulfing.
    pub fn detect(&self, bars: &[Bar]) -> Option<CandlePattern> {
        let [.., prev, cur] = bars else {
            return None;
        };

        if cur.body() < self.body_ratio * cur.range() {
            let (upper, lower) = (cur.upper_wick(), cur.lower_wick());
            if upper > self.wick_ratio * lower {
                return Some(CandlePattern::ShootingStar);
            }
            if lower > self.wick_ratio * upper {
                return Some(CandlePattern::Hammer);
            }
        }

        if prev.is_bearish() && cur.is_bullish() && cur.open <= prev.close && cur.close >= prev.open {
            return Some(CandlePattern::BullishEngulfing);
        }
        if prev.is_bullish() && cur.is_bearish() && cur.open >= prev.close && cur.close <= prev.open {
            return Some(CandlePattern::BearishEngulfing);
        }

        None
    }
}
