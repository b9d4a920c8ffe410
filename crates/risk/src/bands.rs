use serde::{Deserialize, Serialize};

use common::Direction;

/// Fixed percentage stop and target bands around the entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBands {
    /// Distance from entry to the stop (e.g. 0.01 = 1%).
    pub stop_loss_pct: f64,
    /// Distance from entry to the target (e.g. 0.02 = 2%).
    pub take_profit_pct: f64,
    /// Minimum decimal places prices are rounded to.
    pub price_decimals: u32,
    /// Significant digits kept for prices too small for `price_decimals`,
    /// so sub-cent assets keep distinct stop, entry and target levels.
    pub significant_digits: u32,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            stop_loss_pct: 0.01,
            take_profit_pct: 0.02,
            price_decimals: 6,
            significant_digits: 6,
        }
    }
}

/// Entry, stop and target for one idea.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward: f64,
}

impl RiskBands {
    /// Place the stop and target for a position entered at `price`.
    ///
    /// Risk-reward is measured on the rounded levels and rounded to two places.
    /// Returns a ratio of zero if rounding collapses the stop onto the entry,
    /// which the scorer treats as not actionable.
    pub fn levels(&self, direction: Direction, price: f64) -> Levels {
        let (stop, target) = match direction {
            Direction::Long => (
                price * (1.0 - self.stop_loss_pct),
                price * (1.0 + self.take_profit_pct),
            ),
            Direction::Short => (
                price * (1.0 + self.stop_loss_pct),
                price * (1.0 - self.take_profit_pct),
            ),
        };

        let decimals = self.decimals_for(price);
        let entry = round_to(price, decimals);
        let stop_loss = round_to(stop, decimals);
        let take_profit = round_to(target, decimals);

        let risk = (entry - stop_loss).abs();
        let reward = (take_profit - entry).abs();
        let risk_reward = if risk > 0.0 { round_to(reward / risk, 2) } else { 0.0 };

        Levels { entry, stop_loss, take_profit, risk_reward }
    }

    /// `price_decimals`, widened until `price` keeps `significant_digits`.
    pub fn decimals_for(&self, price: f64) -> u32 {
        if !price.is_finite() || price <= 0.0 {
            return self.price_decimals;
        }
        let magnitude = price.log10().floor() as i32;
        let needed = self.significant_digits as i32 - 1 - magnitude;
        needed.clamp(self.price_decimals as i32, MAX_DECIMALS) as u32
    }
}

/// Beyond this `10^decimals` stops being exact in an f64.
const MAX_DECIMALS: i32 = 22;

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_levels_bracket_entry() {
        let levels = RiskBands::default().levels(Direction::Long, 100.0);
        assert_eq!(levels.entry, 100.0);
        assert_eq!(levels.stop_loss, 99.0);
        assert_eq!(levels.take_profit, 102.0);
        assert!((levels.risk_reward - 2.0).abs() < 1e-9);
    }

    #[test]
    fn short_levels_bracket_entry() {
        let levels = RiskBands::default().levels(Direction::Short, 100.0);
        assert_eq!(levels.stop_loss, 101.0);
        assert_eq!(levels.take_profit, 98.0);
        assert!((levels.risk_reward - 2.0).abs() < 1e-9);
    }

    #[test]
    fn wider_bands_change_ratio() {
        let bands = RiskBands { stop_loss_pct: 0.02, take_profit_pct: 0.05, ..RiskBands::default() };
        let levels = bands.levels(Direction::Long, 200.0);
        assert_eq!(levels.stop_loss, 196.0);
        assert_eq!(levels.take_profit, 210.0);
        assert!((levels.risk_reward - 2.5).abs() < 1e-9);
    }

    #[test]
    fn prices_rounded_to_six_places() {
        let levels = RiskBands::default().levels(Direction::Long, 0.123456789);
        assert_eq!(levels.entry, 0.123457);
        assert_eq!(levels.stop_loss, round_to(0.123456789 * 0.99, 6));
    }

    #[test]
    fn sub_cent_prices_keep_distinct_levels() {
        let levels = RiskBands::default().levels(Direction::Long, 0.000012);
        assert_eq!(levels.entry, 0.000012);
        assert_eq!(levels.stop_loss, 0.00001188);
        assert_eq!(levels.take_profit, 0.00001224);
        assert!((levels.risk_reward - 2.0).abs() < 1e-9);

        let short = RiskBands::default().levels(Direction::Short, 0.000000001234);
        assert!(short.take_profit < short.entry && short.entry < short.stop_loss);
        assert!(short.risk_reward > 0.0);
    }

    #[test]
    fn decimals_widen_only_below_the_minimum() {
        let bands = RiskBands::default();
        assert_eq!(bands.decimals_for(65_000.0), 6);
        assert_eq!(bands.decimals_for(0.5), 6);
        assert_eq!(bands.decimals_for(0.000012), 10);
        assert_eq!(bands.decimals_for(0.0), 6);
        assert_eq!(bands.decimals_for(f64::NAN), 6);
    }

    #[test]
    fn collapsed_levels_report_zero_ratio() {
        let bands = RiskBands { significant_digits: 1, price_decimals: 0, ..RiskBands::default() };
        let levels = bands.levels(Direction::Long, 5.0);
        assert_eq!(levels.stop_loss, levels.entry);
        assert_eq!(levels.risk_reward, 0.0);
    }

    #[test]
    fn round_to_handles_whole_numbers() {
        assert_eq!(round_to(42.0, 6), 42.0);
        assert_eq!(round_to(2.345678, 2), 2.35);
    }
}
