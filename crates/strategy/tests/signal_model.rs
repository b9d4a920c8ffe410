use common::{Bar, Direction, IdeaOutcome, RejectReason, Trend};
use proptest::prelude::*;
use strategy::{AnalysisConfig, SignalModel};

fn bar(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar { timestamp: 0, open, high, low, close, volume }
}

/// 40 bars ending in a bullish break with a gap, an order block and a
/// volume spike.
fn bullish_setup() -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..34).map(|_| bar(100.0, 101.0, 99.0, 100.0, 10.0)).collect();
    bars.push(bar(100.0, 104.1, 99.9, 104.0, 10.0));
    bars.push(bar(104.0, 104.5, 103.5, 104.2, 10.0));
    bars.push(bar(104.6, 105.5, 104.5, 105.0, 10.0));
    bars.push(bar(105.0, 105.5, 104.8, 105.2, 10.0));
    bars.push(bar(105.2, 105.6, 105.0, 105.4, 10.0));
    bars.push(bar(105.4, 107.2, 105.3, 107.0, 100.0));
    for (i, b) in bars.iter_mut().enumerate() {
        b.timestamp = i as i64 * 900_000;
    }
    bars
}

#[test]
fn bullish_setup_produces_long_idea() {
    let eval = SignalModel::default().evaluate("BTCUSDT", &bullish_setup()).unwrap();

    assert_eq!(eval.price, 107.0);
    assert_eq!(eval.structure.break_of_structure.unwrap().direction, Trend::Up);
    assert_eq!(eval.structure.fair_value_gap.unwrap().direction, Trend::Up);
    assert_eq!(eval.structure.order_block.unwrap().bullish.unwrap().close, 104.0);
    assert!(eval.structure.liquidity.is_some());
    assert!(eval.structure.pattern.is_none());

    let idea = eval.outcome.idea().expect("actionable");
    assert_eq!(idea.direction, Direction::Long);
    assert_eq!(idea.confluence_score, 9);
    assert_eq!(idea.entry_price, 107.0);
    assert_eq!(idea.stop_loss, 105.93);
    assert_eq!(idea.take_profit, 109.14);
}

#[test]
fn raising_the_floor_rejects_the_same_bars() {
    let cfg = AnalysisConfig::from_toml("[scoring]\nmin_confluence = 10\n").unwrap();
    let eval = SignalModel::from_config(&cfg).evaluate("BTCUSDT", &bullish_setup()).unwrap();
    assert_eq!(
        eval.outcome,
        IdeaOutcome::Rejected(common::NotActionable {
            reason: RejectReason::NotEnoughConfluence,
            confluence_score: 9,
        })
    );
}

#[test]
fn quiet_volume_rejects() {
    let mut bars = bullish_setup();
    bars.last_mut().unwrap().volume = 10.0;
    let eval = SignalModel::default().evaluate("BTCUSDT", &bars).unwrap();
    assert!(!eval.outcome.is_actionable());
    assert_eq!(eval.outcome.score(), 8);
}

#[test]
fn empty_bars_evaluate_to_none() {
    assert!(SignalModel::default().evaluate("BTCUSDT", &[]).is_none());
}

fn arb_bar() -> impl Strategy<Value = Bar> {
    (1.0f64..1000.0, 0.0f64..50.0, 0.0f64..50.0, 0.0f64..1.0, 0.0f64..10_000.0).prop_map(
        |(open, up, down, close_frac, volume)| {
            let high = open + up;
            let low = (open - down).max(0.5);
            let close = low + (high - low) * close_frac;
            Bar { timestamp: 0, open, high, low, close, volume }
        },
    )
}

/// Candle sequences at prices from 1e-9 up to the unscaled range.
fn arb_scaled_bars() -> impl Strategy<Value = Vec<Bar>> {
    (prop::collection::vec(arb_bar(), 20..80), -9i32..=0).prop_map(|(bars, exp)| {
        let scale = 10f64.powi(exp);
        bars.into_iter()
            .map(|b| Bar {
                open: b.open * scale,
                high: b.high * scale,
                low: b.low * scale,
                close: b.close * scale,
                ..b
            })
            .collect()
    })
}

proptest! {
    /// Detectors and scorer must be total over arbitrary candle sequences.
    #[test]
    fn evaluation_never_panics(bars in prop::collection::vec(arb_bar(), 0..80)) {
        let _ = SignalModel::default().evaluate("TESTUSDT", &bars);
    }

    /// Same bars, same result.
    #[test]
    fn evaluation_is_deterministic(bars in prop::collection::vec(arb_bar(), 1..80)) {
        let model = SignalModel::default();
        prop_assert_eq!(model.evaluate("TESTUSDT", &bars), model.evaluate("TESTUSDT", &bars));
    }

    /// Actionable ideas always bracket the entry on the correct side.
    #[test]
    fn actionable_levels_are_ordered(bars in arb_scaled_bars()) {
        if let Some(eval) = SignalModel::default().evaluate("TESTUSDT", &bars) {
            if let IdeaOutcome::Actionable(idea) = eval.outcome {
                prop_assert!(idea.risk_reward_ratio > 0.0);
                match idea.direction {
                    Direction::Long => {
                        prop_assert!(idea.take_profit > idea.entry_price);
                        prop_assert!(idea.entry_price > idea.stop_loss);
                    }
                    Direction::Short => {
                        prop_assert!(idea.take_profit < idea.entry_price);
                        prop_assert!(idea.entry_price < idea.stop_loss);
                    }
                }
            }
        }
    }
}
