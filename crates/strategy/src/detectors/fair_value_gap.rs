use common::{Bar, FairValueGap, Trend};

/// Minimum bars before a gap is searched for.
pub const MIN_BARS: usize = 5;

/// Fair value gap: a price range left untraded between bar `i - 2` and bar `i`.
///
/// Scans from `len - 3` back to index 2 and returns the most recent gap. The
/// two newest bars are never the right-hand side of a gap.
pub fn fair_value_gap(bars: &[Bar]) -> Option<FairValueGap> {
    if bars.len() < MIN_BARS {
        return None;
    }

    (2..=bars.len() - 3).rev().find_map(|i| {
        let (left, right) = (&bars[i - 2], &bars[i]);
        if right.low > left.high {
            Some(FairValueGap { direction: Trend::Up, low: left.high, high: right.low })
        } else if right.high < left.low {
            Some(FairValueGap { direction: Trend::Down, low: right.high, high: left.low })
        } else {
            None
        }
    })
}
