use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle as returned by the market-data adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Candle open time, epoch milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candles ordered oldest first.
pub type Bars = Vec<Bar>;

impl Bar {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Direction of a structural move (break or gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakOfStructure {
    pub direction: Trend,
    /// Close of the bar that broke the range.
    pub price: f64,
}

/// Nearest large-bodied candle of each polarity. Either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBlock {
    pub bullish: Option<Bar>,
    pub bearish: Option<Bar>,
}

impl OrderBlock {
    pub fn has_polarity(&self) -> bool {
        self.bullish.is_some() || self.bearish.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub direction: Trend,
    pub low: f64,
    pub high: f64,
}

/// A volume spike on the newest bar relative to its local average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityZone {
    pub volume: f64,
    pub average_volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    ShootingStar,
    Hammer,
    BullishEngulfing,
    BearishEngulfing,
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandlePattern::ShootingStar => write!(f, "shooting star"),
            CandlePattern::Hammer => write!(f, "hammer"),
            CandlePattern::BullishEngulfing => write!(f, "bullish engulfing"),
            CandlePattern::BearishEngulfing => write!(f, "bearish engulfing"),
        }
    }
}

/// Raw output of every detector for one bar sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub break_of_structure: Option<BreakOfStructure>,
    pub order_block: Option<OrderBlock>,
    pub fair_value_gap: Option<FairValueGap>,
    pub liquidity: Option<LiquidityZone>,
    pub pattern: Option<CandlePattern>,
}

/// Side of a trade idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// An actionable, scored trade idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub risk_reward_ratio: f64,
    pub confluence_score: u32,
    pub note_tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoData,
    NotEnoughConfluence,
    /// Rounding left no distance between entry and stop.
    DegenerateLevels,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NoData => write!(f, "no data"),
            RejectReason::NotEnoughConfluence => write!(f, "Not enough confluence"),
            RejectReason::DegenerateLevels => write!(f, "price too small for stop and target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotActionable {
    pub reason: RejectReason,
    /// Zero when no bars were available.
    pub confluence_score: u32,
}

/// Result of scoring one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdeaOutcome {
    Actionable(Idea),
    Rejected(NotActionable),
}

impl IdeaOutcome {
    pub fn no_data() -> Self {
        IdeaOutcome::Rejected(NotActionable {
            reason: RejectReason::NoData,
            confluence_score: 0,
        })
    }

    pub fn score(&self) -> u32 {
        match self {
            IdeaOutcome::Actionable(idea) => idea.confluence_score,
            IdeaOutcome::Rejected(r) => r.confluence_score,
        }
    }

    pub fn idea(&self) -> Option<&Idea> {
        match self {
            IdeaOutcome::Actionable(idea) => Some(idea),
            IdeaOutcome::Rejected(_) => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, IdeaOutcome::Actionable(_))
    }
}

/// Higher-timeframe snapshot attached to an analysis for context only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeContext {
    pub interval: String,
    pub bars: usize,
    pub last_close: Option<f64>,
    pub break_of_structure: Option<BreakOfStructure>,
}

/// Everything computed for one symbol in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    /// Close of the newest primary bar. `None` when no bars were returned.
    pub price: Option<f64>,
    pub structure: Option<StructureReport>,
    pub context: Vec<TimeframeContext>,
    pub outcome: IdeaOutcome,
}

impl Analysis {
    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            structure: None,
            context: Vec::new(),
            outcome: IdeaOutcome::no_data(),
        }
    }
}

/// An announced idea and when it was (last) announced.
///
/// Stored per symbol as the last-signal record and appended to the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub idea: Idea,
    pub announced_at: DateTime<Utc>,
}

/// Why an announcement is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnouncementKind {
    /// A new idea replaced the stored record.
    New,
    /// A stronger standing idea is repeated; `since` is its previous announcement.
    Repeat { since: DateTime<Utc> },
    /// A watchlist hit addressed to a single user.
    Watch { user_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub idea: Idea,
}

impl Announcement {
    pub fn symbol(&self) -> &str {
        &self.idea.symbol
    }
}

/// Progress of the scan scheduler, shared with the status command and the
/// uptime endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStatus {
    pub cycles: u64,
    pub skipped_cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_announcements: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar { timestamp: 0, open, high, low, close, volume: 1.0 }
    }

    #[test]
    fn bar_geometry() {
        let b = bar(10.0, 14.0, 8.0, 12.0);
        assert_eq!(b.body(), 2.0);
        assert_eq!(b.range(), 6.0);
        assert_eq!(b.upper_wick(), 2.0);
        assert_eq!(b.lower_wick(), 2.0);
        assert!(b.is_bullish());
        assert!(!b.is_bearish());
    }

    #[test]
    fn outcome_score_and_reason_text() {
        let rejected = IdeaOutcome::Rejected(NotActionable {
            reason: RejectReason::NotEnoughConfluence,
            confluence_score: 4,
        });
        assert_eq!(rejected.score(), 4);
        assert!(!rejected.is_actionable());
        assert_eq!(IdeaOutcome::no_data().score(), 0);
        assert_eq!(RejectReason::NoData.to_string(), "no data");
        assert_eq!(RejectReason::NotEnoughConfluence.to_string(), "Not enough confluence");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(IdeaOutcome::no_data()).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "no_data");
    }
}
