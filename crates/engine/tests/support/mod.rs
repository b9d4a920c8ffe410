#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use common::{Announcement, AnnouncementSink, Bar, BarSupply, Bars};
use engine::{Analyzer, ContinuityPolicy, Scanner};
use store::{MemoryStore, SignalBook};
use strategy::AnalysisConfig;

pub fn bar(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar { timestamp: 0, open, high, low, close, volume }
}

/// 40 bars ending in a bullish break with a gap, an order block and a volume
/// spike. Scores 9 and yields a long idea at 107.
pub fn bullish_setup() -> Bars {
    let mut bars: Bars = (0..34).map(|_| bar(100.0, 101.0, 99.0, 100.0, 10.0)).collect();
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

/// Same bars without the volume spike: scores 8 and is not actionable.
pub fn quiet_setup() -> Bars {
    let mut bars = bullish_setup();
    if let Some(last) = bars.last_mut() {
        last.volume = 10.0;
    }
    bars
}

pub fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Serves fixed bars per symbol for any interval. `PANICUSDT` panics.
#[derive(Default)]
pub struct ScriptedSupply {
    bars: Mutex<HashMap<String, Bars>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedSupply {
    pub fn with(entries: &[(&str, Bars)]) -> Self {
        let supply = Self::default();
        for (symbol, bars) in entries {
            supply.set(symbol, bars.clone());
        }
        supply
    }

    pub fn set(&self, symbol: &str, bars: Bars) {
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BarSupply for ScriptedSupply {
    async fn fetch_bars(&self, symbol: &str, interval: &str, _limit: usize) -> Bars {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), interval.to_string()));
        if symbol == "PANICUSDT" {
            panic!("scripted failure");
        }
        self.bars.lock().unwrap().get(symbol).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<Announcement>>,
}

#[async_trait]
impl AnnouncementSink for RecordingSink {
    async fn deliver(&self, announcements: &[Announcement]) {
        self.delivered.lock().unwrap().extend_from_slice(announcements);
    }
}

pub fn book() -> SignalBook {
    SignalBook::new(Arc::new(MemoryStore::new()), 50)
}

pub fn scanner(supply: Arc<dyn BarSupply>, book: SignalBook, symbols: &[&str]) -> Scanner {
    Scanner::new(
        Analyzer::new(supply, &AnalysisConfig::default()),
        book,
        symbols.iter().map(|s| s.to_string()).collect(),
        ContinuityPolicy::default(),
    )
}
