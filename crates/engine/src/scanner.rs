use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use common::{Analysis, Announcement, AnnouncementKind, IdeaOutcome, Result, ScanStatus, SignalRecord};
use store::SignalBook;

use crate::analyzer::Analyzer;
use crate::continuity::{ContinuityPolicy, Decision};

/// Runs scan cycles over the configured symbols and the users' watchlists.
///
/// Only one cycle runs at a time: the timer and on-demand requests share the
/// same guard, and a request that finds a cycle in progress is skipped.
pub struct Scanner {
    analyzer: Analyzer,
    book: SignalBook,
    symbols: Vec<String>,
    policy: ContinuityPolicy,
    cycle_lock: Mutex<()>,
    status: Arc<RwLock<ScanStatus>>,
}

impl Scanner {
    pub fn new(
        analyzer: Analyzer,
        book: SignalBook,
        symbols: Vec<String>,
        policy: ContinuityPolicy,
    ) -> Self {
        Self {
            analyzer,
            book,
            symbols,
            policy,
            cycle_lock: Mutex::new(()),
            status: Arc::new(RwLock::new(ScanStatus::default())),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Shared cycle counters for status reporting.
    pub fn status(&self) -> Arc<RwLock<ScanStatus>> {
        self.status.clone()
    }

    /// On-demand analysis of one symbol, with higher-timeframe context.
    /// Does not consult or update the last-signal records.
    pub async fn scan(&self, symbol: &str) -> Analysis {
        self.analyzer
            .analyze_with_context(&symbol.trim().to_uppercase())
            .await
    }

    /// Run a cycle unless one is already in progress, in which case `None`
    /// is returned and nothing is analyzed.
    pub async fn try_cycle(&self, now: DateTime<Utc>) -> Option<Vec<Announcement>> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!("Scan cycle already running, skipping");
            self.status.write().await.skipped_cycles += 1;
            return None;
        };

        let announcements = self.run_cycle(now).await;

        let mut status = self.status.write().await;
        status.cycles += 1;
        status.last_cycle_at = Some(now);
        status.last_announcements = announcements.len();
        Some(announcements)
    }

    async fn run_cycle(&self, now: DateTime<Utc>) -> Vec<Announcement> {
        info!(symbols = self.symbols.len(), "Scan cycle started");
        let mut announcements = Vec::new();
        let mut outcomes: HashMap<String, IdeaOutcome> = HashMap::new();

        for symbol in &self.symbols {
            let step = AssertUnwindSafe(self.process_symbol(symbol, now))
                .catch_unwind()
                .await;
            match step {
                Ok(Ok((outcome, announcement))) => {
                    outcomes.insert(symbol.clone(), outcome);
                    announcements.extend(announcement);
                }
                Ok(Err(e)) => error!(%symbol, error = %e, "Symbol skipped this cycle"),
                Err(_) => error!(%symbol, "Analysis panicked, symbol skipped this cycle"),
            }
        }

        announcements.extend(self.watch_hits(&mut outcomes).await);

        info!(announcements = announcements.len(), "Scan cycle finished");
        announcements
    }

    async fn process_symbol(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<(IdeaOutcome, Option<Announcement>)> {
        let outcome = self.analyzer.analyze(symbol).await.outcome;
        let previous = self.book.last_signal(symbol).await?;

        let announcement = match self.policy.decide(&outcome, previous.as_ref(), now) {
            Decision::AnnounceNew(idea) => {
                let record = SignalRecord { idea, announced_at: now };
                self.book.record_announcement(&record).await?;
                info!(%symbol, score = record.idea.confluence_score, direction = %record.idea.direction, "New idea");
                Some(Announcement { kind: AnnouncementKind::New, idea: record.idea })
            }
            Decision::RepeatPrevious(prev) => {
                let record = SignalRecord { idea: prev.idea, announced_at: now };
                self.book.set_last_signal(&record).await?;
                info!(%symbol, score = record.idea.confluence_score, "Repeating standing idea");
                Some(Announcement {
                    kind: AnnouncementKind::Repeat { since: prev.announced_at },
                    idea: record.idea,
                })
            }
            Decision::Silent => None,
        };

        Ok((outcome, announcement))
    }

    /// Every actionable watched symbol is announced to its watchers, without
    /// continuity suppression. Each symbol is analyzed at most once per cycle.
    async fn watch_hits(&self, outcomes: &mut HashMap<String, IdeaOutcome>) -> Vec<Announcement> {
        let watchlists = match self.book.watchlists().await {
            Ok(lists) => lists,
            Err(e) => {
                error!(error = %e, "Failed to load watchlists");
                return Vec::new();
            }
        };

        let mut hits = Vec::new();
        for (user_id, symbols) in watchlists {
            for symbol in symbols {
                if !outcomes.contains_key(&symbol) {
                    let analyzed = AssertUnwindSafe(self.analyzer.analyze(&symbol))
                        .catch_unwind()
                        .await;
                    match analyzed {
                        Ok(analysis) => {
                            outcomes.insert(symbol.clone(), analysis.outcome);
                        }
                        Err(_) => {
                            error!(%symbol, "Watch analysis panicked");
                            outcomes.insert(symbol.clone(), IdeaOutcome::no_data());
                        }
                    }
                }

                if let Some(IdeaOutcome::Actionable(idea)) = outcomes.get(&symbol) {
                    hits.push(Announcement {
                        kind: AnnouncementKind::Watch { user_id },
                        idea: idea.clone(),
                    });
                }
            }
        }
        hits
    }
}
