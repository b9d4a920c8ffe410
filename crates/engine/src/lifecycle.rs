use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use common::AnnouncementSink;

use crate::scanner::Scanner;

/// Drives scan cycles on a fixed interval and hands the results to the sink.
///
/// The first cycle runs immediately on start. A tick that lands while a cycle
/// is still running (e.g. one triggered from chat) is skipped, not queued.
pub struct Scheduler {
    scanner: Arc<Scanner>,
    sink: Arc<dyn AnnouncementSink>,
    every: Duration,
}

impl Scheduler {
    pub fn new(scanner: Arc<Scanner>, sink: Arc<dyn AnnouncementSink>, every: Duration) -> Self {
        Self { scanner, sink, every }
    }

    /// Run forever. Call from `tokio::spawn`.
    pub async fn run(self) {
        info!(every_secs = self.every.as_secs(), "Scheduler running");
        let mut ticker = tokio::time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Run one guarded cycle and deliver its announcements.
    /// Returns `false` if the cycle was skipped.
    pub async fn tick(&self) -> bool {
        run_and_deliver(&self.scanner, self.sink.as_ref()).await
    }
}

/// Shared by the timer and on-demand chat requests.
pub async fn run_and_deliver(scanner: &Scanner, sink: &dyn AnnouncementSink) -> bool {
    match scanner.try_cycle(Utc::now()).await {
        Some(announcements) => {
            if !announcements.is_empty() {
                sink.deliver(&announcements).await;
            }
            true
        }
        None => false,
    }
}
