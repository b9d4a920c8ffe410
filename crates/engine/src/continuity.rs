use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use common::{Error, Idea, IdeaOutcome, Result, SignalRecord};

/// Repeat windows, read from the `[continuity]` table of the analysis file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuityConfig {
    /// Repeat a stronger standing idea after this long when nothing is actionable.
    pub repeat_after_rejected_secs: i64,
    /// Repeat a stronger standing idea after this long when only weaker ideas appear.
    pub repeat_after_weaker_secs: i64,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            repeat_after_rejected_secs: 5 * 60,
            repeat_after_weaker_secs: 10 * 60,
        }
    }
}

impl ContinuityConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct File {
            continuity: ContinuityConfig,
        }
        toml::from_str::<File>(content)
            .map(|f| f.continuity)
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// What to do with a symbol after scoring it.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Announce the new idea and make it the symbol's record.
    AnnounceNew(Idea),
    /// Repeat the stored idea and refresh its timestamp.
    RepeatPrevious(SignalRecord),
    Silent,
}

/// Debounce between a fresh outcome and the last announced idea.
///
/// Equal or stronger ideas always replace the record. A stronger standing
/// idea is repeated once its window has elapsed since the last announcement;
/// since repeating refreshes the timestamp, it fires at most once per window.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuityPolicy {
    config: ContinuityConfig,
}

impl ContinuityPolicy {
    pub fn new(config: ContinuityConfig) -> Self {
        Self { config }
    }

    pub fn decide(
        &self,
        outcome: &IdeaOutcome,
        previous: Option<&SignalRecord>,
        now: DateTime<Utc>,
    ) -> Decision {
        let window = match outcome {
            IdeaOutcome::Actionable(idea) => match previous {
                Some(prev) if idea.confluence_score < prev.idea.confluence_score => {
                    self.config.repeat_after_weaker_secs
                }
                _ => return Decision::AnnounceNew(idea.clone()),
            },
            IdeaOutcome::Rejected(_) => self.config.repeat_after_rejected_secs,
        };

        match previous {
            Some(prev)
                if prev.idea.confluence_score > outcome.score()
                    && now - prev.announced_at > Duration::seconds(window) =>
            {
                Decision::RepeatPrevious(prev.clone())
            }
            _ => Decision::Silent,
        }
    }
}
