use serde::{Deserialize, Serialize};

use common::{Direction, Idea, IdeaOutcome, NotActionable, RejectReason, StructureReport, Trend};
use risk::RiskBands;

/// Points contributed by each detected feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub break_of_structure: u32,
    pub fair_value_gap: u32,
    pub order_block: u32,
    pub liquidity: u32,
    pub pattern: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            break_of_structure: 3,
            fair_value_gap: 3,
            order_block: 2,
            liquidity: 1,
            pattern: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: Weights,
    /// Minimum confluence score for an actionable idea.
    pub min_confluence: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { weights: Weights::default(), min_confluence: 6 }
    }
}

/// Turns a structure report into a scored idea.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    config: ScoringConfig,
    bands: RiskBands,
}

impl Scorer {
    pub fn new(config: ScoringConfig, bands: RiskBands) -> Self {
        Self { config, bands }
    }

    /// Weighted sum of the features present in `report`.
    pub fn score(&self, report: &StructureReport) -> u32 {
        let w = &self.config.weights;
        let mut score = 0;
        if report.break_of_structure.is_some() {
            score += w.break_of_structure;
        }
        if report.fair_value_gap.is_some() {
            score += w.fair_value_gap;
        }
        if has_order_block(report) {
            score += w.order_block;
        }
        if report.liquidity.is_some() {
            score += w.liquidity;
        }
        if report.pattern.is_some() {
            score += w.pattern;
        }
        score
    }

    /// An idea is actionable only when a break gives it a direction, a gap,
    /// an order block and a liquidity spike are all present, and the score
    /// reaches the confluence floor.
    pub fn generate_idea(&self, symbol: &str, price: f64, report: &StructureReport) -> IdeaOutcome {
        let score = self.score(report);

        let direction = report.break_of_structure.map(|bos| match bos.direction {
            Trend::Up => Direction::Long,
            Trend::Down => Direction::Short,
        });

        let direction = match direction {
            Some(d)
                if report.fair_value_gap.is_some()
                    && has_order_block(report)
                    && report.liquidity.is_some()
                    && score >= self.config.min_confluence =>
            {
                d
            }
            _ => {
                return IdeaOutcome::Rejected(NotActionable {
                    reason: RejectReason::NotEnoughConfluence,
                    confluence_score: score,
                })
            }
        };

        let levels = self.bands.levels(direction, price);
        if levels.risk_reward <= 0.0 {
            return IdeaOutcome::Rejected(NotActionable {
                reason: RejectReason::DegenerateLevels,
                confluence_score: score,
            });
        }

        IdeaOutcome::Actionable(Idea {
            symbol: symbol.to_string(),
            direction,
            entry_price: levels.entry,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            risk_reward_ratio: levels.risk_reward,
            confluence_score: score,
            note_tags: note_tags(report),
        })
    }
}

fn has_order_block(report: &StructureReport) -> bool {
    report.order_block.is_some_and(|ob| ob.has_polarity())
}

fn note_tags(report: &StructureReport) -> Vec<String> {
    let mut tags = Vec::new();
    if let Some(bos) = report.break_of_structure {
        tags.push(format!("BOS {}", bos.direction));
    }
    if let Some(gap) = report.fair_value_gap {
        tags.push(format!("FVG {}", gap.direction));
    }
    if let Some(ob) = report.order_block {
        match (ob.bullish.is_some(), ob.bearish.is_some()) {
            (true, true) => tags.push("OB bullish+bearish".to_string()),
            (true, false) => tags.push("OB bullish".to_string()),
            (false, true) => tags.push("OB bearish".to_string()),
            (false, false) => {}
        }
    }
    if let Some(zone) = report.liquidity {
        if zone.average_volume > 0.0 {
            tags.push(format!("Liquidity {:.1}x", zone.volume / zone.average_volume));
        } else {
            tags.push("Liquidity".to_string());
        }
    }
    if let Some(pattern) = report.pattern {
        tags.push(format!("Pattern {pattern}"));
    }
    tags
}
