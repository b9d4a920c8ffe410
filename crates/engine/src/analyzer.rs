use std::sync::Arc;

use tracing::debug;

use common::{Analysis, BarSupply, TimeframeContext};
use strategy::{AnalysisConfig, MarketConfig, SignalModel};

/// Fetches bars for one symbol and runs the signal model over them.
#[derive(Clone)]
pub struct Analyzer {
    supply: Arc<dyn BarSupply>,
    model: SignalModel,
    market: MarketConfig,
}

impl Analyzer {
    pub fn new(supply: Arc<dyn BarSupply>, cfg: &AnalysisConfig) -> Self {
        Self {
            supply,
            model: SignalModel::from_config(cfg),
            market: cfg.market.clone(),
        }
    }

    /// Analyze the primary interval only. An empty fetch is the single point
    /// where market-data failures surface, as a "no data" rejection.
    pub async fn analyze(&self, symbol: &str) -> Analysis {
        let bars = self
            .supply
            .fetch_bars(symbol, &self.market.primary_interval, self.market.primary_limit)
            .await;

        let Some(eval) = self.model.evaluate(symbol, &bars) else {
            debug!(%symbol, "No bars returned");
            return Analysis::no_data(symbol);
        };

        debug!(
            %symbol,
            price = eval.price,
            score = eval.outcome.score(),
            actionable = eval.outcome.is_actionable(),
            "Analyzed"
        );

        Analysis {
            symbol: symbol.to_string(),
            price: Some(eval.price),
            structure: Some(eval.structure),
            context: Vec::new(),
            outcome: eval.outcome,
        }
    }

    /// Like [`analyze`](Self::analyze), plus a snapshot of each higher
    /// timeframe. The snapshots never influence the outcome.
    pub async fn analyze_with_context(&self, symbol: &str) -> Analysis {
        let mut analysis = self.analyze(symbol).await;
        if analysis.price.is_none() {
            return analysis;
        }

        for interval in &self.market.context_intervals {
            let bars = self
                .supply
                .fetch_bars(symbol, interval, self.market.context_limit)
                .await;
            analysis.context.push(TimeframeContext {
                interval: interval.clone(),
                bars: bars.len(),
                last_close: bars.last().map(|b| b.close),
                break_of_structure: self.model.detectors().break_of_structure.detect(&bars),
            });
        }

        analysis
    }
}
