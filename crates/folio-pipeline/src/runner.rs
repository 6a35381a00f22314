//! Pipeline runner
//!
//! Drives the [`Stage`] machine: run the stage's step, apply its patches,
//! ask the stage for its successor, repeat until `Done`. All collaborators
//! are injected at build time.

use crate::narrator::Narrator;
use crate::state::{ExplainState, Stage};
use crate::steps::{
    CandidatesStep, DiversifyStep, EvidenceStep, ExplainStep, PipelineStep, PriceUpdateStep,
    RiskStep, StatsStep, WarningStep,
};
use folio_core::{DiffOptions, Error, Result};
use folio_market::{FetchConfig, NewsProvider, PriceProvider};
use std::sync::Arc;
use tracing::info;

/// Configured portfolio-explainer pipeline
pub struct PipelineRunner {
    price_update: PriceUpdateStep,
    stats: StatsStep,
    risk: RiskStep,
    candidates: CandidatesStep,
    evidence: EvidenceStep,
    diversify: DiversifyStep,
    warning: WarningStep,
    explain: ExplainStep,
}

impl PipelineRunner {
    /// Create a new runner builder
    pub fn builder() -> PipelineRunnerBuilder {
        PipelineRunnerBuilder::default()
    }

    fn step_for(&self, stage: Stage) -> Option<&dyn PipelineStep> {
        match stage {
            Stage::PriceUpdate => Some(&self.price_update),
            Stage::Stats => Some(&self.stats),
            Stage::Risk => Some(&self.risk),
            Stage::Candidates => Some(&self.candidates),
            Stage::Evidence => Some(&self.evidence),
            Stage::Diversify => Some(&self.diversify),
            Stage::Warning => Some(&self.warning),
            Stage::Explain => Some(&self.explain),
            Stage::Done => None,
        }
    }

    /// Run the pipeline to completion
    pub async fn run(&self, mut state: ExplainState) -> Result<ExplainState> {
        let mut stage = Stage::start();
        while let Some(step) = self.step_for(stage) {
            info!(stage = ?stage, step = step.name(), "running pipeline step");
            let patches = step.run(&state).await?;
            for patch in patches {
                state.apply(patch);
            }
            stage = stage.next(&state);
        }
        Ok(state)
    }
}

/// Builder for [`PipelineRunner`]
#[derive(Default)]
pub struct PipelineRunnerBuilder {
    price_provider: Option<Arc<dyn PriceProvider>>,
    news_provider: Option<Arc<dyn NewsProvider>>,
    narrator: Option<Arc<dyn Narrator>>,
    diff_options: Option<DiffOptions>,
    fetch_config: Option<FetchConfig>,
}

impl PipelineRunnerBuilder {
    /// Set the price provider used by the price-update stage
    pub fn price_provider(mut self, provider: Arc<dyn PriceProvider>) -> Self {
        self.price_provider = Some(provider);
        self
    }

    /// Set the news provider used by the evidence stage
    pub fn news_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.news_provider = Some(provider);
        self
    }

    /// Set the narrator used by the LLM-backed stages
    pub fn narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Override the diff parameters
    pub fn diff_options(mut self, options: DiffOptions) -> Self {
        self.diff_options = Some(options);
        self
    }

    /// Override the evidence-fetch parameters
    pub fn fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch_config = Some(config);
        self
    }

    /// Build the runner, validating configuration up front
    pub fn build(self) -> Result<PipelineRunner> {
        let price_provider = self
            .price_provider
            .ok_or_else(|| Error::Config("pipeline requires a price provider".to_string()))?;
        let news_provider = self
            .news_provider
            .ok_or_else(|| Error::Config("pipeline requires a news provider".to_string()))?;
        let narrator = self
            .narrator
            .ok_or_else(|| Error::Config("pipeline requires a narrator".to_string()))?;

        let diff_options = self.diff_options.unwrap_or_default();
        diff_options.validate()?;
        let fetch_config = self.fetch_config.unwrap_or_default();
        fetch_config.validate().map_err(folio_core::Error::from)?;

        Ok(PipelineRunner {
            price_update: PriceUpdateStep::new(price_provider),
            stats: StatsStep::new(diff_options),
            risk: RiskStep,
            candidates: CandidatesStep,
            evidence: EvidenceStep::new(news_provider, fetch_config),
            diversify: DiversifyStep::new(Arc::clone(&narrator)),
            warning: WarningStep::new(Arc::clone(&narrator)),
            explain: ExplainStep::new(narrator),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrator::TemplateNarrator;
    use async_trait::async_trait;
    use folio_core::Holding;
    use folio_market::{FetchWindow, NewsArticle};

    struct StubPrices;

    #[async_trait]
    impl PriceProvider for StubPrices {
        async fn prev_close(&self, _symbol: &str) -> folio_market::Result<Option<f64>> {
            Ok(Some(150.0))
        }
    }

    struct StubNews;

    #[async_trait]
    impl NewsProvider for StubNews {
        async fn fetch_news(
            &self,
            symbol: &str,
            _window: FetchWindow,
        ) -> folio_market::Result<Vec<NewsArticle>> {
            Ok(vec![NewsArticle::new(
                format!("{symbol} update"),
                format!("https://example.com/{symbol}"),
            )])
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn runner() -> PipelineRunner {
        PipelineRunner::builder()
            .price_provider(Arc::new(StubPrices))
            .news_provider(Arc::new(StubNews))
            .narrator(Arc::new(TemplateNarrator::new()))
            .build()
            .expect("runner")
    }

    fn concentrated_holdings() -> Vec<Holding> {
        vec![
            Holding::new("AAPL", 10.0, 100.0).with_asset_class("STOCK"),
            Holding::new("MSFT", 5.0, 200.0).with_asset_class("STOCK"),
        ]
    }

    fn diversified_holdings() -> Vec<Holding> {
        (0..10)
            .map(|i| {
                let class = if i < 5 { "STOCK" } else { "BOND" };
                Holding::new(format!("S{i}"), 1.0, 100.0).with_asset_class(class)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_full_run_high_risk_includes_warning() {
        let state = ExplainState::new(concentrated_holdings(), None);
        let result = runner().run(state).await.expect("state");

        assert!(result.stats.is_some());
        assert!(result.risk.is_some());
        assert_eq!(result.diversifier_candidates.len(), 3);
        assert!(result.scope.is_some());
        assert!(result.evidence.is_some());
        assert!(result.research_brief.is_some());
        assert!(result.diversification_ideas.is_some());
        assert!(result.warning.is_some());
        assert!(result.explanation.is_some());
    }

    #[tokio::test]
    async fn test_full_run_low_risk_skips_warning() {
        let state = ExplainState::new(diversified_holdings(), None);
        let result = runner().run(state).await.expect("state");
        assert!(result.warning.is_none());
        assert!(result.explanation.is_some());
    }

    #[tokio::test]
    async fn test_live_prices_refresh_holdings() {
        let mut state = ExplainState::new(concentrated_holdings(), None);
        state.use_live_prices = true;
        let result = runner().run(state).await.expect("state");
        assert!(result.holdings.iter().all(|h| h.price == Some(150.0)));
    }

    #[tokio::test]
    async fn test_empty_portfolio_fails_fast() {
        let state = ExplainState::default();
        assert!(matches!(
            runner().run(state).await,
            Err(Error::EmptyPortfolio)
        ));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        assert!(PipelineRunner::builder().build().is_err());
    }
}
