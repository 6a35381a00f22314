//! Pipeline step implementations

use crate::brief::ResearchBrief;
use crate::narrator::Narrator;
use crate::prompt::{
    DIVERSIFICATION_SYSTEM_PROMPT, build_diversification_prompt, build_explainer_prompt,
    build_warning_prompt,
};
use crate::state::{ExplainState, StatePatch};
use async_trait::async_trait;
use folio_core::{
    DiffOptions, Error, Result, assess_risk, compute_scope, compute_stats, diff_from_stats,
    diversifier_candidates,
};
use folio_market::{FetchConfig, NewsProvider, PriceProvider, fetch_evidence, refresh_prices};
use std::sync::Arc;

/// One stage's unit of work
///
/// Steps read the state and return patches; they never mutate it. Pure
/// computation errors propagate to the caller, I/O steps degrade per their
/// own contracts.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Step name for logging
    fn name(&self) -> &'static str;

    /// Run the step against the current state
    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>>;
}

/// Refresh holding prices from the provider's previous close
pub struct PriceUpdateStep {
    provider: Arc<dyn PriceProvider>,
}

impl PriceUpdateStep {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl PipelineStep for PriceUpdateStep {
    fn name(&self) -> &'static str {
        "price_update"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        if !state.use_live_prices {
            return Ok(Vec::new());
        }
        let updated = refresh_prices(&state.holdings, self.provider.as_ref()).await;
        Ok(vec![StatePatch::Holdings(updated)])
    }
}

/// Compute portfolio statistics and, when a previous snapshot exists, the diff
pub struct StatsStep {
    options: DiffOptions,
}

impl StatsStep {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl PipelineStep for StatsStep {
    fn name(&self) -> &'static str {
        "stats"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let stats = compute_stats(&state.holdings)?;
        let diff = match state.prev_stats.as_ref() {
            Some(prev) => Some(diff_from_stats(Some(prev), &stats, &self.options)?),
            None => None,
        };
        Ok(vec![StatePatch::Stats { stats, diff }])
    }
}

/// Assess concentration and asset-mix risk
pub struct RiskStep;

#[async_trait]
impl PipelineStep for RiskStep {
    fn name(&self) -> &'static str {
        "risk"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let stats = state.stats.as_ref().ok_or(Error::MissingInput("stats"))?;
        Ok(vec![StatePatch::Risk(assess_risk(stats))])
    }
}

/// Suggest deterministic diversifier candidates for the assessed risk tier
pub struct CandidatesStep;

#[async_trait]
impl PipelineStep for CandidatesStep {
    fn name(&self) -> &'static str {
        "candidates"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let risk = state.risk.as_ref().ok_or(Error::MissingInput("risk"))?;
        Ok(vec![StatePatch::Candidates(diversifier_candidates(
            &state.holdings,
            risk.level,
        ))])
    }
}

/// Compute the research scope and gather news evidence for it
pub struct EvidenceStep {
    provider: Arc<dyn NewsProvider>,
    config: FetchConfig,
}

impl EvidenceStep {
    pub fn new(provider: Arc<dyn NewsProvider>, config: FetchConfig) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl PipelineStep for EvidenceStep {
    fn name(&self) -> &'static str {
        "evidence"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let stats = state.stats.as_ref().ok_or(Error::MissingInput("stats"))?;
        let scope = compute_scope(stats, &state.diversifier_candidates);
        let bundle = fetch_evidence(&scope, Arc::clone(&self.provider), &self.config).await?;
        let brief = ResearchBrief::skeleton(&scope, &bundle, &self.config);
        brief.validate()?;
        Ok(vec![StatePatch::Evidence {
            scope,
            bundle,
            brief,
        }])
    }
}

/// Narrate diversification ideas
pub struct DiversifyStep {
    narrator: Arc<dyn Narrator>,
}

impl DiversifyStep {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }
}

#[async_trait]
impl PipelineStep for DiversifyStep {
    fn name(&self) -> &'static str {
        "diversify"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let prompt = build_diversification_prompt(state)?;
        let ideas = self
            .narrator
            .narrate(Some(DIVERSIFICATION_SYSTEM_PROMPT), &prompt)
            .await?;
        Ok(vec![StatePatch::Diversification(ideas)])
    }
}

/// Narrate a short warning for high-risk portfolios
pub struct WarningStep {
    narrator: Arc<dyn Narrator>,
}

impl WarningStep {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }
}

#[async_trait]
impl PipelineStep for WarningStep {
    fn name(&self) -> &'static str {
        "warning"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        // No risk info, nothing to warn about
        let Some(risk) = state.risk.as_ref().filter(|r| !r.factors.is_empty()) else {
            return Ok(Vec::new());
        };
        let prompt = build_warning_prompt(risk.level, &risk.factors);
        let warning = self.narrator.narrate(None, &prompt).await?;
        Ok(vec![StatePatch::Warning(warning)])
    }
}

/// Narrate the final explanation
pub struct ExplainStep {
    narrator: Arc<dyn Narrator>,
}

impl ExplainStep {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }
}

#[async_trait]
impl PipelineStep for ExplainStep {
    fn name(&self) -> &'static str {
        "explain"
    }

    async fn run(&self, state: &ExplainState) -> Result<Vec<StatePatch>> {
        let prompt = build_explainer_prompt(state)?;
        let explanation = self.narrator.narrate(None, &prompt).await?;
        Ok(vec![StatePatch::Explanation(explanation)])
    }
}
