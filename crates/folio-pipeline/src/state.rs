//! Pipeline state, patches, and the stage machine

use folio_core::{
    DiversifierCandidate, Holding, PortfolioDiff, PortfolioStats, RiskAssessment, RiskLevel,
    SymbolScope,
};
use folio_market::EvidenceBundle;
use serde::{Deserialize, Serialize};

use crate::brief::ResearchBrief;

/// Accumulated state of one analysis run
///
/// Steps never mutate this directly; they return [`StatePatch`] values the
/// runner applies between stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainState {
    pub holdings: Vec<Holding>,
    pub use_live_prices: bool,
    /// Stats of the previous snapshot, for diffing; absent on the first run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_stats: Option<PortfolioStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PortfolioStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_diff: Option<PortfolioDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diversifier_candidates: Vec<DiversifierCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<SymbolScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EvidenceBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_brief: Option<ResearchBrief>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversification_ideas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ExplainState {
    /// Start a run from holdings and an optional previous snapshot
    pub fn new(holdings: Vec<Holding>, prev_stats: Option<PortfolioStats>) -> Self {
        Self {
            holdings,
            prev_stats,
            ..Self::default()
        }
    }

    /// Risk level, defaulting to Low before assessment has run
    pub fn risk_level(&self) -> RiskLevel {
        self.risk.as_ref().map_or(RiskLevel::Low, |r| r.level)
    }

    /// Merge one patch into the state
    pub fn apply(&mut self, patch: StatePatch) {
        match patch {
            StatePatch::Holdings(holdings) => self.holdings = holdings,
            StatePatch::Stats { stats, diff } => {
                self.stats = Some(stats);
                self.portfolio_diff = diff;
            }
            StatePatch::Risk(risk) => self.risk = Some(risk),
            StatePatch::Candidates(candidates) => self.diversifier_candidates = candidates,
            StatePatch::Evidence {
                scope,
                bundle,
                brief,
            } => {
                self.scope = Some(scope);
                self.evidence = Some(bundle);
                self.research_brief = Some(brief);
            }
            StatePatch::Diversification(text) => self.diversification_ideas = Some(text),
            StatePatch::Warning(text) => self.warning = Some(text),
            StatePatch::Explanation(text) => self.explanation = Some(text),
        }
    }
}

/// One step's contribution to the state
///
/// A sum type instead of spread-merging whole states: each variant names
/// exactly the fields its step is allowed to touch.
#[derive(Debug, Clone)]
pub enum StatePatch {
    Holdings(Vec<Holding>),
    Stats {
        stats: PortfolioStats,
        diff: Option<PortfolioDiff>,
    },
    Risk(RiskAssessment),
    Candidates(Vec<DiversifierCandidate>),
    Evidence {
        scope: SymbolScope,
        bundle: EvidenceBundle,
        brief: ResearchBrief,
    },
    Diversification(String),
    Warning(String),
    Explanation(String),
}

/// Stages of the explainer pipeline
///
/// Linear except for one conditional transition: the warning stage runs only
/// when the assessed risk is High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    PriceUpdate,
    Stats,
    Risk,
    Candidates,
    Evidence,
    Diversify,
    Warning,
    Explain,
    Done,
}

impl Stage {
    /// First stage of a run
    pub fn start() -> Self {
        Stage::PriceUpdate
    }

    /// The stage that follows, given the state after this stage ran
    pub fn next(self, state: &ExplainState) -> Stage {
        match self {
            Stage::PriceUpdate => Stage::Stats,
            Stage::Stats => Stage::Risk,
            Stage::Risk => Stage::Candidates,
            Stage::Candidates => Stage::Evidence,
            Stage::Evidence => Stage::Diversify,
            Stage::Diversify => {
                if state.risk_level() == RiskLevel::High {
                    Stage::Warning
                } else {
                    Stage::Explain
                }
            }
            Stage::Warning => Stage::Explain,
            Stage::Explain | Stage::Done => Stage::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::compute_stats;

    fn state_with_risk(level: RiskLevel) -> ExplainState {
        let mut state = ExplainState::default();
        state.apply(StatePatch::Risk(RiskAssessment {
            level,
            factors: Vec::new(),
        }));
        state
    }

    #[test]
    fn test_linear_transitions() {
        let state = ExplainState::default();
        assert_eq!(Stage::start(), Stage::PriceUpdate);
        assert_eq!(Stage::PriceUpdate.next(&state), Stage::Stats);
        assert_eq!(Stage::Stats.next(&state), Stage::Risk);
        assert_eq!(Stage::Risk.next(&state), Stage::Candidates);
        assert_eq!(Stage::Candidates.next(&state), Stage::Evidence);
        assert_eq!(Stage::Evidence.next(&state), Stage::Diversify);
        assert_eq!(Stage::Explain.next(&state), Stage::Done);
        assert_eq!(Stage::Done.next(&state), Stage::Done);
    }

    #[test]
    fn test_warning_branch_only_when_high() {
        assert_eq!(
            Stage::Diversify.next(&state_with_risk(RiskLevel::High)),
            Stage::Warning
        );
        assert_eq!(
            Stage::Diversify.next(&state_with_risk(RiskLevel::Medium)),
            Stage::Explain
        );
        assert_eq!(
            Stage::Diversify.next(&state_with_risk(RiskLevel::Low)),
            Stage::Explain
        );
        assert_eq!(
            Stage::Warning.next(&state_with_risk(RiskLevel::High)),
            Stage::Explain
        );
    }

    #[test]
    fn test_apply_stats_patch() {
        let holdings = vec![Holding::new("AAPL", 10.0, 100.0)];
        let stats = compute_stats(&holdings).expect("stats");
        let mut state = ExplainState::new(holdings, None);
        state.apply(StatePatch::Stats {
            stats: stats.clone(),
            diff: None,
        });
        assert_eq!(state.stats, Some(stats));
        assert!(state.portfolio_diff.is_none());
    }

    #[test]
    fn test_risk_level_defaults_to_low() {
        assert_eq!(ExplainState::default().risk_level(), RiskLevel::Low);
    }
}
