//! Prompt builders for the LLM-backed steps
//!
//! Prompts embed only computed facts: the diff digest, the stats JSON, and
//! the risk assessment. The diff section's sentinel strings are what keep the
//! model from inventing history on a first run.

use crate::state::ExplainState;
use folio_core::{Error, Result, RiskLevel, render_diff_section};

fn risk_level_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "LOW",
        RiskLevel::Medium => "MEDIUM",
        RiskLevel::High => "HIGH",
    }
}

/// Build the main explainer prompt
pub fn build_explainer_prompt(state: &ExplainState) -> Result<String> {
    let stats = state.stats.as_ref().ok_or(Error::MissingInput("stats"))?;
    let stats_json = serde_json::to_string_pretty(stats)
        .map_err(|e| Error::Other(format!("failed to serialize stats: {e}")))?;

    let diff_section = render_diff_section(state.portfolio_diff.as_ref());
    let risk_level = state
        .risk
        .as_ref()
        .map_or("UNKNOWN", |r| risk_level_label(r.level));
    let risk_factors = state.risk.as_ref().map_or_else(
        || "None detected".to_string(),
        |r| {
            if r.factors.is_empty() {
                "None detected".to_string()
            } else {
                r.factors.join("; ")
            }
        },
    );

    Ok(format!(
        "You are a portfolio analysis assistant.\n\
         \n\
         Your role is to EDUCATE the user about their portfolio's structure, risks, and diversification concepts.\n\
         You are NOT a financial advisor and you must NOT give direct investment instructions.\n\
         \n\
         CHANGES SINCE LAST SNAPSHOT\n\
         {diff_section}\n\
         \n\
         Rules for using this section:\n\
         - If it says \"No prior snapshot to compare\", do NOT reference past changes.\n\
         - Only mention changes explicitly listed above.\n\
         - Do NOT invent or assume any changes.\n\
         \n\
         PORTFOLIO STATS (FACTUAL DATA)\n\
         {stats_json}\n\
         \n\
         RISK EVALUATION\n\
         - Risk Level: {risk_level}\n\
         - Risk Factors: {risk_factors}\n\
         \n\
         HARD CONSTRAINTS (IMPORTANT)\n\
         - Do NOT use words like \"buy\", \"sell\", \"allocate X%\", \"should buy\", or \"must\".\n\
         - Do NOT give timing advice or price targets.\n\
         - Do NOT provide specific trade instructions.\n\
         - Use neutral, educational language such as:\n\
           \"consider exploring\", \"examples include\", \"can provide exposure to\".\n\
         - Limit example tickers to a MAXIMUM of 5 total.\n\
         - Do NOT repeat raw JSON or restate numbers unnecessarily.\n\
         \n\
         YOUR TASK\n\
         Write your response in EXACTLY 3 sections, using clear headings:\n\
         \n\
         1) **Portfolio Overview**\n\
            - Describe concentration, diversification, and asset allocation.\n\
            - Reference top positions and major asset classes.\n\
            - If relevant, briefly mention notable changes since the last snapshot.\n\
         \n\
         2) **Risk Assessment**\n\
            - Explain the main risk factors in plain English.\n\
            - Connect risks to concentration, asset mix, or recent changes.\n\
            - Keep this understandable to a non-expert.\n\
         \n\
         3) **Scenario-Based Diversification Ideas**\n\
            - Suggestions MUST depend on the risk level.\n\
            - Each idea should include a category, a short explanation of WHY it helps,\n\
              and 1-2 example tickers.\n\
            - Keep ideas conceptual and educational."
    ))
}

/// Build the high-risk warning prompt
///
/// Only meaningful when a risk assessment with factors exists; callers skip
/// the warning step otherwise.
pub fn build_warning_prompt(level: RiskLevel, factors: &[String]) -> String {
    let factor_lines = factors
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a cautious portfolio risk explainer.\n\
         \n\
         The portfolio has riskLevel: {}.\n\
         Risk factors:\n\
         {factor_lines}\n\
         \n\
         Write a short, direct warning in 2-3 sentences:\n\
         - Explain why these factors might be risky in practical terms.\n\
         - Do NOT give specific trade instructions.\n\
         - Talk like you're explaining to a smart friend who doesn't know finance jargon.",
        risk_level_label(level)
    )
}

/// System preamble for the diversification step
pub const DIVERSIFICATION_SYSTEM_PROMPT: &str =
    "You are a portfolio diversification analyst. Follow these rules:\n\
     1. NEVER give direct buy/sell instructions\n\
     2. Suggest educational scenarios and example tickers\n\
     3. Tailor suggestions to risk level (HIGH/MEDIUM/LOW)\n\
     4. Keep output to 6-10 bullets max\n\
     5. Use markdown with clear headings";

/// Build the diversification-ideas user prompt
pub fn build_diversification_prompt(state: &ExplainState) -> Result<String> {
    let stats = state.stats.as_ref().ok_or(Error::MissingInput("stats"))?;
    let stats_json = serde_json::to_string_pretty(stats)
        .map_err(|e| Error::Other(format!("failed to serialize stats: {e}")))?;

    let risk_level = state
        .risk
        .as_ref()
        .map_or("UNKNOWN", |r| risk_level_label(r.level));
    let risk_factors = state
        .risk
        .as_ref()
        .filter(|r| !r.factors.is_empty())
        .map_or_else(|| "none".to_string(), |r| r.factors.join("; "));

    Ok(format!(
        "Risk Level: {risk_level}\n\
         Risk Factors: {risk_factors}\n\
         \n\
         Portfolio Stats:\n\
         ```json\n\
         {stats_json}\n\
         ```\n\
         \n\
         Provide diversification ideas in markdown with these sections:\n\
         ## Reduce Concentration\n\
         ## Add Defensive Balance\n\
         ## Diversify by Region/Factor\n\
         ## Optional Growth Satellites (if appropriate)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Holding, RiskAssessment, compute_stats};

    fn base_state() -> ExplainState {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 100.0).with_asset_class("STOCK"),
            Holding::new("MSFT", 5.0, 200.0).with_asset_class("STOCK"),
        ];
        let stats = compute_stats(&holdings).expect("stats");
        let mut state = ExplainState::new(holdings, None);
        state.stats = Some(stats);
        state
    }

    #[test]
    fn test_explainer_prompt_requires_stats() {
        let state = ExplainState::default();
        assert!(build_explainer_prompt(&state).is_err());
    }

    #[test]
    fn test_explainer_prompt_embeds_sentinel_without_prior() {
        let prompt = build_explainer_prompt(&base_state()).expect("prompt");
        assert!(prompt.contains("No prior snapshot to compare."));
        assert!(prompt.contains("Risk Level: UNKNOWN"));
        assert!(prompt.contains("\"totalValue\": 2000.0"));
    }

    #[test]
    fn test_warning_prompt_lists_factors() {
        let factors = vec!["Top position is more than 20% of the portfolio.".to_string()];
        let prompt = build_warning_prompt(RiskLevel::High, &factors);
        assert!(prompt.contains("riskLevel: HIGH"));
        assert!(prompt.contains("- Top position is more than 20%"));
    }

    #[test]
    fn test_diversification_prompt_embeds_risk() {
        let mut state = base_state();
        state.risk = Some(RiskAssessment {
            level: RiskLevel::Medium,
            factors: vec!["factor".to_string()],
        });
        let prompt = build_diversification_prompt(&state).expect("prompt");
        assert!(prompt.contains("Risk Level: MEDIUM"));
        assert!(prompt.contains("## Reduce Concentration"));
    }
}
