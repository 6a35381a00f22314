//! Portfolio domain model and deterministic analytics for folio-rs
//!
//! This crate holds the pure, side-effect-free core: portfolio statistics,
//! snapshot diffing, rule-based risk assessment, and research-scope selection.
//! Nothing here performs I/O; everything is deterministic given its inputs.

pub mod diff;
pub mod error;
pub mod holding;
pub mod render;
pub mod risk;
pub mod scope;
pub mod stats;

pub use diff::{DiffMeta, DiffOptions, PortfolioDiff, WeightChange, diff_from_stats};
pub use error::{Error, Result};
pub use holding::{Holding, normalize_symbol};
pub use render::render_diff_section;
pub use risk::{RiskAssessment, RiskLevel, assess_risk};
pub use scope::{DiversifierCandidate, DiversifierCategory, SymbolScope, compute_scope, diversifier_candidates};
pub use stats::{AssetClassStat, PortfolioStats, SymbolStat, compute_stats};
