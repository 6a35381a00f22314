//! Portfolio explainer pipeline for folio-rs
//!
//! Models the analysis run as an explicit state machine: each stage runs one
//! step, each step reads the immutable [`state::ExplainState`] and returns
//! [`state::StatePatch`] values that the runner merges. LLM-backed steps go
//! through the injected [`narrator::Narrator`] seam, so the pipeline itself
//! stays deterministic and testable.

pub mod brief;
pub mod narrator;
pub mod prompt;
pub mod runner;
pub mod state;
pub mod steps;

pub use brief::{BriefScope, Citation, Confidence, ResearchBrief, Sentiment, SymbolBrief};
pub use narrator::{Narrator, TemplateNarrator};
pub use runner::{PipelineRunner, PipelineRunnerBuilder};
pub use state::{ExplainState, Stage, StatePatch};
pub use steps::PipelineStep;
