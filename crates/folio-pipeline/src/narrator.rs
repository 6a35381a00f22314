//! Narrator seam for LLM-backed pipeline steps
//!
//! LLM clients are injected through this trait instead of living as
//! module-global singletons. The crate ships one deterministic
//! implementation for offline runs and tests.

use async_trait::async_trait;
use folio_core::Result;

/// Capability: turn a prompt into narrative text
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Produce narrative text for a prompt, with an optional system preamble
    async fn narrate(&self, system: Option<&str>, prompt: &str) -> Result<String>;
}

/// Deterministic narrator that echoes a bounded excerpt of its prompt
///
/// Used when no LLM is configured: the pipeline still completes and the
/// narrative sections carry the factual digest the prompt embeds, unstyled.
#[derive(Debug, Clone, Default)]
pub struct TemplateNarrator {
    /// Cap on returned characters, 0 meaning no cap
    pub max_chars: usize,
}

impl TemplateNarrator {
    pub fn new() -> Self {
        Self { max_chars: 0 }
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    async fn narrate(&self, _system: Option<&str>, prompt: &str) -> Result<String> {
        let text = prompt.trim();
        if self.max_chars > 0 && text.len() > self.max_chars {
            let mut end = self.max_chars;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            return Ok(text[..end].to_string());
        }
        Ok(text.to_string())
    }
}
