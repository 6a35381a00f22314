//! Deterministic textual digest of a portfolio diff
//!
//! Downstream narrative consumers rely on the two sentinel strings to tell
//! "no prior snapshot" apart from "diff computed but empty"; without that
//! distinction an LLM prompt can hallucinate nonexistent history.

use crate::diff::PortfolioDiff;

/// Emitted when there is no previous snapshot to compare against
pub const NO_PRIOR_SNAPSHOT: &str = "No prior snapshot to compare.";

/// Emitted when a diff was computed but nothing cleared the threshold
pub const NO_MATERIAL_CHANGES: &str = "No material changes since the last snapshot.";

fn fmt_pct(x: f64) -> String {
    format!("{}%", (x * 100.0).round() as i64)
}

/// Render a diff as a short plain-text section
///
/// Up to 5 added/removed symbols per line and up to 5 weight-change bullets of
/// the form `SYM: P1% → P2% (+/-D%)`, percentages rounded to the nearest
/// integer with an explicit sign on non-negative deltas.
pub fn render_diff_section(diff: Option<&PortfolioDiff>) -> String {
    let Some(diff) = diff else {
        return NO_PRIOR_SNAPSHOT.to_string();
    };

    let mut lines: Vec<String> = Vec::new();

    if !diff.added.is_empty() {
        let added: Vec<&str> = diff.added.iter().take(5).map(String::as_str).collect();
        lines.push(format!("- Added: {}", added.join(", ")));
    }
    if !diff.removed.is_empty() {
        let removed: Vec<&str> = diff.removed.iter().take(5).map(String::as_str).collect();
        lines.push(format!("- Removed: {}", removed.join(", ")));
    }

    if !diff.weight_changes.is_empty() {
        lines.push("- Biggest allocation moves:".to_string());
        for change in diff.weight_changes.iter().take(5) {
            let sign = if change.delta >= 0.0 { "+" } else { "" };
            lines.push(format!(
                "  • {}: {} → {} ({}{})",
                change.symbol,
                fmt_pct(change.prev_weight),
                fmt_pct(change.next_weight),
                sign,
                fmt_pct(change.delta)
            ));
        }
    }

    if lines.is_empty() {
        return NO_MATERIAL_CHANGES.to_string();
    }

    lines.join("\n")
}
