//! Snapshot diffing
//!
//! `diff_from_stats` compares two portfolio statistics snapshots and produces
//! a bounded, ranked diff: symbols added or removed, and the largest weight
//! moves. An absent previous snapshot is a valid input and yields the
//! canonical "first snapshot" diff, distinct from "no changes detected".

use crate::error::{Error, Result};
use crate::holding::normalize_symbol;
use crate::stats::PortfolioStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default minimum absolute weight delta to report (2 percentage points)
pub const DEFAULT_THRESHOLD: f64 = 0.02;

/// Default maximum number of weight changes to report
pub const DEFAULT_TOP_N: usize = 5;

/// Caller-overridable diff parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    /// Minimum `|delta|` for a weight change to be included
    pub threshold: f64,
    /// Maximum number of weight changes, after ranking
    pub top_n: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DiffOptions {
    /// Reject invalid parameters before any computation
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::Config(format!(
                "diff threshold must be finite and non-negative, got {}",
                self.threshold
            )));
        }
        if self.top_n == 0 {
            return Err(Error::Config("diff topN must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// One symbol's weight movement between snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightChange {
    pub symbol: String,
    pub prev_weight: f64,
    pub next_weight: f64,
    /// `next_weight - prev_weight`
    pub delta: f64,
}

/// Parameters the diff was computed with, recorded for auditability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMeta {
    pub threshold: f64,
    pub top_n: usize,
}

/// Diff between two portfolio snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDiff {
    /// Symbols present only in the next snapshot, sorted lexicographically
    pub added: Vec<String>,
    /// Symbols present only in the previous snapshot, sorted lexicographically
    pub removed: Vec<String>,
    /// Ranked by `|delta|` descending, at most `meta.top_n` entries
    pub weight_changes: Vec<WeightChange>,
    pub meta: DiffMeta,
}

impl PortfolioDiff {
    /// Whether the diff carries no changes at all
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.weight_changes.is_empty()
    }
}

fn weight_map(stats: &PortfolioStats) -> BTreeMap<String, f64> {
    stats
        .by_symbol
        .iter()
        .map(|s| (normalize_symbol(&s.symbol), s.weight))
        .collect()
}

/// Compute the diff between an optional previous snapshot and the current one
///
/// Symbol identity uses normalized symbols. Weight changes are computed over
/// the union of both snapshots with absent weights defaulting to zero, so a
/// fully added or removed symbol still shows up when its delta clears the
/// threshold. Ties on `|delta|` break by symbol so truncation is reproducible.
pub fn diff_from_stats(
    prev: Option<&PortfolioStats>,
    next: &PortfolioStats,
    options: &DiffOptions,
) -> Result<PortfolioDiff> {
    options.validate()?;
    let meta = DiffMeta {
        threshold: options.threshold,
        top_n: options.top_n,
    };

    // No previous snapshot means there is no change to compute; the renderer
    // distinguishes this from an empty diff via the Option, not the payload.
    let Some(prev) = prev else {
        return Ok(PortfolioDiff {
            added: Vec::new(),
            removed: Vec::new(),
            weight_changes: Vec::new(),
            meta,
        });
    };

    let prev_map = weight_map(prev);
    let next_map = weight_map(next);

    let added: Vec<String> = next_map
        .keys()
        .filter(|s| !prev_map.contains_key(*s))
        .cloned()
        .collect();
    let removed: Vec<String> = prev_map
        .keys()
        .filter(|s| !next_map.contains_key(*s))
        .cloned()
        .collect();
    // BTreeMap iteration is already lexicographic, so added/removed are sorted.

    let mut union: Vec<&String> = prev_map.keys().chain(next_map.keys()).collect();
    union.sort();
    union.dedup();

    let mut weight_changes: Vec<WeightChange> = union
        .into_iter()
        .filter_map(|symbol| {
            let prev_weight = prev_map.get(symbol).copied().unwrap_or(0.0);
            let next_weight = next_map.get(symbol).copied().unwrap_or(0.0);
            let delta = next_weight - prev_weight;
            (delta.abs() >= options.threshold).then(|| WeightChange {
                symbol: symbol.clone(),
                prev_weight,
                next_weight,
                delta,
            })
        })
        .collect();

    weight_changes.sort_by(|a, b| {
        b.delta
            .abs()
            .total_cmp(&a.delta.abs())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    weight_changes.truncate(options.top_n);

    Ok(PortfolioDiff {
        added,
        removed,
        weight_changes,
        meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holding::Holding;
    use crate::stats::compute_stats;

    fn stats_of(holdings: &[Holding]) -> PortfolioStats {
        compute_stats(holdings).expect("stats")
    }

    #[test]
    fn test_invalid_options_rejected() {
        let stats = stats_of(&[Holding::new("AAPL", 1.0, 100.0)]);
        let bad_threshold = DiffOptions {
            threshold: f64::NAN,
            top_n: 5,
        };
        assert!(diff_from_stats(None, &stats, &bad_threshold).is_err());
        let bad_top_n = DiffOptions {
            threshold: 0.02,
            top_n: 0,
        };
        assert!(diff_from_stats(None, &stats, &bad_top_n).is_err());
    }

    #[test]
    fn test_absent_prev_yields_empty_diff_with_meta() {
        let stats = stats_of(&[Holding::new("AAPL", 1.0, 100.0)]);
        let options = DiffOptions {
            threshold: 0.05,
            top_n: 3,
        };
        let diff = diff_from_stats(None, &stats, &options).expect("diff");
        assert!(diff.is_empty());
        assert_eq!(diff.meta.threshold, 0.05);
        assert_eq!(diff.meta.top_n, 3);
    }

    #[test]
    fn test_identical_snapshots_yield_no_changes() {
        let stats = stats_of(&[
            Holding::new("AAPL", 10.0, 100.0),
            Holding::new("MSFT", 5.0, 200.0),
        ]);
        let diff = diff_from_stats(Some(&stats), &stats, &DiffOptions::default()).expect("diff");
        assert!(diff.is_empty());
    }

    #[test]
    fn test_added_and_weight_changes() {
        let prev = stats_of(&[Holding::new("AAPL", 1.0, 100.0)]);
        let next = stats_of(&[
            Holding::new("AAPL", 10.0, 100.0),
            Holding::new("MSFT", 5.0, 200.0),
        ]);
        let diff = diff_from_stats(Some(&prev), &next, &DiffOptions::default()).expect("diff");
        assert_eq!(diff.added, vec!["MSFT"]);
        assert!(diff.removed.is_empty());

        // AAPL went 1.0 -> 0.5, MSFT 0 -> 0.5; both clear the 0.02 threshold
        assert_eq!(diff.weight_changes.len(), 2);
        let aapl = diff
            .weight_changes
            .iter()
            .find(|c| c.symbol == "AAPL")
            .expect("AAPL change");
        assert!((aapl.delta + 0.5).abs() < 1e-12);
        let msft = diff
            .weight_changes
            .iter()
            .find(|c| c.symbol == "MSFT")
            .expect("MSFT change");
        assert_eq!(msft.prev_weight, 0.0);
        assert!((msft.delta - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_removed_symbols_sorted() {
        let prev = stats_of(&[
            Holding::new("ZM", 1.0, 100.0),
            Holding::new("AAPL", 1.0, 100.0),
            Holding::new("MSFT", 1.0, 100.0),
        ]);
        let next = stats_of(&[Holding::new("MSFT", 1.0, 100.0)]);
        let diff = diff_from_stats(Some(&prev), &next, &DiffOptions::default()).expect("diff");
        assert_eq!(diff.removed, vec!["AAPL", "ZM"]);
    }

    #[test]
    fn test_symbols_normalized_for_identity() {
        let prev = stats_of(&[Holding::new(" aapl ", 1.0, 100.0)]);
        let next = stats_of(&[Holding::new("AAPL", 1.0, 100.0)]);
        let diff = diff_from_stats(Some(&prev), &next, &DiffOptions::default()).expect("diff");
        assert!(diff.is_empty());
    }

    #[test]
    fn test_threshold_filters_small_moves() {
        let prev = stats_of(&[
            Holding::new("AAPL", 50.0, 1.0),
            Holding::new("MSFT", 50.0, 1.0),
        ]);
        let next = stats_of(&[
            Holding::new("AAPL", 50.5, 1.0),
            Holding::new("MSFT", 49.5, 1.0),
        ]);
        let diff = diff_from_stats(Some(&prev), &next, &DiffOptions::default()).expect("diff");
        // Each weight moved by 0.5pp, under the 2pp default threshold
        assert!(diff.weight_changes.is_empty());
    }

    #[test]
    fn test_top_n_truncation_and_bounds() {
        let prev = stats_of(&[Holding::new("ONLY", 1.0, 100.0)]);
        let next = stats_of(&[
            Holding::new("A", 5.0, 10.0),
            Holding::new("B", 4.0, 10.0),
            Holding::new("C", 3.0, 10.0),
            Holding::new("D", 2.0, 10.0),
            Holding::new("E", 1.0, 10.0),
        ]);
        let options = DiffOptions {
            threshold: 0.02,
            top_n: 3,
        };
        let diff = diff_from_stats(Some(&prev), &next, &options).expect("diff");
        assert!(diff.weight_changes.len() <= 3);
        assert!(
            diff.weight_changes
                .iter()
                .all(|c| c.delta.abs() >= options.threshold)
        );
        // Ranked by |delta| descending: ONLY (-1.0) first
        assert_eq!(diff.weight_changes[0].symbol, "ONLY");
    }
}
