//! Command-line interface for folio-rs portfolio analysis

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use folio_core::{DiffOptions, Holding, PortfolioStats, compute_stats, render_diff_section};
use folio_market::{
    FetchConfig, FetchWindow, MarketConfig, NewsArticle, NewsProvider, PolygonClient,
    PriceProvider,
};
use folio_pipeline::{ExplainState, PipelineRunner, TemplateNarrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio analysis: stats, diff, risk, and research evidence", long_about = None)]
struct Args {
    /// Path to a JSON file with the current holdings (array of holdings)
    #[arg(long)]
    holdings: PathBuf,

    /// Path to a JSON file with the previous snapshot's holdings, for diffing
    #[arg(long)]
    prev: Option<PathBuf>,

    /// Refresh prices from Polygon before computing stats (needs POLYGON_API_KEY)
    #[arg(long)]
    live_prices: bool,

    /// Fetch news evidence from Polygon (needs POLYGON_API_KEY)
    #[arg(long)]
    fetch_news: bool,

    /// Minimum absolute weight delta for the diff, as a fraction
    #[arg(long, default_value_t = 0.02)]
    threshold: f64,

    /// Maximum number of weight changes in the diff
    #[arg(long, default_value_t = 5)]
    top_n: usize,
}

/// Offline price provider: keeps every existing price
struct NullPrices;

#[async_trait]
impl PriceProvider for NullPrices {
    async fn prev_close(&self, _symbol: &str) -> folio_market::Result<Option<f64>> {
        Ok(None)
    }
}

/// Offline news provider: returns no articles
struct NullNews;

#[async_trait]
impl NewsProvider for NullNews {
    async fn fetch_news(
        &self,
        _symbol: &str,
        _window: FetchWindow,
    ) -> folio_market::Result<Vec<NewsArticle>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "offline"
    }
}

fn load_holdings(path: &Path) -> anyhow::Result<Vec<Holding>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn render_stats(stats: &PortfolioStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total value: {:.2}\n", stats.total_value));
    out.push_str(&format!(
        "Concentration: top1 {:.1}%, top3 {:.1}%\n",
        stats.concentration_top1 * 100.0,
        stats.concentration_top3 * 100.0
    ));
    out.push_str("Positions by weight:\n");
    for row in &stats.by_symbol {
        out.push_str(&format!(
            "  {:<8} {:>12.2}  {:>5.1}%  {}\n",
            row.symbol,
            row.value,
            row.weight * 100.0,
            row.asset_class.as_deref().unwrap_or("UNKNOWN")
        ));
    }
    out.push_str("Asset classes:\n");
    for row in &stats.by_asset_class {
        out.push_str(&format!(
            "  {:<16} {:>12.2}  {:>5.1}%\n",
            row.asset_class,
            row.value,
            row.weight * 100.0
        ));
    }
    out
}

fn render_report(state: &ExplainState) -> String {
    let mut report = String::new();

    report.push_str("# Portfolio Analysis\n\n");
    if let Some(stats) = &state.stats {
        report.push_str(&render_stats(stats));
        report.push('\n');
    }

    report.push_str("## Changes Since Last Snapshot\n");
    report.push_str(&render_diff_section(state.portfolio_diff.as_ref()));
    report.push_str("\n\n");

    if let Some(risk) = &state.risk {
        report.push_str(&format!("## Risk: {:?}\n", risk.level));
        for factor in &risk.factors {
            report.push_str(&format!("- {factor}\n"));
        }
        report.push('\n');
    }

    if !state.diversifier_candidates.is_empty() {
        report.push_str("## Diversifier Candidates\n");
        for candidate in &state.diversifier_candidates {
            report.push_str(&format!(
                "- {} ({:?}): {}\n",
                candidate.ticker, candidate.category, candidate.rationale
            ));
        }
        report.push('\n');
    }

    if let Some(bundle) = &state.evidence {
        report.push_str(&format!(
            "## Evidence ({} articles, {} errors)\n",
            bundle.meta.total_articles,
            bundle.meta.errors.len()
        ));
        for error in &bundle.meta.errors {
            report.push_str(&format!("- {}: {}\n", error.symbol, error.message));
        }
        report.push('\n');
    }

    if let Some(warning) = &state.warning {
        report.push_str("## Warning\n");
        report.push_str(warning);
        report.push_str("\n\n");
    }

    if let Some(explanation) = &state.explanation {
        report.push_str("## Explanation\n");
        report.push_str(explanation);
        report.push('\n');
    }

    report
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio_utils::init_tracing();

    let args = Args::parse();
    let config = folio_utils::Config::from_env();

    let holdings = load_holdings(&args.holdings)?;
    let prev_stats = args
        .prev
        .as_ref()
        .map(|path| -> anyhow::Result<_> {
            let prev_holdings = load_holdings(path)?;
            Ok(compute_stats(&prev_holdings)?)
        })
        .transpose()?;

    let needs_polygon = args.live_prices || args.fetch_news;
    let polygon = match (&config.polygon_api_key, needs_polygon) {
        (Some(key), true) => Some(Arc::new(PolygonClient::new(
            key.clone(),
            &MarketConfig {
                rate_limit_per_minute: config.polygon_rate_limit,
                request_timeout: Duration::from_secs(config.request_timeout_secs),
            },
        )?)),
        (None, true) => {
            anyhow::bail!("--live-prices/--fetch-news require POLYGON_API_KEY to be set")
        }
        _ => None,
    };

    let mut builder = PipelineRunner::builder()
        .narrator(Arc::new(TemplateNarrator::new()))
        .diff_options(DiffOptions {
            threshold: args.threshold,
            top_n: args.top_n,
        })
        .fetch_config(FetchConfig::default());

    builder = match &polygon {
        Some(client) if args.live_prices => {
            let provider: Arc<dyn PriceProvider> = client.clone();
            builder.price_provider(provider)
        }
        _ => builder.price_provider(Arc::new(NullPrices)),
    };
    builder = match &polygon {
        Some(client) if args.fetch_news => {
            let provider: Arc<dyn NewsProvider> = client.clone();
            builder.news_provider(provider)
        }
        _ => builder.news_provider(Arc::new(NullNews)),
    };

    let runner = builder.build()?;

    let mut state = ExplainState::new(holdings, prev_stats);
    state.use_live_prices = args.live_prices;

    info!(environment = %config.environment, "starting analysis run");
    let result = runner.run(state).await?;

    println!("{}", render_report(&result));
    Ok(())
}
