//! Review curation pipeline entry point.
//!
//! Configuration comes from the environment (`.env` supported). The run
//! processes the full planned query batch, or a single query when one is
//! given on the command line or via `SEARCH_QUERY`. Per-item failures are
//! logged, not propagated: the process exits 0 on any completed run.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use curation::{
    build_extractor, FetchOrchestrator, GoogleSearcher, HttpArticleFetcher, PipelineConfig,
    PipelineDriver, RequestPacer, RunSummary, UrlCache,
};

#[derive(Parser)]
#[command(name = "shoecrawl", about = "Collect and consolidate running shoe reviews")]
struct Cli {
    /// Run a single search query instead of the planned batch
    /// (overrides SEARCH_QUERY).
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            // Credential problems are fatal at startup, before any work.
            eprintln!("{} {}", "configuration error:".red().bold(), err);
            std::process::exit(1);
        }
    };
    if cli.query.is_some() {
        config.single_query = cli.query;
    }

    println!("{}", "shoecrawl: review curation pipeline".bold());
    println!(
        "  provider: {}   results/query: {}   cache: {}",
        config.provider.provider_name().cyan(),
        config.results_per_query,
        config.cache_path.display()
    );

    let searcher = GoogleSearcher::new(
        config.google_api_key.clone(),
        config.google_engine_id.clone(),
    );
    let orchestrator = FetchOrchestrator::new(
        Arc::new(searcher),
        Arc::new(HttpArticleFetcher::new()),
        build_extractor(&config),
        RequestPacer::new(config.requests_per_second),
        config.results_per_query,
    );
    let cache = UrlCache::load(&config.cache_path);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, finishing current unit and flushing cache");
                cancel.cancel();
            }
        });
    }

    let driver = PipelineDriver::new(orchestrator, cache, &config, cancel);
    let (summary, products) = driver.run().await;

    print_summary(&summary, products.len());

    // Partial failures were logged above; completion is success.
    Ok(())
}

fn print_summary(summary: &RunSummary, products: usize) {
    println!();
    println!("{}", "run summary".bold());
    println!(
        "  queries:  {} processed / {} planned{}",
        summary.queries_processed,
        summary.queries_planned,
        if summary.cancelled {
            " (cancelled)".yellow().to_string()
        } else {
            String::new()
        }
    );
    println!("  records:  {}", summary.records);
    println!(
        "  cache:    {} hits, {} fresh extractions ({:.1}% saved)",
        summary.cache_hits,
        summary.fresh_extractions,
        summary.cache_hit_rate() * 100.0
    );
    println!("  failures: {}", summary.failures);
    println!("  products: {}", products.to_string().green());
}
