mod companies;
mod config;
mod error;
mod fetch;
mod metrics;
mod models;
mod normalize;
mod parser;
mod pipeline;
mod seed;
mod utils;

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::companies::{CompanyCatalog, COMPANY_ORDER};
use crate::config::AppConfig;
use crate::fetch::cache::SnapshotCache;
use crate::fetch::SheetsSource;
use crate::metrics::MetricsEngine;
use crate::models::{CompanyTicker, Snapshot};
use crate::normalize::normalize_ticker;
use crate::pipeline::{seed_snapshot, Pipeline};
use crate::utils::{fmt_billions, fmt_currency, fmt_pct};

#[derive(Parser)]
#[command(name = "findash-engine", about = "Quarterly disclosures dashboard engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Skip the live fetch and use the embedded seed dataset
    #[arg(long, global = true)]
    offline: bool,

    /// Companies to include (tickers or names, comma-separated; default: all)
    #[arg(short, long, global = true, value_delimiter = ',')]
    select: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Latest-quarter revenue and gross margins
    Report,

    /// Trailing-twelve-month revenue and net income ranking
    Ttm,

    /// Year-over-year growth and performance leaders
    Growth,

    /// Multi-year revenue matrix (last 3 years + current)
    Chart,

    /// List the tracked company universe
    Companies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "findash_engine=info,warn",
        1 => "findash_engine=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let catalog = CompanyCatalog;
    let selection = resolve_selection(&cli.select);

    if let Command::Companies = cli.command {
        println!("─────────────────────────────────────────────");
        for company in catalog.all() {
            println!("  {:<5} {:<22} {}", company.ticker, company.name, company.color);
        }
        println!("─────────────────────────────────────────────");
        return Ok(());
    }

    let snapshot = load_snapshot(&config, cli.offline).await?;
    let engine = MetricsEngine::new(&catalog);

    match cli.command {
        Command::Report => {
            let quarter = engine
                .latest_quarter(&snapshot.series)
                .unwrap_or_else(|| "—".into());
            println!("─────────────────────────────────────────────");
            println!("  Revenue — {} (source: {})", quarter, snapshot.origin);
            println!("─────────────────────────────────────────────");
            for row in engine.current_revenue(&snapshot.series, &selection) {
                println!(
                    "  {:<5} {:<10} {:>10}  {:>8} q/q",
                    row.ticker,
                    row.company.display_name,
                    fmt_currency(row.revenue),
                    fmt_pct(row.percentage_change),
                );
            }
            println!();
            println!("  Gross margins");
            for row in engine.gross_margin(&snapshot.series, &selection) {
                println!(
                    "  {:<5} {:<10} {:>9.1}%  ({})",
                    row.ticker, row.company.display_name, row.gross_margin, row.quarter
                );
            }
            println!("─────────────────────────────────────────────");
        }

        Command::Ttm => {
            println!("─────────────────────────────────────────────");
            println!("  Trailing twelve months (source: {})", snapshot.origin);
            println!("─────────────────────────────────────────────");
            for row in engine.ttm(&snapshot.series, &selection) {
                println!(
                    "  {:<5} revenue {:>11}  net income {:>10}  (through {})",
                    row.ticker,
                    fmt_currency(row.ttm_revenue),
                    fmt_currency(row.ttm_net_income),
                    row.latest_quarter,
                );
            }
            println!();
            println!("  Net income ranking");
            for (rank, row) in engine
                .net_income_ttm_ranking(&snapshot.series, &selection)
                .iter()
                .enumerate()
            {
                println!(
                    "  {:>2}. {:<5} {:>10}",
                    rank + 1,
                    row.ticker,
                    fmt_currency(row.net_income)
                );
            }
            println!("─────────────────────────────────────────────");
        }

        Command::Growth => {
            println!("─────────────────────────────────────────────");
            println!("  Year-over-year revenue growth (source: {})", snapshot.origin);
            println!("─────────────────────────────────────────────");
            for company in engine.yoy_growth(&snapshot.series, &selection) {
                if company.quarters.is_empty() {
                    println!("  {:<5} no comparable prior-year quarters", company.ticker);
                    continue;
                }
                let entries: Vec<String> = company
                    .quarters
                    .iter()
                    .map(|q| format!("{} {}", q.quarter, fmt_pct(q.growth)))
                    .collect();
                println!("  {:<5} {}", company.ticker, entries.join("  |  "));
            }

            let leaders = engine.performance_leaders(&snapshot.series, &selection);
            println!();
            match (&leaders.best, &leaders.worst) {
                (Some(best), Some(worst)) => {
                    println!(
                        "  Best : {} {} ({})",
                        best.ticker,
                        fmt_pct(best.growth),
                        best.quarter
                    );
                    println!(
                        "  Worst: {} {} ({})",
                        worst.ticker,
                        fmt_pct(worst.growth),
                        worst.quarter
                    );
                    println!("  Avg  : {}", fmt_pct(leaders.average));
                }
                _ => println!("  No company has a comparable prior-year quarter."),
            }
            println!("─────────────────────────────────────────────");
        }

        Command::Chart => {
            let current_year = Utc::now().year();
            let rows = engine.chart_series(&snapshot.series, &selection, current_year);

            let tickers: Vec<CompanyTicker> = rows
                .first()
                .map(|r| r.revenue.keys().copied().collect())
                .unwrap_or_default();

            print!("{:<9}", "Quarter");
            for ticker in &tickers {
                print!(" {:>8}", ticker);
            }
            println!();

            for row in &rows {
                print!("{:<9}", row.quarter);
                for ticker in &tickers {
                    print!(" {:>8}", fmt_billions(row.revenue[ticker]));
                }
                println!();
            }
        }

        // Handled before the snapshot load.
        Command::Companies => {}
    }

    Ok(())
}

/// Fetch or fall back per the configured pipeline; `--offline` goes straight
/// to the seed dataset.
async fn load_snapshot(config: &AppConfig, offline: bool) -> Result<Snapshot> {
    if offline {
        return seed_snapshot();
    }

    let _t = utils::Timer::start("Snapshot load");
    let source = SheetsSource::new(&config.sheets, &config.client)?;
    let pipeline = Pipeline::new(source);
    let mut cache = SnapshotCache::new(Duration::from_secs(config.cache.ttl_secs));
    pipeline.load(&mut cache).await
}

/// Map free-form `--select` entries onto the closed ticker set; unrecognized
/// entries are skipped with a warning, duplicates collapse.
fn resolve_selection(raw: &[String]) -> Vec<CompanyTicker> {
    if raw.is_empty() {
        return COMPANY_ORDER.to_vec();
    }

    let mut selection = Vec::new();
    for item in raw {
        match normalize_ticker(item) {
            Some(ticker) => {
                if !selection.contains(&ticker) {
                    selection.push(ticker);
                }
            }
            None => warn!("Unrecognized company {:?} — skipped", item),
        }
    }
    selection
}
