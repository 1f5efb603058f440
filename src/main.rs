//! Harvestman main entry point
//!
//! Command-line interface for the harvestman breadth-first page harvester.

use clap::Parser;
use harvestman::config::{load_config_with_hash, CrawlConfig};
use harvestman::crawler::{CrawlEvent, Scheduler};
use harvestman::output::{print_summary, write_markdown_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Harvestman: a polite breadth-first page harvester
///
/// Crawls a website from a seed URL, extracting page metadata while
/// respecting robots.txt, rate limits, and domain filters.
#[derive(Parser, Debug)]
#[command(name = "harvestman")]
#[command(version)]
#[command(about = "A polite breadth-first page harvester", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write a markdown report of the crawl to this path
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Override the configured maximum crawl depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override the configured maximum page count
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => CrawlConfig::default(),
    };

    // CLI flags win over the file
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }

    if cli.dry_run {
        handle_dry_run(&cli.seed, &config);
        return Ok(());
    }

    handle_crawl(&cli.seed, config, cli.report.as_deref()).await
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvestman=info,warn"),
            1 => EnvFilter::new("harvestman=debug,info"),
            2 => EnvFilter::new("harvestman=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the effective configuration and exits
fn handle_dry_run(seed: &str, config: &CrawlConfig) {
    println!("=== Harvestman Dry Run ===\n");

    println!("Seed URL: {}", seed);

    println!("\nCrawl Configuration:");
    println!("  Max depth: {}", config.max_depth);
    println!("  Max pages: {}", config.max_pages);
    println!("  Max concurrency: {}", config.max_concurrency);
    println!("  Batch delay: {}ms", config.delay_ms);
    println!("  Request timeout: {}ms", config.timeout_ms);
    println!("  Follow external links: {}", config.follow_external_links);
    println!("  Respect robots.txt: {}", config.respect_robots_txt);
    println!("  Max retries: {}", config.max_retries);
    println!("  User agent: {}", config.user_agent);

    if !config.allowed_domains.is_empty() {
        println!("\nAllowed Domains ({}):", config.allowed_domains.len());
        for domain in &config.allowed_domains {
            println!("  - {}", domain);
        }
    }

    if !config.exclude_patterns.is_empty() {
        println!("\nExclude Patterns ({}):", config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            println!("  - {}", pattern);
        }
    }

    if !config.include_patterns.is_empty() {
        println!("\nInclude Patterns ({}):", config.include_patterns.len());
        for pattern in &config.include_patterns {
            println!("  - {}", pattern);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {}", seed);
}

/// Runs the crawl, streaming progress events and writing outputs
async fn handle_crawl(
    seed: &str,
    config: CrawlConfig,
    report_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    // Progress reporting lives outside the crawl; the scheduler does not
    // care whether anyone listens
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                CrawlEvent::Page(page) => {
                    tracing::info!(
                        "harvested {} (depth {}, {} links, {}ms)",
                        page.url,
                        page.depth,
                        page.links.len(),
                        page.crawl_time_ms
                    );
                }
                CrawlEvent::Error { url, cause } => {
                    tracing::warn!("failed {}: {}", url, cause);
                }
                CrawlEvent::Complete { summary } => {
                    tracing::info!(
                        "run complete: {} pages, {} failed",
                        summary.total_pages,
                        summary.failed_pages
                    );
                }
            }
        }
    });

    let scheduler = Scheduler::new(config)?.with_events(tx);
    let (results, summary) = scheduler.crawl(seed).await?;

    // The channel's sender side is gone once the crawl returns
    let _ = progress.await;

    print_summary(&summary);

    if let Some(path) = report_path {
        write_markdown_report(&results, &summary, path)?;
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(())
}
