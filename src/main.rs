//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest website harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sumi_harvest::config::{load_config_with_hash, Config};
use sumi_harvest::server;
use sumi_harvest::Harvester;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: an on-demand website harvester
///
/// Sumi-Harvest turns a URL into a bounded text corpus for chatbot context. It
/// serves the `/api/analyze` endpoint, or harvests a single URL with `--url`.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An on-demand website harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Harvest a single URL, print the JSON response and exit
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Override the server bind address
    #[arg(long, value_name = "ADDR", conflicts_with = "url")]
    bind: Option<String>,

    /// Validate config and print the effective settings without harvesting
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match cli.url {
        Some(url) => handle_one_shot(config, &url).await,
        None => handle_serve(config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so `--url` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler:");
    println!("  Max pages: {}", crawler.max_pages);
    println!("  Batch size: {}", crawler.batch_size);
    println!(
        "  Time budget: {}s (hard limit {}s)",
        crawler.time_budget_secs, crawler.hard_limit_secs
    );
    println!(
        "  Timeouts: initial {}ms, page {}ms, sitemap {}ms",
        crawler.initial_timeout_ms, crawler.page_timeout_ms, crawler.sitemap_timeout_ms
    );
    println!(
        "  Budgets: page {} chars, pdf {} chars, corpus {} chars",
        crawler.page_char_budget, crawler.pdf_char_budget, crawler.corpus_char_ceiling
    );
    println!("  Sitemap paths: {}", crawler.sitemap_paths.join(", "));

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    let heuristics = &config.heuristics;
    println!("\nHeuristics:");
    println!("  Thin threshold: {} chars", heuristics.thin_threshold);
    println!("  SPA text threshold: {} chars", heuristics.spa_text_threshold);
    println!("  Quality keywords: {}", heuristics.quality_keywords.join(", "));
    println!("  Verticals ({}):", heuristics.verticals.len());
    for vertical in &heuristics.verticals {
        println!("    - {} ({})", vertical.name, vertical.keywords.join(", "));
    }

    println!("\nRender proxy: {}", config.render_proxy.base_url);

    let fallback = &config.fallback;
    println!("\nFallback:");
    println!("  Enabled: {}", fallback.enabled);
    println!("  Model: {} at {}", fallback.model, fallback.api_base);
    println!("  Key variables: {}", fallback.api_key_env.join(", "));

    println!("\nServer bind: {}", config.server.bind);

    println!("\n✓ Configuration is valid");
}

/// Handles the --url mode: one harvest, JSON on stdout
async fn handle_one_shot(config: Config, url: &str) -> anyhow::Result<()> {
    let hard_limit = Duration::from_secs(config.crawler.hard_limit_secs);
    let harvester = Harvester::new(config).context("failed to build harvester")?;

    let output = match server::analyze(&harvester, Some(url), hard_limit).await {
        Ok(response) => serde_json::to_string_pretty(&response)?,
        Err((status, body)) => {
            tracing::error!("Harvest failed with status {}", status);
            serde_json::to_string_pretty(&body)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// Handles the default mode: serve the analyze endpoint
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let bind = config.server.bind.clone();
    let harvester = Harvester::new(config).context("failed to build harvester")?;

    server::serve(harvester, &bind)
        .await
        .with_context(|| format!("server on {} stopped", bind))
}
