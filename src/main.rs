//! Wallpaper Harvest main entry point
//!
//! This is the command-line interface for the Wallpaper Harvest downloader.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;
use wallpaper_harvest::config::{load_config_with_hash, validate, Config};
use wallpaper_harvest::crawler::{crawl, CrawlRequest};
use wallpaper_harvest::output::print_summary;
use wallpaper_harvest::state::CrawlState;
use wallpaper_harvest::url::{listing_page_url, search_form_url, ListingMode};
use wallpaper_harvest::CrawlError;

/// Exit code for an unusable category/keyword combination
const EXIT_INVALID_REQUEST: u8 = 2;

/// Wallpaper Harvest: a polite wallpaper downloader
///
/// Walks a gallery category or search result, keeps landscape images of at
/// least 1920x1080, and saves the ones not already on disk.
///
/// Known categories: 4kdongman, 4kfengjing, 4kmeinv, 4kyouxi, 4kyingshi,
/// 4kqiche, 4kdongwu, 4krenwu, 4kzongjiao
#[derive(Parser, Debug)]
#[command(name = "wallpaper-harvest")]
#[command(version)]
#[command(about = "A polite wallpaper downloader")]
struct Cli {
    /// Category slug to browse (e.g. 4kfengjing)
    #[arg(short, long)]
    category: Option<String>,

    /// Search keyword; narrows to --category when both are given
    #[arg(short, long)]
    keyword: Option<String>,

    /// Maximum number of listing pages to visit
    #[arg(short, long, default_value_t = CrawlRequest::DEFAULT_PAGE_LIMIT,
          value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory wallpapers are saved to (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    download_dir: Option<String>,

    /// Gallery root URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the request and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let request = CrawlRequest::new(cli.category.as_deref(), cli.keyword.as_deref(), cli.pages);

    if cli.dry_run {
        return handle_dry_run(&config, &request);
    }

    Ok(handle_crawl(&config, &request).await)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wallpaper_harvest=info,warn"),
            1 => EnvFilter::new("wallpaper_harvest=debug,info"),
            2 => EnvFilter::new("wallpaper_harvest=trace,debug"),
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

/// Loads the config file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.download_dir {
        config.output.download_dir = dir.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates the request and shows the plan
fn handle_dry_run(config: &Config, request: &CrawlRequest) -> anyhow::Result<ExitCode> {
    println!("=== Wallpaper Harvest Dry Run ===\n");

    if let Err(e) = request.validate() {
        println!("✗ {}", e);
        return Ok(ExitCode::from(EXIT_INVALID_REQUEST));
    }
    let Some(mode) = ListingMode::for_request(request) else {
        return Ok(ExitCode::from(EXIT_INVALID_REQUEST));
    };

    let base = Url::parse(&config.site.base_url)?;
    let first_page = match listing_page_url(&base, mode, 1, &CrawlState::new())? {
        Some(url) => url,
        None => search_form_url(&base)?,
    };

    println!("Request:");
    match mode {
        ListingMode::Category(category) => println!("  Category: {}", category),
        ListingMode::Search { keyword, category } => {
            println!("  Keyword: {}", keyword);
            if let Some(category) = category {
                println!("  Within category: {}", category);
            }
        }
    }
    println!("  Page limit: {}", request.page_limit());
    println!("  First page: {}", first_page);

    println!("\nDelays:");
    let delays = &config.delays;
    println!(
        "  Page load: {}-{}ms",
        delays.page_load.min_ms, delays.page_load.max_ms
    );
    println!("  Per item: {}-{}ms", delays.item.min_ms, delays.item.max_ms);
    println!(
        "  Session warm-up: {}-{}ms",
        delays.warmup.min_ms, delays.warmup.max_ms
    );

    println!("\nOutput:");
    println!("  Download directory: {}", config.output.download_dir);

    println!("\n✓ Request is valid");
    Ok(ExitCode::SUCCESS)
}

/// Handles the main crawl operation
///
/// Interrupts stop the crawl cleanly: dropping the crawl future releases the
/// open session.
async fn handle_crawl(config: &Config, request: &CrawlRequest) -> ExitCode {
    tokio::select! {
        result = crawl(config, request) => match result {
            Ok(summary) => {
                tracing::info!("Crawl completed successfully");
                print_summary(&summary);
                ExitCode::SUCCESS
            }
            Err(e @ CrawlError::InvalidRequest(_)) => {
                tracing::error!("{}", e);
                ExitCode::from(EXIT_INVALID_REQUEST)
            }
            Err(e @ (CrawlError::EmptyResult | CrawlError::PaginationUnknown)) => {
                tracing::error!("{}", e);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = shutdown_signal() => {
            tracing::warn!("Interrupted, stopping the crawl");
            ExitCode::SUCCESS
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
