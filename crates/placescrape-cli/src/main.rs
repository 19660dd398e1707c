mod runner;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use placescrape_core::{iteration_cap, load_app_config, load_store_targets, AppConfig, StoreTarget};
use placescrape_scraper::{ChromeSession, StoreScraper};
use tracing_subscriber::EnvFilter;

use crate::sink::JsonWorkbookSink;

#[derive(Debug, Parser)]
#[command(name = "placescrape")]
#[command(about = "Scrape Naver Place store profiles, menus, and reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every store in the store list.
    Scrape(ScrapeArgs),
    /// Print the store ids parsed from the store list.
    Targets {
        /// Store list to read instead of `PLACESCRAPE_INPUT_PATH`.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
struct ScrapeArgs {
    /// Store list to read instead of `PLACESCRAPE_INPUT_PATH`.
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Review reveal-more cap. 0 means unbounded.
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Menu reveal-more cap. 0 means unbounded.
    #[arg(long)]
    menu_max_iterations: Option<u32>,

    /// Scrape only these store ids or place URLs; the store list is not read.
    #[arg(long = "store", value_name = "ID")]
    stores: Vec<String>,

    /// Show the browser window.
    #[arg(long)]
    headful: bool,

    /// Print the pages that would be loaded and exit without launching a browser.
    #[arg(long)]
    dry_run: bool,
}

impl ScrapeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input_path.clone_from(input);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(cap) = self.max_iterations {
            config.review_max_iterations = iteration_cap(cap);
        }
        if let Some(cap) = self.menu_max_iterations {
            config.menu_max_iterations = iteration_cap(cap);
        }
        if self.headful {
            config.headless = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Scrape(args) => {
            args.apply(&mut config);
            run_scrape(&config, &args).await
        }
        Commands::Targets { input } => {
            if let Some(input) = input {
                config.input_path = input;
            }
            let targets = load_targets(&config)?;
            for target in &targets {
                println!("{target}");
            }
            tracing::info!(count = targets.len(), path = %config.input_path.display(), "store list parsed");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_scrape(config: &AppConfig, args: &ScrapeArgs) -> anyhow::Result<ExitCode> {
    let targets = resolve_targets(config, &args.stores)?;
    if targets.is_empty() {
        tracing::warn!(path = %config.input_path.display(), "no stores to scrape");
        return Ok(ExitCode::SUCCESS);
    }

    let scraper = StoreScraper::from_config(config);

    if args.dry_run {
        for target in &targets {
            let urls = scraper.urls(target);
            println!("{target}: {} {} {} {}", urls.home, urls.information, urls.menu, urls.review);
        }
        println!(
            "dry-run: would scrape {} stores into {}",
            targets.len(),
            config.output_dir.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let sink = JsonWorkbookSink::new(&config.output_dir);
    sink.ensure_dir()
        .with_context(|| format!("failed to prepare output directory {}", config.output_dir.display()))?;

    let session = ChromeSession::launch(&config.browser_options())
        .await
        .context("failed to start the browser session")?;
    tracing::info!(
        stores = targets.len(),
        review_cap = ?config.review_max_iterations,
        menu_cap = ?config.menu_max_iterations,
        "starting run"
    );

    let summary = tokio::select! {
        summary = runner::run_stores(&session, &scraper, &sink, &targets) => Some(summary),
        () = shutdown_signal() => None,
    };

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "browser session did not shut down cleanly");
    }

    match summary {
        Some(summary) => {
            tracing::info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                total = summary.total(),
                "run finished"
            );
            Ok(summary.exit_code())
        }
        None => {
            tracing::warn!("run interrupted before all stores were processed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Explicit `--store` values win over the store list.
fn resolve_targets(config: &AppConfig, stores: &[String]) -> anyhow::Result<Vec<StoreTarget>> {
    if stores.is_empty() {
        return load_targets(config);
    }

    let mut targets: Vec<StoreTarget> = Vec::with_capacity(stores.len());
    for raw in stores {
        let target = StoreTarget::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("'{raw}' is not a store id or a place URL"))?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}

fn load_targets(config: &AppConfig) -> anyhow::Result<Vec<StoreTarget>> {
    load_store_targets(&config.input_path, &config.id_column)
        .with_context(|| format!("failed to load store list {}", config.input_path.display()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, closing the browser session");
}
