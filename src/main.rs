// Email scraper command-line front end.
//
// Reads targets from a URL list or a CSV of map listings, scrapes them with a
// local Chrome, writes a CSV table and prints the run summary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use emailscrape::io::{export_csv, read_csv_rows, read_url_list};
use emailscrape::{EmailScraper, LogProgress, ScrapeConfig, ScrapeReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "emailscrape", about = "Extract email addresses from websites and map listings", version)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every URL of a plain list (one per line)
    Urls {
        input: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Resolve map listings from a CSV and scrape the websites they link to
    Maps {
        input: PathBuf,

        /// Column holding the listing URLs (detected when omitted)
        #[arg(long)]
        column: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Output CSV path
    #[arg(long, short, default_value = "results.csv")]
    output: PathBuf,

    /// Seconds a finished request keeps its slot (default 0.5 for urls, 3 for maps)
    #[arg(long)]
    delay: Option<f64>,

    /// Maximum concurrent page loads (urls mode only)
    #[arg(long, default_value_t = 10)]
    max_concurrent: usize,

    /// Navigation timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout: u64,

    /// Seconds to wait after load before reading the page
    #[arg(long, default_value_t = 3.0)]
    settle: f64,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Chrome/Chromium binary to use instead of discovery
    #[arg(long)]
    chrome: Option<PathBuf>,
}

fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("--{flag} must be a non-negative number of seconds"))
}

impl RunArgs {
    fn config(&self) -> Result<ScrapeConfig> {
        let mut builder = ScrapeConfig::builder()
            .page_timeout_secs(self.timeout)
            .settle_delay(seconds(self.settle, "settle")?)
            .max_concurrent(self.max_concurrent)
            .headless(!self.headed);

        if let Some(delay) = self.delay {
            builder = builder.request_delay(seconds(delay, "delay")?);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if let Some(chrome) = &self.chrome {
            builder = builder.chrome_executable(chrome.clone());
        }

        Ok(builder.build()?)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn finish(report: &ScrapeReport, output: &Path) -> Result<()> {
    export_csv(output, report.mode, &report.results)?;
    println!("{}", report.summary);
    println!("Results written to {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Urls { input, run } => {
            let urls = read_url_list(&input)?;
            info!("Loaded {} URLs from {}", urls.len(), input.display());

            let scraper = EmailScraper::new(run.config()?).with_progress(Arc::new(LogProgress));
            let report = scraper.scrape_urls(urls).await?;
            finish(&report, &run.output)
        }
        Commands::Maps { input, column, run } => {
            let rows = read_csv_rows(&input)?;
            info!("Loaded {} rows from {}", rows.len(), input.display());

            let scraper = EmailScraper::new(run.config()?).with_progress(Arc::new(LogProgress));
            let report = scraper.scrape_maps(rows, column.as_deref()).await?;
            finish(&report, &run.output)
        }
    }
}
