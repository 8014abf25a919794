use anyhow::Result;
use clap::Parser;
use pinwheel::{
    config,
    crawl::{self, Crawler},
};
use reqwest::Client;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "pinwheel",
    about = "Collect prior-year IRS form revisions and their PDFs",
    version
)]
struct Cli {
    /// Crawler to run
    #[arg(value_enum)]
    crawler: Crawler,

    /// JSON config holding the crawler's search values and optional settings
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Where PDFs are saved (overrides config)
    #[arg(long)]
    downloads_dir: Option<PathBuf>,

    /// Where results files are written (overrides config)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Also write results as CSV
    #[arg(long)]
    csv: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) parse args; bad crawler names exit here ──────────────────
    let cli = Cli::parse();

    // ─── 2) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!(crawler = cli.crawler.name(), "startup");

    // ─── 3) settings: config file, then CLI overrides ────────────────
    let mut settings = config::load_settings(&cli.config)?;
    if let Some(dir) = cli.downloads_dir {
        settings.downloads_dir = dir;
    }
    if let Some(dir) = cli.results_dir {
        settings.results_dir = dir;
    }
    settings.export_csv |= cli.csv;

    // ─── 4) crawl ────────────────────────────────────────────────────
    let client = Client::new();
    let start = Instant::now();
    let results = crawl::crawl(&client, cli.crawler, &cli.config, &settings).await?;

    info!(forms = results.len(), elapsed = ?start.elapsed(), "all done");
    Ok(())
}
