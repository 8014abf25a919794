// src/crawl/mod.rs

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::time::Instant;
use tracing::{info, instrument};

use crate::config::{self, Settings};
use crate::export;

pub mod irs;

/// Registered crawlers, selectable by name on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Crawler {
    Irs,
}

impl Crawler {
    /// Config section and output file prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Crawler::Irs => "irs",
        }
    }
}

/// One line of crawl output per search value that matched at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub form_number: String,
    pub form_title: String,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

pub fn json_results_path(settings: &Settings, crawler: Crawler) -> PathBuf {
    settings
        .results_dir
        .join(format!("{}_results.json", crawler.name()))
}

pub fn csv_results_path(settings: &Settings, crawler: Crawler) -> PathBuf {
    settings
        .results_dir
        .join(format!("{}_results.csv", crawler.name()))
}

/// Run `crawler` over every configured value, in order, and write the results.
///
/// Any error aborts the whole run before the results file is written.
#[instrument(level = "info", skip(client, crawler, settings), fields(crawler = crawler.name()))]
pub async fn crawl(
    client: &Client,
    crawler: Crawler,
    config_path: &Path,
    settings: &Settings,
) -> Result<Vec<SummaryRow>> {
    let search = config::load_search_criteria(config_path, crawler.name())?;
    info!(
        criteria = %search.criteria,
        values = search.values.len(),
        "starting crawl"
    );

    let mut results = Vec::with_capacity(search.values.len());
    for value in &search.values {
        let start = Instant::now();
        let summary = match crawler {
            Crawler::Irs => irs::crawl_value(client, settings, search.criteria, value).await?,
        };
        match summary {
            Some(row) => {
                info!(value = %value, elapsed = ?start.elapsed(), "matched");
                results.push(row);
            }
            None => info!(value = %value, elapsed = ?start.elapsed(), "no matching rows"),
        }
    }

    let json_path = json_results_path(settings, crawler);
    export::write_json(&results, &json_path)?;
    info!(rows = results.len(), path = %json_path.display(), "wrote results");

    if settings.export_csv {
        let csv_path = csv_results_path(settings, crawler);
        if let Some(path) = export::write_csv(&results, &csv_path)? {
            info!(path = %path.display(), "wrote CSV");
        }
    }

    Ok(results)
}
