// src/crawl/irs.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::SummaryRow;
use crate::config::{Criteria, Settings};
use crate::fetch;
use crate::table::{self, file_name_safe, TableRow, PRODUCT_NUMBER, REVISION_DATE, TITLE};

/// Prior-year form publication picklist.
pub const PICKLIST_URL: &str = "https://apps.irs.gov/app/picklist/list/priorFormPublication.html";

pub const TABLE_SELECTOR: &str = "table.picklist-dataTable";

pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Build the picklist URL for one page of results.
pub fn page_url(
    base: &str,
    criteria: Criteria,
    value: &str,
    offset: usize,
    page_size: usize,
) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("parsing base URL {}", base))?;
    url.query_pairs_mut()
        .append_pair("resultsPerPage", &page_size.to_string())
        .append_pair("sortColumn", "sortOrder")
        .append_pair("indexOfFirstRow", &offset.to_string())
        .append_pair("criteria", criteria.as_str())
        .append_pair("value", value)
        .append_pair("isDescending", "false");
    Ok(url)
}

/// `"{product number} - {revision date}.pdf"`
pub fn pdf_file_name(row: &TableRow) -> String {
    let product = row.get(PRODUCT_NUMBER).unwrap_or_default();
    let year = row.get(REVISION_DATE).unwrap_or_default();
    file_name_safe(&format!("{} - {}.pdf", product, year))
}

/// Matched rows for one value across every page, each with the page URL it came from.
#[derive(Debug, Default)]
pub struct FormPages {
    pub matched: Vec<(Url, TableRow)>,
    pub years: Vec<i32>,
    pub pages: usize,
}

/// Walk the picklist pages for `value` until a short page, an empty page, or `max_pages`.
pub async fn collect_pages(
    client: &Client,
    settings: &Settings,
    criteria: Criteria,
    value: &str,
) -> Result<FormPages> {
    let mut out = FormPages::default();

    for page in 0..settings.max_pages {
        let offset = page * settings.page_size;
        let url = page_url(&settings.base_url, criteria, value, offset, settings.page_size)?;
        debug!(page, offset, "fetching picklist page");

        let body = fetch::fetch(client, &url).await?;
        let html = String::from_utf8_lossy(&body);
        let parsed = table::parse_table(&html, TABLE_SELECTOR)
            .with_context(|| format!("parsing results table from {}", url))?;
        out.pages += 1;

        let Some(parsed) = parsed else {
            debug!(page, "no results table; stopping");
            return Ok(out);
        };

        let extraction = table::extract(&parsed, value)
            .with_context(|| format!("extracting `{}` from {}", value, url))?;
        debug!(
            page,
            rows = parsed.rows.len(),
            matched = extraction.matched.len(),
            "page parsed"
        );

        out.years.extend_from_slice(&parsed.years);
        out.matched
            .extend(extraction.matched.into_iter().map(|row| (url.clone(), row)));

        if parsed.rows.len() < settings.page_size {
            return Ok(out);
        }
    }

    warn!(
        value,
        max_pages = settings.max_pages,
        "page limit reached; later rows not collected"
    );
    Ok(out)
}

/// Download the PDF linked from a matched row. Rows without a link are skipped.
pub async fn download_form(
    client: &Client,
    settings: &Settings,
    page: &Url,
    row: &TableRow,
) -> Result<Option<PathBuf>> {
    let Some(href) = row.get(&table::url_key(PRODUCT_NUMBER)) else {
        warn!(file = %pdf_file_name(row), "matched row has no link; skipping download");
        return Ok(None);
    };
    let link = page
        .join(href)
        .with_context(|| format!("resolving link {}", href))?;
    let dest = settings.downloads_dir.join(pdf_file_name(row));

    let path = fetch::download(client, &link, &dest, settings.chunk_size).await?;
    Ok(Some(path))
}

/// Summarise one search value, or `None` if nothing matched.
pub fn summarize(value: &str, matched: &[TableRow], years: &[i32]) -> Option<SummaryRow> {
    let first = matched.first()?;
    let span = table::year_range(years);
    Some(SummaryRow {
        form_number: value.to_string(),
        form_title: first.get(TITLE).unwrap_or_default().to_string(),
        min_year: span.map(|(lo, _)| lo),
        max_year: span.map(|(_, hi)| hi),
    })
}

/// Fetch, extract and download everything for one search value.
#[instrument(level = "info", skip(client, settings, criteria))]
pub async fn crawl_value(
    client: &Client,
    settings: &Settings,
    criteria: Criteria,
    value: &str,
) -> Result<Option<SummaryRow>> {
    let pages = collect_pages(client, settings, criteria, value).await?;

    let mut downloaded = 0usize;
    for (page, row) in &pages.matched {
        if download_form(client, settings, page, row).await?.is_some() {
            downloaded += 1;
        }
    }

    let rows: Vec<TableRow> = pages.matched.into_iter().map(|(_, row)| row).collect();
    info!(
        pages = pages.pages,
        matched = rows.len(),
        downloaded,
        "value done"
    );
    Ok(summarize(value, &rows, &pages.years))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: &str, title: &str, year: &str) -> TableRow {
        [(PRODUCT_NUMBER, number), (TITLE, title), (REVISION_DATE, year)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_page_url() {
        let url = page_url(PICKLIST_URL, Criteria::FormNumber, "Form W-2", 400, 200).unwrap();
        assert_eq!(
            url.as_str(),
            "https://apps.irs.gov/app/picklist/list/priorFormPublication.html?\
             resultsPerPage=200&sortColumn=sortOrder&indexOfFirstRow=400&\
             criteria=formNumber&value=Form+W-2&isDescending=false"
        );
    }

    #[test]
    fn test_page_url_uses_configured_criteria() {
        let url = page_url(PICKLIST_URL, Criteria::Title, "Wage & Tax", 0, 200).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("criteria".into(), "title".into())));
        assert!(pairs.contains(&("value".into(), "Wage & Tax".into())));
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(
            pdf_file_name(&row("Form W-2", "Wage and Tax Statement", "2020")),
            "Form W-2 - 2020.pdf"
        );
    }

    #[test]
    fn test_summarize() {
        let matched = vec![
            row("Form W-2", "Wage and Tax Statement", "2020"),
            row("Form W-2", "Wage and Tax Statement (Info Copy)", "2021"),
        ];
        let summary = summarize("Form W-2", &matched, &[2021, 1990, 2020]).unwrap();
        assert_eq!(
            summary,
            SummaryRow {
                form_number: "Form W-2".into(),
                form_title: "Wage and Tax Statement".into(),
                min_year: Some(1990),
                max_year: Some(2021),
            }
        );

        assert_eq!(summarize("Form W-2", &[], &[2020]), None);
    }
}
