// src/table/mod.rs

use scraper::{ElementRef, Html, Selector};
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;
use tracing::{debug, instrument, trace};

pub mod clean;

pub use clean::{clean_str, file_name_safe};

pub const PRODUCT_NUMBER: &str = "Product Number";
pub const TITLE: &str = "Title";
pub const REVISION_DATE: &str = "Revision Date";

/// Key under which a cell's first link target is stored.
pub fn url_key(header: &str) -> String {
    format!("{}_url", header)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector `{0}`")]
    Selector(String),
    #[error("row {row}: {cells} cells but {headers} headers")]
    ColumnMismatch {
        row: usize,
        headers: usize,
        cells: usize,
    },
    #[error("row {row}: missing `{column}` column")]
    MissingColumn { row: usize, column: String },
    #[error("row {row}: revision date `{value}` is not a year")]
    InvalidYear { row: usize, value: String },
}

/// One data row, keyed by cleaned header text. Keeps the table's column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    fields: Vec<(String, String)>,
}

impl TableRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TableRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = TableRow::default();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A parsed results table: every data row plus the revision years seen on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Revision years from every row, matched or not.
    pub years: Vec<i32>,
}

/// Rows matching a target value plus the year span of the table they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub matched: Vec<TableRow>,
    pub years: Option<(i32, i32)>,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// `(min, max)` of `years`, or `None` if empty.
pub fn year_range(years: &[i32]) -> Option<(i32, i32)> {
    let min = years.iter().copied().min()?;
    let max = years.iter().copied().max()?;
    Some((min, max))
}

/// Locate the first element matching `table_selector` in `html` and parse it.
/// Returns `Ok(None)` when the document has no such table.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn parse_table(html: &str, table_selector: &str) -> Result<Option<ParsedTable>, ExtractError> {
    let doc = Html::parse_document(html);
    let table_sel = selector(table_selector)?;
    match doc.select(&table_sel).next() {
        Some(table) => parse_table_element(table).map(Some),
        None => {
            debug!("no table matched");
            Ok(None)
        }
    }
}

/// Parse a `<table>` whose first row holds `<th>` headers and the rest `<td>` cells.
pub fn parse_table_element(table: ElementRef<'_>) -> Result<ParsedTable, ExtractError> {
    let tr = selector("tr")?;
    let th = selector("th")?;
    let td = selector("td")?;
    let anchor = selector("a")?;

    let mut trs = table.select(&tr);
    let headers: Vec<String> = match trs.next() {
        Some(first) => first
            .select(&th)
            .map(|h| clean_str(&h.text().collect::<String>()))
            .collect(),
        None => return Ok(ParsedTable::default()),
    };

    let mut rows = Vec::new();
    let mut years = Vec::new();
    for (idx, row_el) in trs.enumerate() {
        let cells: Vec<ElementRef<'_>> = row_el.select(&td).collect();
        if cells.is_empty() {
            trace!(row = idx, "skipping row without cells");
            continue;
        }
        if cells.len() != headers.len() {
            return Err(ExtractError::ColumnMismatch {
                row: idx,
                headers: headers.len(),
                cells: cells.len(),
            });
        }

        let mut row = TableRow::default();
        for (key, cell) in headers.iter().zip(&cells) {
            let value = clean_str(&cell.text().collect::<String>());
            row.insert(key.as_str(), value.as_str());

            // only the first link counts
            if let Some(href) = cell
                .select(&anchor)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                row.insert(url_key(key), href);
            }

            if key == REVISION_DATE {
                let year = value.parse::<i32>().map_err(|_| ExtractError::InvalidYear {
                    row: idx,
                    value: value.clone(),
                })?;
                years.push(year);
            }
        }
        trace!(row = idx, fields = row.len(), "parsed row");
        rows.push(row);
    }

    debug!(headers = headers.len(), rows = rows.len(), "parsed table");
    Ok(ParsedTable {
        headers,
        rows,
        years,
    })
}

/// Select the rows whose product number equals `value`.
///
/// The year span covers the whole table, not only the matched rows.
pub fn extract(table: &ParsedTable, value: &str) -> Result<Extraction, ExtractError> {
    let mut matched = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let product = row
            .get(PRODUCT_NUMBER)
            .ok_or_else(|| ExtractError::MissingColumn {
                row: idx,
                column: PRODUCT_NUMBER.to_string(),
            })?;
        if product == value {
            matched.push(row.clone());
        }
    }
    Ok(Extraction {
        matched,
        years: year_range(&table.years),
    })
}
