// src/export/mod.rs

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    Ok(())
}

/// Serialize `rows` as compact JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let file = fs::File::create(path).with_context(|| format!("creating {:?}", path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, rows).context("serializing JSON")?;
    out.flush().with_context(|| format!("writing {:?}", path))?;

    debug!(rows = rows.len(), path = %path.display(), "wrote JSON");
    Ok(())
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write a sequence of mappings as CSV, using the first row's keys as the header.
///
/// An empty sequence writes nothing and returns `Ok(None)`. A later row with a
/// key the header lacks is an error.
pub fn write_csv<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    if rows.is_empty() {
        debug!(path = %path.display(), "no rows; CSV not written");
        return Ok(None);
    }

    let records = rows
        .iter()
        .map(|r| -> Result<Map<String, Value>> {
            match serde_json::to_value(r)? {
                Value::Object(m) => Ok(m),
                other => bail!("CSV rows must be mappings, got {}", other),
            }
        })
        .collect::<Result<Vec<Map<String, Value>>>>()?;

    let header: Vec<&String> = records[0].keys().collect();

    ensure_parent(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .with_context(|| format!("creating {:?}", path))?;
    wtr.write_record(&header)?;

    for (idx, rec) in records.iter().enumerate() {
        if let Some(extra) = rec.keys().find(|k| !header.contains(k)) {
            bail!("row {}: key `{}` not in CSV header", idx, extra);
        }
        wtr.write_record(header.iter().map(|h| csv_cell(rec.get(h.as_str()))))?;
    }
    wtr.flush().with_context(|| format!("writing {:?}", path))?;

    debug!(rows = records.len(), path = %path.display(), "wrote CSV");
    Ok(Some(path.to_path_buf()))
}
