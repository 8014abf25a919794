// src/fetch/files.rs

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, instrument};
use url::Url;

/// Write granularity for downloads, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Stream `url` into `dest`, writing `chunk_size` bytes at a time.
/// Returns the path written.
///
/// An interrupted transfer leaves a truncated file behind at `dest`.
#[instrument(level = "debug", skip(client, url, dest), fields(url = %url, dest = %dest.display()))]
pub async fn download(
    client: &Client,
    url: &Url,
    dest: &Path,
    chunk_size: usize,
) -> Result<PathBuf> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {:?}", parent))?;
    }

    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?;

    let mut file = fs::File::create(dest)
        .await
        .with_context(|| format!("creating {:?}", dest))?;

    let mut stream = resp.bytes_stream();
    let mut written = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("reading body from {}", url))?;
        for piece in chunk.chunks(chunk_size.max(1)) {
            file.write_all(piece)
                .await
                .with_context(|| format!("writing {:?}", dest))?;
            written += piece.len();
        }
    }
    file.flush().await?;

    debug!(bytes = written, "download complete");
    Ok(dest.to_path_buf())
}
