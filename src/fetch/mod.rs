// src/fetch/mod.rs

/// Single-request page fetches.
pub mod page;

/// Streaming file downloads.
pub mod files;

pub use files::{download, DEFAULT_CHUNK_SIZE};
pub use page::fetch;
