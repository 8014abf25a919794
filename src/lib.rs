pub mod config;
pub mod crawl;
pub mod export;
pub mod fetch;
pub mod table;
