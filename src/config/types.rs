// src/config/types.rs

use serde::Deserialize;
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

use crate::crawl::irs::{DEFAULT_PAGE_SIZE, PICKLIST_URL};
use crate::fetch::DEFAULT_CHUNK_SIZE;

/// Problems with the configuration document itself, reported before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no `{0}` section in config")]
    MissingSection(String),
    #[error("criteria `{0}` not available, available: formNumber, title, currentYearRevDateString")]
    UnknownCriteria(String),
    #[error("you must enter a list of values for `{0}` in config")]
    NoValues(String),
    #[error("setting `{0}` must be greater than zero")]
    ZeroSetting(&'static str),
}

/// The field the remote picklist compares `value` against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criteria {
    FormNumber,
    Title,
    CurrentYearRevDateString,
}

impl Criteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criteria::FormNumber => "formNumber",
            Criteria::Title => "title",
            Criteria::CurrentYearRevDateString => "currentYearRevDateString",
        }
    }
}

impl FromStr for Criteria {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formNumber" => Ok(Criteria::FormNumber),
            "title" => Ok(Criteria::Title),
            "currentYearRevDateString" => Ok(Criteria::CurrentYearRevDateString),
            other => Err(ConfigError::UnknownCriteria(other.to_string())),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated search configuration for one crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub criteria: Criteria,
    pub values: Vec<String>,
}

/// Shape of a crawler section as it appears on disk, before validation.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchCriteria {
    pub criteria: Option<String>,
    pub values: Option<Vec<String>>,
}

impl RawSearchCriteria {
    /// `section` names the crawler for error messages.
    pub(crate) fn validate(self, section: &str) -> Result<SearchCriteria, ConfigError> {
        let values = match self.values {
            Some(v) if !v.is_empty() => v,
            _ => return Err(ConfigError::NoValues(section.to_string())),
        };
        let criteria = self.criteria.unwrap_or_default().parse::<Criteria>()?;
        Ok(SearchCriteria { criteria, values })
    }
}

/// Paths and knobs threaded through a crawl. Every field may be omitted in
/// the `settings` section of the config document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub downloads_dir: PathBuf,
    pub results_dir: PathBuf,
    pub base_url: String,
    pub page_size: usize,
    /// Upper bound on pages requested per search value.
    pub max_pages: usize,
    pub chunk_size: usize,
    pub export_csv: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from("downloads"),
            results_dir: PathBuf::from("results"),
            base_url: PICKLIST_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 50,
            chunk_size: DEFAULT_CHUNK_SIZE,
            export_csv: false,
        }
    }
}

impl Settings {
    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroSetting("page_size"));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroSetting("max_pages"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroSetting("chunk_size"));
        }
        Ok(self)
    }
}
