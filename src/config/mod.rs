// src/config/mod.rs

use anyhow::{Context, Result};
use serde_json::Value;
use std::{fs, path::Path};
use tracing::debug;

pub mod types;

pub use types::{ConfigError, Criteria, SearchCriteria, Settings};

use types::RawSearchCriteria;

/// Top-level key holding the optional [`Settings`] object.
pub const SETTINGS_KEY: &str = "settings";

/// Read top-level `key` from the JSON document at `path`.
/// Returns `default` if the key is absent; a missing or malformed file is an error.
pub fn read_config_value<P: AsRef<Path>>(path: P, key: &str, default: Value) -> Result<Value> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
    let doc: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;

    match doc.get(key) {
        Some(v) => Ok(v.clone()),
        None => {
            debug!(key, "config key absent, using default");
            Ok(default)
        }
    }
}

/// Load and validate the `{criteria, values}` section for `crawler`.
pub fn load_search_criteria<P: AsRef<Path>>(path: P, crawler: &str) -> Result<SearchCriteria> {
    let section = read_config_value(&path, crawler, Value::Null)?;
    if section.is_null() {
        return Err(ConfigError::MissingSection(crawler.to_string()).into());
    }
    let raw: RawSearchCriteria = serde_json::from_value(section)
        .with_context(|| format!("decoding `{}` section", crawler))?;
    Ok(raw.validate(crawler)?)
}

/// Load the optional `settings` section, falling back to defaults field by field.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let section = read_config_value(&path, SETTINGS_KEY, Value::Null)?;
    let settings = if section.is_null() {
        Settings::default()
    } else {
        serde_json::from_value(section).context("decoding `settings` section")?
    };
    Ok(settings.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn write_config(doc: &Value) -> (TempDir, PathBuf) {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, doc.to_string()).unwrap();
        (tmp, path)
    }

    fn config_error(err: anyhow::Error) -> ConfigError {
        err.downcast::<ConfigError>().expect("expected a ConfigError")
    }

    #[test]
    fn test_read_value_and_default() {
        let (_tmp, path) = write_config(&json!({"irs": {"criteria": "title"}}));

        let found = read_config_value(&path, "irs", Value::Null).unwrap();
        assert_eq!(found, json!({"criteria": "title"}));

        let missing = read_config_value(&path, "other", json!("fallback")).unwrap();
        assert_eq!(missing, json!("fallback"));
    }

    #[test]
    fn test_missing_or_invalid_file_is_error() {
        let tmp = tempdir().unwrap();
        assert!(read_config_value(tmp.path().join("nope.json"), "irs", Value::Null).is_err());

        let bad = tmp.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(read_config_value(&bad, "irs", Value::Null).is_err());
    }

    #[test]
    fn test_load_search_criteria() {
        let (_tmp, path) = write_config(&json!({
            "irs": {"criteria": "formNumber", "values": ["Form W-2", "Form 1095-C"]}
        }));
        let search = load_search_criteria(&path, "irs").unwrap();
        assert_eq!(search.criteria, Criteria::FormNumber);
        assert_eq!(search.values, vec!["Form W-2", "Form 1095-C"]);
    }

    #[test]
    fn test_unknown_criteria_rejected() {
        let (_tmp, path) = write_config(&json!({
            "irs": {"criteria": "formName", "values": ["Form W-2"]}
        }));
        let err = config_error(load_search_criteria(&path, "irs").unwrap_err());
        assert_eq!(err, ConfigError::UnknownCriteria("formName".into()));
    }

    #[test]
    fn test_empty_or_missing_values_rejected() {
        let (_tmp, path) = write_config(&json!({
            "irs": {"criteria": "formNumber", "values": []}
        }));
        let err = config_error(load_search_criteria(&path, "irs").unwrap_err());
        assert_eq!(err, ConfigError::NoValues("irs".into()));

        let (_tmp, path) = write_config(&json!({"irs": {"criteria": "formNumber"}}));
        let err = config_error(load_search_criteria(&path, "irs").unwrap_err());
        assert_eq!(err, ConfigError::NoValues("irs".into()));
    }

    #[test]
    fn test_missing_section_rejected() {
        let (_tmp, path) = write_config(&json!({"other": {}}));
        let err = config_error(load_search_criteria(&path, "irs").unwrap_err());
        assert_eq!(err, ConfigError::MissingSection("irs".into()));
    }

    #[test]
    fn test_settings_defaults_and_overrides() {
        let (_tmp, path) = write_config(&json!({"irs": {}}));
        assert_eq!(load_settings(&path).unwrap(), Settings::default());

        let (_tmp, path) = write_config(&json!({
            "settings": {"results_dir": "out", "page_size": 50, "export_csv": true}
        }));
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.results_dir, PathBuf::from("out"));
        assert_eq!(settings.page_size, 50);
        assert!(settings.export_csv);
        assert_eq!(settings.downloads_dir, PathBuf::from("downloads"));
        assert_eq!(settings.chunk_size, 128);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let (_tmp, path) = write_config(&json!({"settings": {"page_size": 0}}));
        let err = config_error(load_settings(&path).unwrap_err());
        assert_eq!(err, ConfigError::ZeroSetting("page_size"));
    }
}
