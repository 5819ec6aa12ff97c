//! Settings file and command-line overrides

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use trv_adapters::SourceConfig;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceConfig,
    /// Offset applied to time-of-day labels
    pub display_utc_offset_hours: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            display_utc_offset_hours: -3,
        }
    }
}

impl Settings {
    /// `<config_dir>/trackvision/config.json`
    pub fn default_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join("trackvision")
                .join(CONFIG_FILE_NAME),
        )
    }

    /// Load from an explicit path, which must exist and parse, or from the
    /// default location, where a missing or broken file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path).or_else(|e| {
                warn!("Ignoring settings file: {:#}", e);
                Ok(Self::default())
            }),
            _ => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("could not open settings file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("could not parse settings file {}", path.display()))
    }

    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(base_url) = &args.base_url {
            self.source.base_url = base_url.clone();
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.source.timeout_secs = timeout_secs;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.source.cache_dir = cache_dir.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "source": { "base_url": "http://sth.local:8666", "max_last_n": 50 } }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.source.base_url, "http://sth.local:8666");
        assert_eq!(settings.source.max_last_n, 50);
        assert_eq!(settings.source.timeout_secs, 5);
        assert_eq!(settings.source.service, "smart");
        assert_eq!(settings.display_utc_offset_hours, -3);
    }

    #[test]
    fn test_explicit_file_must_exist_and_parse() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Settings::load(Some(&temp_dir.path().join("missing.json"))).is_err());

        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ source: ").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let args = Args::parse_from([
            "trackvision",
            "--base-url",
            "http://127.0.0.1:9",
            "--timeout-secs",
            "2",
            "--cache-dir",
            "/tmp/trv",
            "lap-times",
        ]);
        let settings = Settings::default().with_overrides(&args);
        assert_eq!(settings.source.base_url, "http://127.0.0.1:9");
        assert_eq!(settings.source.timeout_secs, 2);
        assert_eq!(settings.source.cache_dir, PathBuf::from("/tmp/trv"));
        assert_eq!(settings.source.entity_id, "urn:ngsi-ld:TRV:027");
    }
}
