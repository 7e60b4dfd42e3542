//! Type-safe configuration loader using the `config` crate,
//! with manual environment-variable overrides for core settings.

use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::{env, path::PathBuf};

/// Base name of the optional settings file (`Ingest.toml`, `Ingest.yaml`, ...).
pub const DEFAULT_CONFIG_NAME: &str = "Ingest";

/// Settings for one reload run, loaded from `Ingest.toml` (if present)
/// and then overridden by environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Directory holding the dataset CSV files
    pub data_dir: PathBuf,

    /// SQLite database file to (re)build
    pub database_path: PathBuf,

    /// Where to write the Prometheus textfile after a run, if anywhere
    #[serde(default)]
    pub metrics_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `Ingest.toml` in the working directory,
    /// then apply any overrides from these environment variables:
    ///
    /// - `APP__DATA_DIR`
    /// - `APP__DATABASE_PATH`
    /// - `APP__METRICS_FILE`
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings = Self::load(DEFAULT_CONFIG_NAME)?;

        if let Ok(val) = env::var("APP__DATA_DIR") {
            settings.data_dir = val.into();
        }
        if let Ok(val) = env::var("APP__DATABASE_PATH") {
            settings.database_path = val.into();
        }
        if let Ok(val) = env::var("APP__METRICS_FILE") {
            settings.metrics_file = (!val.is_empty()).then(|| val.into());
        }

        Ok(settings)
    }

    /// Load settings from the named file (extension optional) on top of the
    /// built-in defaults. A missing file is not an error.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("data_dir", "data")?
            .set_default("database_path", "ecom.db")?
            .add_source(File::with_name(name).required(false))
            .build()?;

        cfg.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing-here");
        let settings = Settings::load(missing.to_str().unwrap()).unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.database_path, PathBuf::from("ecom.db"));
        assert!(settings.metrics_file.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Ingest.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_dir = \"/srv/dataset\"").unwrap();
        writeln!(file, "metrics_file = \"/var/lib/node_exporter/ecom.prom\"").unwrap();

        let settings = Settings::load(path.to_str().unwrap()).unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/srv/dataset"));
        assert_eq!(settings.database_path, PathBuf::from("ecom.db"));
        assert_eq!(
            settings.metrics_file,
            Some(PathBuf::from("/var/lib/node_exporter/ecom.prom"))
        );
    }
}
