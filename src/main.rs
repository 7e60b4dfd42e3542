//! Entrypoint: set up tracing, load settings, reload the dataset into SQLite
//! and print how many rows went into each table.
//!
//! Settings (`Settings` in `config.rs`):
//!  - `data_dir`       – directory holding the dataset CSV files
//!  - `database_path`  – SQLite file to rebuild
//!  - `metrics_file`   – optional Prometheus textfile written after the run

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use ecom_ingestor::config::Settings;
use ecom_ingestor::ingestor::Ingestor;
use ecom_ingestor::metrics;

/// Application entrypoint for the dataset reload.
///
/// **Workflow**:
/// 1. Initialise tracing/logging on stderr from `RUST_LOG` (or default to `info`).
/// 2. Load `Ingest.toml` (and apply any `APP__…` env-var overrides).
/// 3. Reload all tables; the database is untouched if anything fails.
/// 4. Print the per-table summary to stdout and write the metrics textfile.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ───────────────────────────────────────────────────────────────
    // 1. Initialise tracing / logging (stdout is reserved for the summary)
    // ───────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ───────────────────────────────────────────────────────────────
    // 2. Load configuration
    // ───────────────────────────────────────────────────────────────
    let settings = Settings::new().context("loading settings")?;
    info!(?settings, "Loaded configuration");

    // ───────────────────────────────────────────────────────────────
    // 3. Reload
    // ───────────────────────────────────────────────────────────────
    let result = Ingestor::from_settings(&settings).run().await;

    // ───────────────────────────────────────────────────────────────
    // 4. Report
    // ───────────────────────────────────────────────────────────────
    if let Some(path) = &settings.metrics_file {
        if let Err(e) = metrics::write_textfile(path) {
            error!(path = %path.display(), error = %e, "Failed to write metrics textfile");
        }
    }

    let summary = result.with_context(|| {
        format!(
            "reloading {} into {}",
            settings.data_dir.display(),
            settings.database_path.display()
        )
    })?;
    print!("{summary}");
    Ok(())
}
