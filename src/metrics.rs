//! Prometheus metrics registry and metric definitions.
//!
//! A reload is a short-lived batch job, so nothing serves these over HTTP.
//! Instead [`write_textfile`] dumps them for a node-exporter textfile collector.

use std::{fs, path::Path};

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Global registry under crate namespace
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("ecom_ingestor".into()), None)
        .expect("failed to create Prometheus registry")
});

/// Rows inserted, by table
pub static ROWS_INSERTED: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("rows_inserted_total", "Rows inserted per table");
    let c = IntCounterVec::new(opts, &["table"]).expect("counter opts");
    REGISTRY.register(Box::new(c.clone())).expect("register rows_inserted_total");
    c
});

/// Completed runs, by outcome (`success` / `failure`)
pub static RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("ingest_runs_total", "Reload runs by outcome");
    let c = IntCounterVec::new(opts, &["outcome"]).expect("counter opts");
    REGISTRY.register(Box::new(c.clone())).expect("register ingest_runs_total");
    c
});

/// Histogram of whole-run durations
pub static RUN_HISTOGRAM: Lazy<Histogram> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "ingest_duration_seconds",
        "Duration of a full reload (read + write) in seconds",
    );
    let h = Histogram::with_opts(opts).expect("histogram opts");
    REGISTRY.register(Box::new(h.clone())).expect("register ingest_duration_seconds");
    h
});

/// Encode all metrics as text
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let mf = REGISTRY.gather();
    encoder.encode(&mf, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Write the text exposition to `path`, via a sibling temp file and a rename
/// so a collector never reads a half-written file.
pub fn write_textfile(path: &Path) -> Result<(), crate::errors::IngestError> {
    let text = gather_metrics()?;
    let tmp = path.with_extension("prom.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textfile_contains_namespaced_counters() {
        ROWS_INSERTED.with_label_values(&["customers"]).inc_by(3);
        RUNS.with_label_values(&["success"]).inc();
        RUN_HISTOGRAM.observe(0.25);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecom.prom");
        write_textfile(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ecom_ingestor_rows_inserted_total{table=\"customers\"}"));
        assert!(text.contains("ecom_ingestor_ingest_runs_total{outcome=\"success\"}"));
        assert!(text.contains("ecom_ingestor_ingest_duration_seconds_count"));
        assert!(!dir.path().join("ecom.prom.tmp").exists());
    }
}
