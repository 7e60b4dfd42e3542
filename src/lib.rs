//! Library entrypoint: re‑export modules

pub mod config;
pub mod db_utils;
pub mod errors;
pub mod ingestor;
pub mod metrics;
pub mod reader;
pub mod records;
pub mod reports;
pub mod schema;
