//! ingestor.rs
//!
//! Core reload logic: read and validate every CSV up front, then replace the
//! contents of all five tables inside one SQLite transaction.

use std::{fmt, fs, io};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::db_utils::connect;
use crate::errors::IngestError;
use crate::metrics::{ROWS_INSERTED, RUNS, RUN_HISTOGRAM};
use crate::reader::read_table;
use crate::records::{Customer, Order, OrderItem, Product, Record, Review};
use crate::schema::{clear_tables, create_tables, Table, UNLOADED_FILE};

/// Every loaded table's rows, parsed and validated but not yet written.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub reviews: Vec<Review>,
}

impl Dataset {
    /// Read all five CSV files from `data_dir`. Fails on the first missing
    /// file, missing column or malformed row.
    pub fn read(data_dir: &Path) -> Result<Self, IngestError> {
        let dataset = Dataset {
            customers: read_table(data_dir)?,
            products: read_table(data_dir)?,
            orders: read_table(data_dir)?,
            order_items: read_table(data_dir)?,
            reviews: read_table(data_dir)?,
        };

        if data_dir.join(UNLOADED_FILE).exists() {
            debug!(file = UNLOADED_FILE, "Not loading inventory events");
        }

        Ok(dataset)
    }
}

/// Rows inserted per table, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub tables: Vec<(Table, u64)>,
}

impl LoadSummary {
    pub fn count(&self, table: Table) -> Option<u64> {
        self.tables
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }

    pub fn total(&self) -> u64 {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table, count) in &self.tables {
            writeln!(f, "{}: inserted {} rows", table.name(), count)?;
        }
        Ok(())
    }
}

/// Reloads the CSV dataset in `data_dir` into the SQLite file at `database_path`.
#[derive(Debug, Clone)]
pub struct Ingestor {
    data_dir: PathBuf,
    database_path: PathBuf,
}

impl Ingestor {
    pub fn new(data_dir: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_path: database_path.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.data_dir, &settings.database_path)
    }

    /// Run one full reload and record its outcome in the metrics registry.
    ///
    /// On any error the database file is left as it was before the call; a
    /// file this run created is removed again.
    pub async fn run(&self) -> Result<LoadSummary, IngestError> {
        let start = Instant::now();
        let result = self.reload().await;
        RUN_HISTOGRAM.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(summary) => {
                RUNS.with_label_values(&["success"]).inc();
                for (table, count) in &summary.tables {
                    ROWS_INSERTED.with_label_values(&[table.name()]).inc_by(*count);
                }
            }
            Err(_) => RUNS.with_label_values(&["failure"]).inc(),
        }
        result
    }

    async fn reload(&self) -> Result<LoadSummary, IngestError> {
        // Nothing touches the database until every file has parsed cleanly.
        let dataset = Dataset::read(&self.data_dir)?;
        info!(
            data_dir = %self.data_dir.display(),
            customers = dataset.customers.len(),
            products = dataset.products.len(),
            orders = dataset.orders.len(),
            order_items = dataset.order_items.len(),
            reviews = dataset.reviews.len(),
            "Parsed dataset"
        );

        let existed = self.database_path.exists();
        let result = self.write(&dataset).await;
        if result.is_err() && !existed {
            self.discard_database();
        }
        result
    }

    async fn write(&self, dataset: &Dataset) -> Result<LoadSummary, IngestError> {
        let mut conn = connect(&self.database_path).await?;
        info!(database = %self.database_path.display(), "Opened database");

        let result = replace_all(&mut conn, dataset).await;
        if result.is_ok() {
            conn.close().await?;
        } else if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close database after a failed reload");
        }
        result
    }

    /// Remove a database file (and its rollback journal) created by a failed run.
    fn discard_database(&self) {
        let mut journal = self.database_path.clone().into_os_string();
        journal.push("-journal");
        for path in [self.database_path.clone(), PathBuf::from(journal)] {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed file from failed run"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
            }
        }
    }
}

/// Recreate and refill every table in one transaction. Rolls back on error.
pub async fn replace_all(
    conn: &mut SqliteConnection,
    dataset: &Dataset,
) -> Result<LoadSummary, IngestError> {
    let mut tx = conn.begin().await?;
    let written = write_tables(&mut tx, dataset).await;

    match written {
        Ok(summary) => {
            tx.commit().await?;
            info!(total_rows = summary.total(), "Reload committed");
            Ok(summary)
        }
        Err(err) => {
            if let Err(e) = tx.rollback().await {
                warn!(error = %e, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn write_tables(
    conn: &mut SqliteConnection,
    dataset: &Dataset,
) -> Result<LoadSummary, IngestError> {
    create_tables(conn).await?;
    clear_tables(conn).await?;

    let tables = vec![
        (Table::Customers, insert_rows(conn, &dataset.customers).await?),
        (Table::Products, insert_rows(conn, &dataset.products).await?),
        (Table::Orders, insert_rows(conn, &dataset.orders).await?),
        (Table::OrderItems, insert_rows(conn, &dataset.order_items).await?),
        (Table::Reviews, insert_rows(conn, &dataset.reviews).await?),
    ];
    Ok(LoadSummary { tables })
}

/// Insert all rows of one table through a single prepared statement.
async fn insert_rows<R: Record>(conn: &mut SqliteConnection, rows: &[R]) -> Result<u64, IngestError> {
    let table = R::TABLE;
    let sql = table.insert_sql();
    let start = Instant::now();

    for row in rows {
        row.bind(sqlx::query(&sql))
            .execute(&mut *conn)
            .await
            .map_err(|source| IngestError::Insert {
                table: table.name(),
                source,
            })?;
    }

    info!(
        table = table.name(),
        file = table.file_name(),
        rows = rows.len(),
        duration_s = start.elapsed().as_secs_f64(),
        "Loaded table"
    );
    Ok(rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prints_one_line_per_table() {
        let summary = LoadSummary {
            tables: vec![(Table::Customers, 3), (Table::OrderItems, 0)],
        };

        assert_eq!(
            summary.to_string(),
            "customers: inserted 3 rows\norder_items: inserted 0 rows\n"
        );
        assert_eq!(summary.count(Table::Customers), Some(3));
        assert_eq!(summary.count(Table::Reviews), None);
        assert_eq!(summary.total(), 3);
    }
}
